//! Per-decode bookkeeping returned alongside the decoded state.

use crate::guard::{self, GuardValue};

/// Orchestrator stages, entered in this order (stages a domain does not
/// have are skipped).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DecodeStage {
    GatingFields,
    GatedFields,
    VersionBranch,
    NetworkState,
    Repair,
    Done,
}

/// A value the guard rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anomaly {
    pub field: &'static str,
    pub value: i64,
    pub limit: usize,
}

/// What happened during one decode call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeReport {
    /// Payload bytes consumed.
    pub bytes_read: usize,
    /// Last stage entered. A failed decode logs the stage it reached
    /// together with the error.
    pub stage: Option<DecodeStage>,
    /// Values reset by the validation guard.
    pub anomalies: Vec<Anomaly>,
    /// Cells changed by a version repair pass.
    pub repaired_cells: usize,
    /// Records read but dropped because their table was full.
    pub discarded_records: usize,
}

impl DecodeReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record entry into `stage`.
    pub fn enter(&mut self, domain: &'static str, stage: DecodeStage) {
        tracing::debug!(domain, ?stage, "decode stage");
        self.stage = Some(stage);
    }

    /// [`guard::clamp_index`], recording an anomaly when the value is reset.
    pub fn check_index<T: GuardValue>(&mut self, value: T, limit: usize, field: &'static str) -> T {
        if !guard::in_range(value, limit) {
            self.anomalies.push(Anomaly {
                field,
                value: value.as_i64(),
                limit,
            });
        }
        guard::clamp_index(value, limit, field)
    }

    /// [`guard::clamp_ref`], recording an anomaly when the value is reset.
    pub fn check_ref(&mut self, value: u16, limit: usize, field: &'static str) -> u16 {
        let checked = guard::clamp_ref(value, limit, field);
        if checked != value {
            self.anomalies.push(Anomaly {
                field,
                value: i64::from(value),
                limit,
            });
        }
        checked
    }

    /// Record a table count that exceeds the destination capacity.
    pub fn overflow(&mut self, field: &'static str, count: usize, capacity: usize) {
        tracing::error!(field, count, capacity, "decoded count exceeds capacity, extra records dropped");
        self.anomalies.push(Anomaly {
            field,
            value: count as i64,
            limit: capacity,
        });
    }

    /// Whether the guard had to intervene.
    pub fn has_anomalies(&self) -> bool {
        !self.anomalies.is_empty()
    }

    /// Anomalies recorded for one field name.
    pub fn anomalies_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Anomaly> + 'a {
        self.anomalies.iter().filter(move |a| a.field == field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_index_records_anomaly() {
        let mut report = DecodeReport::new();
        assert_eq!(report.check_index(10u16, 10, "x"), 0);
        assert_eq!(report.check_index(9u16, 10, "x"), 9);
        assert_eq!(
            report.anomalies,
            vec![Anomaly {
                field: "x",
                value: 10,
                limit: 10
            }]
        );
    }

    #[test]
    fn check_index_records_zero_with_zero_limit() {
        let mut report = DecodeReport::new();
        assert_eq!(report.check_index(0u8, 0, "id"), 0);
        assert!(report.has_anomalies());
    }

    #[test]
    fn check_ref_keeps_sentinel_silently() {
        let mut report = DecodeReport::new();
        assert_eq!(report.check_ref(guard::UNASSIGNED, 4, "group"), guard::UNASSIGNED);
        assert!(!report.has_anomalies());
        assert_eq!(report.check_ref(4, 4, "group"), guard::UNASSIGNED);
        assert_eq!(report.anomalies_for("group").count(), 1);
    }

    #[test]
    fn stages_are_ordered() {
        assert!(DecodeStage::GatingFields < DecodeStage::GatedFields);
        assert!(DecodeStage::NetworkState < DecodeStage::Repair);
        let mut report = DecodeReport::new();
        report.enter("test", DecodeStage::Repair);
        assert_eq!(report.stage, Some(DecodeStage::Repair));
    }
}
