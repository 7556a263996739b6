//! Property-based tests for the Gridpulse core building blocks.
//!
//! Uses proptest to generate field sequences, gated grids and circular
//! queues, then verify the wire-level invariants hold.

use gridpulse_core::cursor::{ByteReader, ByteWriter};
use gridpulse_core::error::DecodeError;
use gridpulse_core::grid::{read_gated_field, read_grid_field, write_gated_field, write_grid_field};
use gridpulse_core::guard::{UNASSIGNED, clamp_index, clamp_ref};
use gridpulse_core::pulse::{
    PulseGroupTable, PulseLimits, PulseQueue, PulseRecord, read_groups, read_units, write_groups,
    write_units,
};
use gridpulse_core::report::DecodeReport;
use proptest::prelude::*;

// ===========================================================================
// Fixtures
// ===========================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Step {
    group: u16,
    x: u16,
    z: i16,
}

impl PulseRecord for Step {
    fn write(&self, out: &mut ByteWriter) {
        out.write_u16(self.group);
        out.write_u16(self.x);
        out.write_i16(self.z);
    }

    fn read(
        input: &mut ByteReader<'_>,
        limits: &PulseLimits,
        report: &mut DecodeReport,
    ) -> Result<Self, DecodeError> {
        let group = input.read_u16()?;
        let x = input.read_u16()?;
        let z = input.read_i16()?;
        Ok(Self {
            group: report.check_index(group, limits.group_capacity, "step group"),
            x: report.check_index(x, limits.resolution, "step x"),
            z: report.check_index(z, limits.resolution, "step z"),
        })
    }
}

const LIMITS: PulseLimits = PulseLimits {
    resolution: 64,
    group_capacity: 16,
    node_capacity: 256,
};

fn arb_step() -> impl Strategy<Value = Step> {
    (0..16u16, 0..64u16, 0..64i16).prop_map(|(group, x, z)| Step { group, x, z })
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Cell {
    gate: u8,
    level: i16,
    group: u16,
    lit: bool,
}

fn arb_cell() -> impl Strategy<Value = Cell> {
    (any::<u8>(), any::<i16>(), any::<u16>(), any::<bool>()).prop_map(|(gate, level, group, lit)| {
        Cell {
            gate,
            level,
            group,
            lit,
        }
    })
}

/// A queue of `count` steps whose oldest element sits at physical `start`.
fn wrapped_queue(capacity: usize, start: usize, steps: &[Step]) -> PulseQueue<Step> {
    let mut units = vec![Step::default(); capacity];
    for (i, step) in steps.iter().enumerate() {
        units[(start + i) % capacity] = *step;
    }
    let end = (start + steps.len()) % capacity;
    PulseQueue::from_parts(units, start, end).unwrap()
}

fn arb_wrapped_queue() -> impl Strategy<Value = (usize, usize, Vec<Step>)> {
    (2..48usize).prop_flat_map(|capacity| {
        (
            Just(capacity),
            0..capacity,
            proptest::collection::vec(arb_step(), 0..capacity),
        )
    })
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every field width reads back what was written, in order, with no
    /// length prefix.
    #[test]
    fn field_streams_round_trip(
        bytes in proptest::collection::vec(any::<u8>(), 0..300),
        shorts in proptest::collection::vec(any::<i16>(), 0..300),
        words in proptest::collection::vec(any::<u16>(), 0..300),
        flags in proptest::collection::vec(any::<bool>(), 0..300),
    ) {
        let mut out = ByteWriter::new();
        write_grid_field(&mut out, &bytes, |v| *v);
        write_grid_field(&mut out, &shorts, |v| *v);
        write_grid_field(&mut out, &words, |v| *v);
        write_grid_field(&mut out, &flags, |v| *v);
        let data = out.into_vec();
        let expected_len = bytes.len() + 2 * shorts.len() + 2 * words.len() + flags.len().div_ceil(8);
        prop_assert_eq!(data.len(), expected_len);

        let mut input = ByteReader::new(&data);
        let mut b = vec![0u8; bytes.len()];
        let mut s = vec![0i16; shorts.len()];
        let mut w = vec![0u16; words.len()];
        let mut f = vec![false; flags.len()];
        read_grid_field(&mut input, &mut b, |slot, v| *slot = v).unwrap();
        read_grid_field(&mut input, &mut s, |slot, v| *slot = v).unwrap();
        read_grid_field(&mut input, &mut w, |slot, v| *slot = v).unwrap();
        read_grid_field(&mut input, &mut f, |slot, v| *slot = v).unwrap();
        prop_assert_eq!(input.remaining(), 0);
        prop_assert_eq!(b, bytes);
        prop_assert_eq!(s, shorts);
        prop_assert_eq!(w, words);
        prop_assert_eq!(f, flags);
    }

    /// Gated fields decode to the source values where the gate is set and to
    /// the defaults everywhere else.
    #[test]
    fn gated_grid_is_consistent(cells in proptest::collection::vec(arb_cell(), 0..200)) {
        let active = |c: &Cell| c.gate != 0;
        let mut out = ByteWriter::new();
        write_grid_field(&mut out, &cells, |c| c.gate);
        let written = write_gated_field(&mut out, &cells, active, |c| c.level);
        write_gated_field(&mut out, &cells, active, |c| c.group);
        write_gated_field(&mut out, &cells, active, |c| c.lit);
        let data = out.into_vec();

        let mut decoded = vec![Cell { gate: 0, level: 1, group: 2, lit: true }; cells.len()];
        let mut input = ByteReader::new(&data);
        read_grid_field(&mut input, &mut decoded, |c, v| c.gate = v).unwrap();
        let consumed = read_gated_field(&mut input, &mut decoded, active, |c, v| c.level = v, 0).unwrap();
        read_gated_field(&mut input, &mut decoded, active, |c, v| c.group = v, UNASSIGNED).unwrap();
        read_gated_field(&mut input, &mut decoded, active, |c, v| c.lit = v, false).unwrap();

        prop_assert_eq!(consumed, written);
        prop_assert_eq!(input.remaining(), 0);
        for (got, want) in decoded.iter().zip(&cells) {
            if want.gate != 0 {
                prop_assert_eq!(got, want);
            } else {
                prop_assert_eq!(*got, Cell { gate: 0, level: 0, group: UNASSIGNED, lit: false });
            }
        }
    }

    /// Decoding a physically wrapped queue re-anchors it at offset 0 and
    /// keeps the FIFO order.
    #[test]
    fn queue_reanchors((capacity, start, steps) in arb_wrapped_queue()) {
        let queue = wrapped_queue(capacity, start, &steps);
        prop_assert_eq!(queue.len(), steps.len());

        let mut out = ByteWriter::new();
        write_units(&mut out, &queue);
        let data = out.into_vec();
        prop_assert_eq!(data.len(), 2 + 6 * steps.len());

        let mut decoded = PulseQueue::<Step>::new(capacity);
        let mut report = DecodeReport::new();
        let end = read_units(&mut ByteReader::new(&data), &mut decoded, &LIMITS, &mut report, "steps").unwrap();
        prop_assert_eq!(end, steps.len() % capacity);
        prop_assert_eq!(decoded.start(), 0);
        prop_assert_eq!(decoded.iter().copied().collect::<Vec<_>>(), steps);
        prop_assert!(!report.has_anomalies());
    }

    /// Group tables keep exactly `count` live records.
    #[test]
    fn group_table_round_trip(steps in proptest::collection::vec(arb_step(), 0..=16)) {
        let mut table = PulseGroupTable::<Step>::new(16);
        for step in &steps {
            prop_assert!(table.push(*step));
        }
        let mut out = ByteWriter::new();
        write_groups(&mut out, &table);
        let data = out.into_vec();

        let mut decoded = PulseGroupTable::<Step>::new(16);
        let mut report = DecodeReport::new();
        let mut input = ByteReader::new(&data);
        let count = read_groups(&mut input, &mut decoded, &LIMITS, &mut report, "steps").unwrap();
        prop_assert_eq!(count, steps.len());
        prop_assert_eq!(decoded.as_slice(), steps.as_slice());
        prop_assert_eq!(input.remaining(), 0);
    }

    /// The guard is the identity below the limit and zero at or above it.
    #[test]
    fn clamp_index_contract(value in any::<u16>(), limit in 0..70_000usize) {
        let clamped = clamp_index(value, limit, "value");
        if usize::from(value) < limit {
            prop_assert_eq!(clamped, value);
        } else {
            prop_assert_eq!(clamped, 0);
        }
    }

    /// References keep the sentinel and never produce an out-of-range value.
    #[test]
    fn clamp_ref_contract(value in any::<u16>(), limit in 1..2048usize) {
        let clamped = clamp_ref(value, limit, "ref");
        prop_assert!(clamped == UNASSIGNED || usize::from(clamped) < limit);
        if value == UNASSIGNED || usize::from(value) < limit {
            prop_assert_eq!(clamped, value);
        }
    }

    /// Arbitrary bytes never panic the table and queue readers, and every
    /// decoded record is in range.
    #[test]
    fn garbage_never_panics(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        let mut input = ByteReader::new(&data);
        let mut report = DecodeReport::new();
        let mut table = PulseGroupTable::<Step>::new(4);
        let mut queue = PulseQueue::<Step>::new(5);
        if read_groups(&mut input, &mut table, &LIMITS, &mut report, "steps").is_ok()
            && read_units(&mut input, &mut queue, &LIMITS, &mut report, "steps").is_ok()
        {
            prop_assert!(table.len() <= 4);
            prop_assert!(queue.len() <= 4);
            for step in table.as_slice().iter().chain(queue.iter()) {
                prop_assert!(step.group < 16 && step.x < 64 && (0..64).contains(&step.z));
            }
        }
    }
}
