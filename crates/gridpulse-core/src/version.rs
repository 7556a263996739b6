//! Format versions and the per-version decode plan.
//!
//! Each domain keeps a small ordered table of [`VersionPlan`]s, one per
//! version it has ever shipped. The decoder looks the stored version up once
//! and then follows the plan: which optional sections exist in the stream,
//! whether the grid was written at a smaller legacy resolution, and which
//! repair pass (if any) must run afterwards.

use bitflags::bitflags;

use crate::error::DecodeError;

/// A stored format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FormatVersion(pub u32);

/// How wide the version field is in a domain's envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionWidth {
    U16,
    U32,
}

bitflags! {
    /// Optional payload sections.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Sections: u8 {
        /// A second grid (park overlay, heating network) follows the first.
        const SECONDARY_GRID = 1 << 0;
        /// Pulse-group tables, unit queues and progress scalars follow the grid.
        const NETWORK_STATE = 1 << 1;
    }
}

/// One-off fixups for data written by a defective build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repair {
    /// Blend channels of unassigned cells were left uninitialised; reset
    /// them to the single-channel default.
    ResetUnassignedBlend,
}

/// What a given stored version contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionPlan {
    pub version: u32,
    pub sections: Sections,
    pub repair: Option<Repair>,
    /// Grid resolution the data was written at, when it differs from the
    /// current layout. Legacy cells land in the low-index prefix.
    pub stored_resolution: Option<usize>,
}

impl VersionPlan {
    pub const fn new(version: u32, sections: Sections) -> Self {
        Self {
            version,
            sections,
            repair: None,
            stored_resolution: None,
        }
    }

    pub const fn with_repair(mut self, repair: Repair) -> Self {
        self.repair = Some(repair);
        self
    }

    pub const fn with_stored_resolution(mut self, resolution: usize) -> Self {
        self.stored_resolution = Some(resolution);
        self
    }

    pub fn has(&self, section: Sections) -> bool {
        self.sections.contains(section)
    }

    /// Number of cells stored for a grid whose current resolution is
    /// `resolution`, never more than the current grid holds.
    pub fn stored_cells(&self, resolution: usize) -> usize {
        let stored = self.stored_resolution.unwrap_or(resolution);
        (stored * stored).min(resolution * resolution)
    }
}

/// The newest version in `plans` (which must be sorted by version).
pub fn current(plans: &[VersionPlan]) -> FormatVersion {
    FormatVersion(plans.last().map_or(0, |p| p.version))
}

/// Find the plan for `version`.
pub fn select_plan<'p>(
    plans: &'p [VersionPlan],
    domain: &'static str,
    version: FormatVersion,
) -> Result<&'p VersionPlan, DecodeError> {
    let supported = current(plans).0;
    if version.0 > supported {
        return Err(DecodeError::FutureVersion {
            domain,
            found: version.0,
            supported,
        });
    }
    plans
        .iter()
        .find(|p| p.version == version.0)
        .ok_or(DecodeError::UnknownVersion {
            domain,
            found: version.0,
        })
}
