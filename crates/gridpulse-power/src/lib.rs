//! Electricity network state for the Gridpulse codec.
//!
//! Models the electricity grid the host simulation floods charge through:
//! a square grid of cells, the pulse groups discovered by the flood fill, the
//! pending pulse units, and a per-node group lookup. [`ElectricityCodec`]
//! saves and restores all of it.
//!
//! # Design
//!
//! - A cell takes part in the network when its conductivity is non-zero.
//!   Every other field of a non-conducting cell is at its default and is not
//!   stored.
//! - Pulse-unit `z` is a signed 16-bit value while `x` is unsigned. The water
//!   network stores both unsigned. The asymmetry is part of the wire format.
//! - Sizes come from an [`ElectricityLayout`]; the production layout is its
//!   `Default`.

pub mod codec;
pub use codec::ElectricityCodec;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use gridpulse_core::cursor::{ByteReader, ByteWriter};
use gridpulse_core::error::DecodeError;
use gridpulse_core::grid::cell_index;
use gridpulse_core::guard::UNASSIGNED;
use gridpulse_core::pulse::{
    PropagationProgress, PulseGroupTable, PulseLimits, PulseQueue, PulseRecord,
};
use gridpulse_core::report::DecodeReport;

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

pub const ELECTRICITY_GRID_RESOLUTION: usize = 462;
pub const MAX_PULSE_GROUPS: usize = 1024;
pub const MAX_PULSE_UNITS: usize = 32768;
/// Length of the node-to-group lookup; also the node reference limit.
pub const NODE_CAPACITY: usize = 32768;

/// Sizes of every electricity structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElectricityLayout {
    pub resolution: usize,
    pub group_capacity: usize,
    pub unit_capacity: usize,
    pub node_capacity: usize,
}

impl Default for ElectricityLayout {
    fn default() -> Self {
        Self {
            resolution: ELECTRICITY_GRID_RESOLUTION,
            group_capacity: MAX_PULSE_GROUPS,
            unit_capacity: MAX_PULSE_UNITS,
            node_capacity: NODE_CAPACITY,
        }
    }
}

impl ElectricityLayout {
    pub fn cell_count(&self) -> usize {
        self.resolution * self.resolution
    }

    pub fn limits(&self) -> PulseLimits {
        PulseLimits {
            resolution: self.resolution,
            group_capacity: self.group_capacity,
            node_capacity: self.node_capacity,
        }
    }
}

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// One electricity grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElectricityCell {
    /// Gating field. Zero means the cell is outside every network.
    pub conductivity: u8,
    pub charge: i16,
    pub extra_charge: i16,
    /// Owning pulse group, or [`UNASSIGNED`].
    pub pulse_group: u16,
    pub electrified: bool,
    /// Set while a pulse is in flight; road-carried charge lives here.
    pub tmp_electrified: bool,
}

impl Default for ElectricityCell {
    fn default() -> Self {
        Self {
            conductivity: 0,
            charge: 0,
            extra_charge: 0,
            pulse_group: UNASSIGNED,
            electrified: false,
            tmp_electrified: false,
        }
    }
}

impl ElectricityCell {
    pub fn is_conductive(&self) -> bool {
        self.conductivity != 0
    }

    /// Whether every gated field holds its default.
    pub fn gated_fields_are_default(&self) -> bool {
        let default = Self::default();
        self.charge == default.charge
            && self.extra_charge == default.extra_charge
            && self.pulse_group == default.pulse_group
            && self.electrified == default.electrified
            && self.tmp_electrified == default.tmp_electrified
    }
}

// ---------------------------------------------------------------------------
// Pulse records
// ---------------------------------------------------------------------------

/// Accumulator for one connected region of the electricity network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElectricityPulseGroup {
    pub orig_charge: u32,
    pub cur_charge: u32,
    /// Group this one was merged into, or [`UNASSIGNED`].
    pub merge_index: u16,
    pub merge_count: u16,
    pub x: u16,
    pub z: u16,
}

impl Default for ElectricityPulseGroup {
    fn default() -> Self {
        Self {
            orig_charge: 0,
            cur_charge: 0,
            merge_index: UNASSIGNED,
            merge_count: 0,
            x: 0,
            z: 0,
        }
    }
}

impl PulseRecord for ElectricityPulseGroup {
    fn write(&self, out: &mut ByteWriter) {
        out.write_u32(self.orig_charge);
        out.write_u32(self.cur_charge);
        out.write_u16(self.merge_index);
        out.write_u16(self.merge_count);
        out.write_u16(self.x);
        out.write_u16(self.z);
    }

    fn read(
        input: &mut ByteReader<'_>,
        limits: &PulseLimits,
        report: &mut DecodeReport,
    ) -> Result<Self, DecodeError> {
        let orig_charge = input.read_u32()?;
        let cur_charge = input.read_u32()?;
        let merge_index = input.read_u16()?;
        let merge_count = input.read_u16()?;
        let x = input.read_u16()?;
        let z = input.read_u16()?;
        Ok(Self {
            orig_charge,
            cur_charge,
            merge_index: report.check_ref(merge_index, limits.group_capacity, "electricity group merge index"),
            merge_count,
            x: report.check_index(x, limits.resolution, "electricity group x"),
            z: report.check_index(z, limits.resolution, "electricity group z"),
        })
    }
}

/// One pending step of the electricity flood fill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElectricityPulseUnit {
    pub group: u16,
    pub node: u16,
    pub x: u16,
    /// Signed on the wire, unlike every other pulse coordinate.
    pub z: i16,
}

impl PulseRecord for ElectricityPulseUnit {
    fn write(&self, out: &mut ByteWriter) {
        out.write_u16(self.group);
        out.write_u16(self.node);
        out.write_u16(self.x);
        out.write_i16(self.z);
    }

    fn read(
        input: &mut ByteReader<'_>,
        limits: &PulseLimits,
        report: &mut DecodeReport,
    ) -> Result<Self, DecodeError> {
        let group = input.read_u16()?;
        let node = input.read_u16()?;
        let x = input.read_u16()?;
        let z = input.read_i16()?;
        Ok(Self {
            group: report.check_index(group, limits.group_capacity, "electricity unit group"),
            node: report.check_index(node, limits.node_capacity, "electricity unit node"),
            x: report.check_index(x, limits.resolution, "electricity unit x"),
            z: report.check_index(z, limits.resolution, "electricity unit z"),
        })
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Everything the electricity network persists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElectricityState {
    /// `resolution * resolution` cells, row-major.
    pub cells: Vec<ElectricityCell>,
    pub groups: PulseGroupTable<ElectricityPulseGroup>,
    pub units: PulseQueue<ElectricityPulseUnit>,
    /// Pulse group of each network node, or [`UNASSIGNED`].
    pub node_groups: Vec<u16>,
    pub progress: PropagationProgress,
}

impl ElectricityState {
    /// Freshly allocated, fully default state for `layout`.
    pub fn new(layout: &ElectricityLayout) -> Self {
        Self {
            cells: vec![ElectricityCell::default(); layout.cell_count()],
            groups: PulseGroupTable::new(layout.group_capacity),
            units: PulseQueue::new(layout.unit_capacity),
            node_groups: vec![UNASSIGNED; layout.node_capacity],
            progress: PropagationProgress::default(),
        }
    }

    /// Grid resolution implied by the cell count.
    pub fn resolution(&self) -> usize {
        self.cells.len().isqrt()
    }

    pub fn cell(&self, x: usize, z: usize) -> Option<&ElectricityCell> {
        let resolution = self.resolution();
        if x >= resolution || z >= resolution {
            return None;
        }
        self.cells.get(cell_index(x, z, resolution))
    }

    pub fn cell_mut(&mut self, x: usize, z: usize) -> Option<&mut ElectricityCell> {
        let resolution = self.resolution();
        if x >= resolution || z >= resolution {
            return None;
        }
        self.cells.get_mut(cell_index(x, z, resolution))
    }

    /// Number of cells taking part in the network.
    pub fn conductive_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.is_conductive()).count()
    }
}
