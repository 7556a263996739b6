//! Water, sewage and heating network state for the Gridpulse codec.
//!
//! One grid carries all three pipe networks. Water and sewage share the
//! water conductivity gate; heating has a gate of its own. Each network keeps
//! its own pulse-group table and pulse-unit queue.
//!
//! # Design
//!
//! - A cell's water and sewage fields are only meaningful when
//!   `conductivity != 0`; its heating fields only when `conductivity2 != 0`.
//! - Heating was added in format version 2. Older data leaves every heating
//!   field at its default (see [`WaterCell::reset_heating`]).
//! - Pulse groups reference a representative network node rather than a
//!   grid coordinate. Pulse units store both coordinates unsigned.

pub mod codec;
pub use codec::WaterCodec;

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

pub const WATER_GRID_RESOLUTION: usize = 462;
pub const MAX_PULSE_GROUPS: usize = 1024;
pub const MAX_PULSE_UNITS: usize = 32768;
pub const NODE_CAPACITY: usize = 32768;
pub const PIPE_SEGMENT_CAPACITY: usize = 36864;

/// Sizes of every water structure. The three networks share them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaterLayout {
    pub resolution: usize,
    pub group_capacity: usize,
    pub unit_capacity: usize,
    pub node_capacity: usize,
    pub segment_capacity: usize,
}

impl Default for WaterLayout {
    fn default() -> Self {
        Self {
            resolution: WATER_GRID_RESOLUTION,
            group_capacity: MAX_PULSE_GROUPS,
            unit_capacity: MAX_PULSE_UNITS,
            node_capacity: NODE_CAPACITY,
            segment_capacity: PIPE_SEGMENT_CAPACITY,
        }
    }
}

impl WaterLayout {
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

/// One water grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaterCell {
    /// Water and sewage gate.
    pub conductivity: u8,
    /// Heating gate.
    pub conductivity2: u8,
    pub water_pressure: i16,
    pub sewage_pressure: i16,
    pub heating_pressure: i16,
    pub water_pulse_group: u16,
    pub sewage_pulse_group: u16,
    pub heating_pulse_group: u16,
    /// Nearest water pipe segment, 0 when none.
    pub closest_pipe_segment: u16,
    /// Nearest heating pipe segment, 0 when none.
    pub closest_pipe_segment2: u16,
    pub has_water: bool,
    pub has_sewage: bool,
    pub has_heating: bool,
    pub tmp_water: bool,
    pub tmp_sewage: bool,
    pub tmp_heating: bool,
    pub pollution: u8,
}

impl Default for WaterCell {
    fn default() -> Self {
        Self {
            conductivity: 0,
            conductivity2: 0,
            water_pressure: 0,
            sewage_pressure: 0,
            heating_pressure: 0,
            water_pulse_group: UNASSIGNED,
            sewage_pulse_group: UNASSIGNED,
            heating_pulse_group: UNASSIGNED,
            closest_pipe_segment: 0,
            closest_pipe_segment2: 0,
            has_water: false,
            has_sewage: false,
            has_heating: false,
            tmp_water: false,
            tmp_sewage: false,
            tmp_heating: false,
            pollution: 0,
        }
    }
}

impl WaterCell {
    pub fn carries_water(&self) -> bool {
        self.conductivity != 0
    }

    pub fn carries_heating(&self) -> bool {
        self.conductivity2 != 0
    }

    /// Put every heating field, the heating gate included, back to its
    /// default.
    pub fn reset_heating(&mut self) {
        let default = Self::default();
        self.conductivity2 = default.conductivity2;
        self.heating_pressure = default.heating_pressure;
        self.heating_pulse_group = default.heating_pulse_group;
        self.closest_pipe_segment2 = default.closest_pipe_segment2;
        self.has_heating = default.has_heating;
        self.tmp_heating = default.tmp_heating;
    }

    /// Whether the fields gated on each conductivity hold their defaults
    /// wherever that conductivity is zero.
    pub fn gating_is_consistent(&self) -> bool {
        let d = Self::default();
        let water_ok = self.carries_water()
            || (self.water_pressure == d.water_pressure
                && self.sewage_pressure == d.sewage_pressure
                && self.water_pulse_group == d.water_pulse_group
                && self.sewage_pulse_group == d.sewage_pulse_group
                && self.closest_pipe_segment == d.closest_pipe_segment
                && self.has_water == d.has_water
                && self.has_sewage == d.has_sewage
                && self.tmp_water == d.tmp_water
                && self.tmp_sewage == d.tmp_sewage
                && self.pollution == d.pollution);
        let heating_ok = self.carries_heating()
            || (self.heating_pressure == d.heating_pressure
                && self.heating_pulse_group == d.heating_pulse_group
                && self.closest_pipe_segment2 == d.closest_pipe_segment2
                && self.has_heating == d.has_heating
                && self.tmp_heating == d.tmp_heating);
        water_ok && heating_ok
    }
}

// ---------------------------------------------------------------------------
// Pulse records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaterPulseGroup {
    pub orig_pressure: u32,
    pub cur_pressure: u32,
    pub merge_index: u16,
    pub merge_count: u16,
    /// Representative network node.
    pub node: u16,
}

impl Default for WaterPulseGroup {
    fn default() -> Self {
        Self {
            orig_pressure: 0,
            cur_pressure: 0,
            merge_index: UNASSIGNED,
            merge_count: 0,
            node: 0,
        }
    }
}

impl PulseRecord for WaterPulseGroup {
    fn write(&self, out: &mut ByteWriter) {
        out.write_u32(self.orig_pressure);
        out.write_u32(self.cur_pressure);
        out.write_u16(self.merge_index);
        out.write_u16(self.merge_count);
        out.write_u16(self.node);
    }

    fn read(
        input: &mut ByteReader<'_>,
        limits: &PulseLimits,
        report: &mut DecodeReport,
    ) -> Result<Self, DecodeError> {
        let orig_pressure = input.read_u32()?;
        let cur_pressure = input.read_u32()?;
        let merge_index = input.read_u16()?;
        let merge_count = input.read_u16()?;
        let node = input.read_u16()?;
        Ok(Self {
            orig_pressure,
            cur_pressure,
            merge_index: report.check_ref(merge_index, limits.group_capacity, "water group merge index"),
            merge_count,
            node: report.check_index(node, limits.node_capacity, "water group node"),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaterPulseUnit {
    pub group: u16,
    pub node: u16,
    pub x: u16,
    pub z: u16,
}

impl PulseRecord for WaterPulseUnit {
    fn write(&self, out: &mut ByteWriter) {
        out.write_u16(self.group);
        out.write_u16(self.node);
        out.write_u16(self.x);
        out.write_u16(self.z);
    }

    fn read(
        input: &mut ByteReader<'_>,
        limits: &PulseLimits,
        report: &mut DecodeReport,
    ) -> Result<Self, DecodeError> {
        let group = input.read_u16()?;
        let node = input.read_u16()?;
        let x = input.read_u16()?;
        let z = input.read_u16()?;
        Ok(Self {
            group: report.check_index(group, limits.group_capacity, "water unit group"),
            node: report.check_index(node, limits.node_capacity, "water unit node"),
            x: report.check_index(x, limits.resolution, "water unit x"),
            z: report.check_index(z, limits.resolution, "water unit z"),
        })
    }
}

// ---------------------------------------------------------------------------
// Networks and state
// ---------------------------------------------------------------------------

/// Which of the three pipe networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipeNetwork {
    Water,
    Sewage,
    Heating,
}

impl PipeNetwork {
    pub const ALL: [PipeNetwork; 3] = [PipeNetwork::Water, PipeNetwork::Sewage, PipeNetwork::Heating];

    pub(crate) fn groups_field(self) -> &'static str {
        match self {
            PipeNetwork::Water => "water pulse groups",
            PipeNetwork::Sewage => "sewage pulse groups",
            PipeNetwork::Heating => "heating pulse groups",
        }
    }

    pub(crate) fn units_field(self) -> &'static str {
        match self {
            PipeNetwork::Water => "water pulse units",
            PipeNetwork::Sewage => "sewage pulse units",
            PipeNetwork::Heating => "heating pulse units",
        }
    }
}

/// Propagation state of one pipe network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkPulses {
    pub groups: PulseGroupTable<WaterPulseGroup>,
    pub units: PulseQueue<WaterPulseUnit>,
}

impl NetworkPulses {
    pub fn new(layout: &WaterLayout) -> Self {
        Self {
            groups: PulseGroupTable::new(layout.group_capacity),
            units: PulseQueue::new(layout.unit_capacity),
        }
    }
}

/// Everything the water, sewage and heating networks persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaterState {
    pub cells: Vec<WaterCell>,
    pub water: NetworkPulses,
    pub sewage: NetworkPulses,
    pub heating: NetworkPulses,
    pub progress: PropagationProgress,
}

impl WaterState {
    pub fn new(layout: &WaterLayout) -> Self {
        Self {
            cells: vec![WaterCell::default(); layout.cell_count()],
            water: NetworkPulses::new(layout),
            sewage: NetworkPulses::new(layout),
            heating: NetworkPulses::new(layout),
            progress: PropagationProgress::default(),
        }
    }

    pub fn network(&self, network: PipeNetwork) -> &NetworkPulses {
        match network {
            PipeNetwork::Water => &self.water,
            PipeNetwork::Sewage => &self.sewage,
            PipeNetwork::Heating => &self.heating,
        }
    }

    pub fn network_mut(&mut self, network: PipeNetwork) -> &mut NetworkPulses {
        match network {
            PipeNetwork::Water => &mut self.water,
            PipeNetwork::Sewage => &mut self.sewage,
            PipeNetwork::Heating => &mut self.heating,
        }
    }

    pub fn resolution(&self) -> usize {
        self.cells.len().isqrt()
    }

    pub fn cell(&self, x: usize, z: usize) -> Option<&WaterCell> {
        let resolution = self.resolution();
        if x >= resolution || z >= resolution {
            return None;
        }
        self.cells.get(cell_index(x, z, resolution))
    }

    pub fn cell_mut(&mut self, x: usize, z: usize) -> Option<&mut WaterCell> {
        let resolution = self.resolution();
        if x >= resolution || z >= resolution {
            return None;
        }
        self.cells.get_mut(cell_index(x, z, resolution))
    }
}
