//! Water container orchestrator.
//!
//! Payload order:
//!
//! 1. `conductivity`, `conductivity2` for every cell.
//! 2. Pressures (water, sewage, heating), pulse groups (same order), closest
//!    pipe segments (water, heating), flags (has water, has sewage, has
//!    heating, tmp water, tmp sewage, tmp heating), pollution. Water and
//!    sewage fields are gated on `conductivity`, heating fields on
//!    `conductivity2`.
//! 3. Group tables for water, sewage, heating; then their unit queues.
//! 4. Propagation progress.
//!
//! Version 1 predates heating: `conductivity2`, every heating field and the
//! heating table and queue are absent.

use gridpulse_core::cursor::{ByteReader, ByteWriter};
use gridpulse_core::error::DecodeError;
use gridpulse_core::grid::{
    fit_cells, read_gated_field, read_grid_field, write_gated_field, write_grid_field,
};
use gridpulse_core::guard::UNASSIGNED;
use gridpulse_core::host::DomainCodec;
use gridpulse_core::options::CodecOptions;
use gridpulse_core::pulse::{
    PropagationProgress, read_groups, read_units, write_groups, write_units,
};
use gridpulse_core::report::{DecodeReport, DecodeStage};
use gridpulse_core::version::{self, FormatVersion, Sections, VersionPlan, VersionWidth};

use crate::{PipeNetwork, WaterCell, WaterLayout, WaterState};

const PLANS: &[VersionPlan] = &[
    VersionPlan::new(1, Sections::NETWORK_STATE),
    VersionPlan::new(2, Sections::NETWORK_STATE.union(Sections::SECONDARY_GRID)),
];
const CURRENT_PLAN: &VersionPlan = &PLANS[PLANS.len() - 1];

/// Saves and restores [`WaterState`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaterCodec {
    pub layout: WaterLayout,
    pub options: CodecOptions,
}

impl WaterCodec {
    pub fn new(options: CodecOptions) -> Self {
        Self {
            layout: WaterLayout::default(),
            options,
        }
    }

    pub fn with_layout(layout: WaterLayout, options: CodecOptions) -> Self {
        Self { layout, options }
    }

    /// Encode `state` as an older format version would have stored it.
    /// Data the older version cannot represent is left out.
    pub fn encode_version(&self, state: &WaterState, version: FormatVersion) -> Result<Vec<u8>, DecodeError> {
        let plan = version::select_plan(PLANS, Self::TAG, version)?;
        let mut out = ByteWriter::new();
        self.write_payload(state, plan, &mut out);
        Ok(out.into_vec())
    }

    fn write_payload(&self, state: &WaterState, plan: &VersionPlan, out: &mut ByteWriter) {
        let heating = plan.has(Sections::SECONDARY_GRID);
        let cells = fit_cells(&state.cells, self.layout.cell_count(), "water cells");
        let cells = &*cells;
        let water = WaterCell::carries_water;
        let heat = WaterCell::carries_heating;

        write_grid_field(out, cells, |c| c.conductivity);
        if heating {
            write_grid_field(out, cells, |c| c.conductivity2);
        }

        write_gated_field(out, cells, water, |c| c.water_pressure);
        write_gated_field(out, cells, water, |c| c.sewage_pressure);
        if heating {
            write_gated_field(out, cells, heat, |c| c.heating_pressure);
        }
        write_gated_field(out, cells, water, |c| c.water_pulse_group);
        write_gated_field(out, cells, water, |c| c.sewage_pulse_group);
        if heating {
            write_gated_field(out, cells, heat, |c| c.heating_pulse_group);
        }
        write_gated_field(out, cells, water, |c| c.closest_pipe_segment);
        if heating {
            write_gated_field(out, cells, heat, |c| c.closest_pipe_segment2);
        }
        write_gated_field(out, cells, water, |c| c.has_water);
        write_gated_field(out, cells, water, |c| c.has_sewage);
        if heating {
            write_gated_field(out, cells, heat, |c| c.has_heating);
        }
        write_gated_field(out, cells, water, |c| c.tmp_water);
        write_gated_field(out, cells, water, |c| c.tmp_sewage);
        if heating {
            write_gated_field(out, cells, heat, |c| c.tmp_heating);
        }
        write_gated_field(out, cells, water, |c| c.pollution);

        let networks = stored_networks(heating);
        for &network in networks {
            write_groups(out, &state.network(network).groups);
        }
        for &network in networks {
            write_units(out, &state.network(network).units);
        }
        state.progress.write(out);
    }
}

const PRE_HEATING_NETWORKS: [PipeNetwork; 2] = [PipeNetwork::Water, PipeNetwork::Sewage];

fn stored_networks(heating: bool) -> &'static [PipeNetwork] {
    if heating {
        &PipeNetwork::ALL
    } else {
        &PRE_HEATING_NETWORKS
    }
}

impl DomainCodec for WaterCodec {
    type State = WaterState;

    const TAG: &'static str = "Water";
    const VERSION_WIDTH: VersionWidth = VersionWidth::U32;

    fn current_version(&self) -> FormatVersion {
        version::current(PLANS)
    }

    fn encode(&self, state: &WaterState, out: &mut ByteWriter) {
        self.write_payload(state, CURRENT_PLAN, out);
    }

    fn decode(
        &self,
        version: FormatVersion,
        input: &mut ByteReader<'_>,
        report: &mut DecodeReport,
    ) -> Result<WaterState, DecodeError> {
        let plan = version::select_plan(PLANS, Self::TAG, version)?;
        let heating = plan.has(Sections::SECONDARY_GRID);
        let layout = self.layout;
        let limits = layout.limits();
        let mut state = WaterState::new(&layout);
        let cells = state.cells.as_mut_slice();
        let water = WaterCell::carries_water;
        let heat = WaterCell::carries_heating;

        report.enter(Self::TAG, DecodeStage::GatingFields);
        read_grid_field(input, cells, |c, v| c.conductivity = v)?;
        if heating {
            read_grid_field(input, cells, |c, v| c.conductivity2 = v)?;
        }

        report.enter(Self::TAG, DecodeStage::GatedFields);
        read_gated_field(input, cells, water, |c, v| c.water_pressure = v, 0)?;
        read_gated_field(input, cells, water, |c, v| c.sewage_pressure = v, 0)?;
        if heating {
            read_gated_field(input, cells, heat, |c, v| c.heating_pressure = v, 0)?;
        }
        read_gated_field(
            input,
            cells,
            water,
            |c, v| c.water_pulse_group = report.check_ref(v, limits.group_capacity, "water cell pulse group"),
            UNASSIGNED,
        )?;
        read_gated_field(
            input,
            cells,
            water,
            |c, v| c.sewage_pulse_group = report.check_ref(v, limits.group_capacity, "sewage cell pulse group"),
            UNASSIGNED,
        )?;
        if heating {
            read_gated_field(
                input,
                cells,
                heat,
                |c, v| {
                    c.heating_pulse_group = report.check_ref(v, limits.group_capacity, "heating cell pulse group")
                },
                UNASSIGNED,
            )?;
        }
        read_gated_field(
            input,
            cells,
            water,
            |c, v| c.closest_pipe_segment = report.check_index(v, layout.segment_capacity, "closest pipe segment"),
            0,
        )?;
        if heating {
            read_gated_field(
                input,
                cells,
                heat,
                |c, v| {
                    c.closest_pipe_segment2 =
                        report.check_index(v, layout.segment_capacity, "closest heating pipe segment")
                },
                0,
            )?;
        }
        read_gated_field(input, cells, water, |c, v| c.has_water = v, false)?;
        read_gated_field(input, cells, water, |c, v| c.has_sewage = v, false)?;
        if heating {
            read_gated_field(input, cells, heat, |c, v| c.has_heating = v, false)?;
        }
        read_gated_field(input, cells, water, |c, v| c.tmp_water = v, false)?;
        read_gated_field(input, cells, water, |c, v| c.tmp_sewage = v, false)?;
        if heating {
            read_gated_field(input, cells, heat, |c, v| c.tmp_heating = v, false)?;
        }
        read_gated_field(input, cells, water, |c, v| c.pollution = v, 0)?;

        report.enter(Self::TAG, DecodeStage::VersionBranch);
        if !heating {
            cells.iter_mut().for_each(WaterCell::reset_heating);
            tracing::debug!(version = version.0, "stored data predates heating, heating left at defaults");
        }
        if !plan.has(Sections::NETWORK_STATE) {
            return Ok(state);
        }

        report.enter(Self::TAG, DecodeStage::NetworkState);
        let networks = stored_networks(heating);
        for &network in networks {
            let groups = &mut state.network_mut(network).groups;
            read_groups(input, groups, &limits, report, network.groups_field())?;
        }
        for &network in networks {
            let units = &mut state.network_mut(network).units;
            read_units(input, units, &limits, report, network.units_field())?;
        }
        state.progress = PropagationProgress::read(input)?;

        Ok(state)
    }

    fn default_state(&self) -> WaterState {
        WaterState::new(&self.layout)
    }
}
