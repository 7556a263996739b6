//! Electricity container orchestrator.
//!
//! Payload order: conductivity for every cell; then charge, extra charge,
//! pulse group, electrified and temporary electrified for conducting cells
//! only; then the pulse-group table, the pulse-unit queue, the node-group
//! lookup and the propagation progress scalars.

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

use crate::{ElectricityCell, ElectricityLayout, ElectricityState};

const PLANS: &[VersionPlan] = &[VersionPlan::new(1, Sections::NETWORK_STATE)];

/// Saves and restores [`ElectricityState`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElectricityCodec {
    pub layout: ElectricityLayout,
    pub options: CodecOptions,
}

impl ElectricityCodec {
    pub fn new(options: CodecOptions) -> Self {
        Self {
            layout: ElectricityLayout::default(),
            options,
        }
    }

    pub fn with_layout(layout: ElectricityLayout, options: CodecOptions) -> Self {
        Self { layout, options }
    }
}

impl DomainCodec for ElectricityCodec {
    type State = ElectricityState;

    const TAG: &'static str = "Electricity";
    const VERSION_WIDTH: VersionWidth = VersionWidth::U32;

    fn current_version(&self) -> FormatVersion {
        version::current(PLANS)
    }

    fn encode(&self, state: &ElectricityState, out: &mut ByteWriter) {
        let cells = fit_cells(&state.cells, self.layout.cell_count(), "electricity cells");
        let cells = &*cells;
        let conducts = ElectricityCell::is_conductive;

        write_grid_field(out, cells, |c| c.conductivity);

        write_gated_field(out, cells, conducts, |c| c.charge);
        write_gated_field(out, cells, conducts, |c| c.extra_charge);
        write_gated_field(out, cells, conducts, |c| c.pulse_group);
        write_gated_field(out, cells, conducts, |c| c.electrified);
        write_gated_field(out, cells, conducts, |c| c.tmp_electrified);

        write_groups(out, &state.groups);
        write_units(out, &state.units);

        // Fixed length regardless of what the host handed us.
        let mut nodes = out.begin_write::<u16>();
        for i in 0..self.layout.node_capacity {
            nodes.write(state.node_groups.get(i).copied().unwrap_or(UNASSIGNED));
        }
        nodes.end_write();

        state.progress.write(out);
    }

    fn decode(
        &self,
        version: FormatVersion,
        input: &mut ByteReader<'_>,
        report: &mut DecodeReport,
    ) -> Result<ElectricityState, DecodeError> {
        let plan = version::select_plan(PLANS, Self::TAG, version)?;
        let limits = self.layout.limits();
        let mut state = ElectricityState::new(&self.layout);
        let cells = state.cells.as_mut_slice();
        let conducts = ElectricityCell::is_conductive;

        report.enter(Self::TAG, DecodeStage::GatingFields);
        read_grid_field(input, cells, |c, v| c.conductivity = v)?;

        report.enter(Self::TAG, DecodeStage::GatedFields);
        read_gated_field(input, cells, conducts, |c, v| c.charge = v, 0)?;
        read_gated_field(input, cells, conducts, |c, v| c.extra_charge = v, 0)?;
        read_gated_field(
            input,
            cells,
            conducts,
            |c, v| c.pulse_group = report.check_ref(v, limits.group_capacity, "electricity cell pulse group"),
            UNASSIGNED,
        )?;
        read_gated_field(input, cells, conducts, |c, v| c.electrified = v, false)?;
        read_gated_field(input, cells, conducts, |c, v| c.tmp_electrified = v, false)?;

        if !self.options.electric_roads_enabled {
            let cleared = cells.iter().filter(|c| c.tmp_electrified).count();
            cells.iter_mut().for_each(|c| c.tmp_electrified = false);
            tracing::debug!(cleared, "electric roads disabled, cleared temporary charge");
        }

        report.enter(Self::TAG, DecodeStage::VersionBranch);
        if !plan.has(Sections::NETWORK_STATE) {
            return Ok(state);
        }

        report.enter(Self::TAG, DecodeStage::NetworkState);
        read_groups(input, &mut state.groups, &limits, report, "electricity pulse groups")?;
        read_units(input, &mut state.units, &limits, report, "electricity pulse units")?;
        read_grid_field(input, &mut state.node_groups, |slot, v| {
            *slot = report.check_ref(v, limits.group_capacity, "electricity node group");
        })?;
        state.progress = PropagationProgress::read(input)?;

        Ok(state)
    }

    fn default_state(&self) -> ElectricityState {
        ElectricityState::new(&self.layout)
    }
}
