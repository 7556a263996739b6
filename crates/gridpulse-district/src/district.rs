//! District and park ownership grids.
//!
//! Each cell can belong to up to four districts at once, blended by four
//! weight channels. The park grid uses the same cell shape. Payload order,
//! per grid: `districts[0..4]` then `alphas[0..4]`, one field-major byte
//! field each, the district grid first and the park grid second.

use gridpulse_core::cursor::{ByteReader, ByteWriter};
use gridpulse_core::error::DecodeError;
use gridpulse_core::grid::{cell_index, fit_cells, read_grid_field, write_grid_field};
use gridpulse_core::host::DomainCodec;
use gridpulse_core::options::CodecOptions;
use gridpulse_core::report::{DecodeReport, DecodeStage};
use gridpulse_core::version::{self, FormatVersion, Repair, Sections, VersionPlan, VersionWidth};

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

pub const DISTRICT_GRID_RESOLUTION: usize = 900;
/// District ids (and park ids) are below this value; 0 means none.
pub const MAX_DISTRICT_COUNT: usize = 128;
pub const BLEND_CHANNELS: usize = 4;
/// Blend of a cell owned by nothing but its first channel.
pub const DEFAULT_ALPHAS: [u8; BLEND_CHANNELS] = [255, 0, 0, 0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistrictLayout {
    pub resolution: usize,
    pub id_capacity: usize,
}

impl Default for DistrictLayout {
    fn default() -> Self {
        Self {
            resolution: DISTRICT_GRID_RESOLUTION,
            id_capacity: MAX_DISTRICT_COUNT,
        }
    }
}

impl DistrictLayout {
    pub fn cell_count(&self) -> usize {
        self.resolution * self.resolution
    }
}

// ---------------------------------------------------------------------------
// Cell and state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DistrictCell {
    pub districts: [u8; BLEND_CHANNELS],
    pub alphas: [u8; BLEND_CHANNELS],
}

impl Default for DistrictCell {
    fn default() -> Self {
        Self {
            districts: [0; BLEND_CHANNELS],
            alphas: DEFAULT_ALPHAS,
        }
    }
}

impl DistrictCell {
    /// Whether the primary channel names a district.
    pub fn is_assigned(&self) -> bool {
        self.districts[0] != 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistrictState {
    pub districts: Vec<DistrictCell>,
    pub parks: Vec<DistrictCell>,
}

impl DistrictState {
    pub fn new(layout: &DistrictLayout) -> Self {
        Self {
            districts: vec![DistrictCell::default(); layout.cell_count()],
            parks: vec![DistrictCell::default(); layout.cell_count()],
        }
    }

    pub fn resolution(&self) -> usize {
        self.districts.len().isqrt()
    }

    /// Primary district at `(x, z)`, or 0.
    pub fn district_at(&self, x: usize, z: usize) -> u8 {
        primary_at(&self.districts, x, z, self.resolution())
    }

    /// Primary park at `(x, z)`, or 0.
    pub fn park_at(&self, x: usize, z: usize) -> u8 {
        primary_at(&self.parks, x, z, self.resolution())
    }
}

fn primary_at(cells: &[DistrictCell], x: usize, z: usize, resolution: usize) -> u8 {
    if x >= resolution || z >= resolution {
        return 0;
    }
    cells.get(cell_index(x, z, resolution)).map_or(0, |c| c.districts[0])
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

const PLANS: &[VersionPlan] = &[
    VersionPlan::new(1, Sections::empty()),
    VersionPlan::new(2, Sections::SECONDARY_GRID).with_repair(Repair::ResetUnassignedBlend),
    VersionPlan::new(3, Sections::SECONDARY_GRID),
];
const CURRENT_PLAN: &VersionPlan = &PLANS[PLANS.len() - 1];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DistrictCodec {
    pub layout: DistrictLayout,
    pub options: CodecOptions,
}

impl DistrictCodec {
    pub fn new(options: CodecOptions) -> Self {
        Self {
            layout: DistrictLayout::default(),
            options,
        }
    }

    pub fn with_layout(layout: DistrictLayout, options: CodecOptions) -> Self {
        Self { layout, options }
    }

    /// Encode `state` as stored by an older format version.
    pub fn encode_version(&self, state: &DistrictState, version: FormatVersion) -> Result<Vec<u8>, DecodeError> {
        let plan = version::select_plan(PLANS, Self::TAG, version)?;
        let mut out = ByteWriter::new();
        write_payload(state, plan, self.layout.cell_count(), &mut out);
        Ok(out.into_vec())
    }
}

fn write_payload(state: &DistrictState, plan: &VersionPlan, cell_count: usize, out: &mut ByteWriter) {
    write_cells(out, &fit_cells(&state.districts, cell_count, "district cells"));
    if plan.has(Sections::SECONDARY_GRID) {
        write_cells(out, &fit_cells(&state.parks, cell_count, "park cells"));
    }
}

fn write_cells(out: &mut ByteWriter, cells: &[DistrictCell]) {
    for k in 0..BLEND_CHANNELS {
        write_grid_field(out, cells, |c| c.districts[k]);
    }
    for k in 0..BLEND_CHANNELS {
        write_grid_field(out, cells, |c| c.alphas[k]);
    }
}

fn read_cells(
    input: &mut ByteReader<'_>,
    cells: &mut [DistrictCell],
    id_capacity: usize,
    report: &mut DecodeReport,
    field: &'static str,
) -> Result<(), DecodeError> {
    for k in 0..BLEND_CHANNELS {
        read_grid_field(input, cells, |c, v| c.districts[k] = report.check_index(v, id_capacity, field))?;
    }
    for k in 0..BLEND_CHANNELS {
        read_grid_field(input, cells, |c, v| c.alphas[k] = v)?;
    }
    Ok(())
}

/// Reset the blend of every cell without a primary district. Returns the
/// number of cells changed.
pub fn reset_unassigned_blend(cells: &mut [DistrictCell]) -> usize {
    let mut repaired = 0;
    for cell in cells.iter_mut().filter(|c| !c.is_assigned()) {
        if cell.alphas != DEFAULT_ALPHAS {
            cell.alphas = DEFAULT_ALPHAS;
            repaired += 1;
        }
    }
    repaired
}

impl DomainCodec for DistrictCodec {
    type State = DistrictState;

    const TAG: &'static str = "Districts";
    const VERSION_WIDTH: VersionWidth = VersionWidth::U16;

    fn current_version(&self) -> FormatVersion {
        version::current(PLANS)
    }

    fn encode(&self, state: &DistrictState, out: &mut ByteWriter) {
        write_payload(state, CURRENT_PLAN, self.layout.cell_count(), out);
    }

    fn decode(
        &self,
        version: FormatVersion,
        input: &mut ByteReader<'_>,
        report: &mut DecodeReport,
    ) -> Result<DistrictState, DecodeError> {
        let plan = version::select_plan(PLANS, Self::TAG, version)?;
        let mut state = DistrictState::new(&self.layout);
        let ids = self.layout.id_capacity;

        report.enter(Self::TAG, DecodeStage::GatingFields);
        read_cells(input, &mut state.districts, ids, report, "district id")?;

        report.enter(Self::TAG, DecodeStage::VersionBranch);
        if plan.has(Sections::SECONDARY_GRID) {
            read_cells(input, &mut state.parks, ids, report, "park id")?;
        } else {
            tracing::debug!(version = version.0, "stored data predates parks, park grid left at defaults");
        }

        if plan.repair == Some(Repair::ResetUnassignedBlend) {
            report.enter(Self::TAG, DecodeStage::Repair);
            let repaired = reset_unassigned_blend(&mut state.districts) + reset_unassigned_blend(&mut state.parks);
            report.repaired_cells += repaired;
            tracing::debug!(version = version.0, repaired, "reset blend of unassigned cells");
        }

        Ok(state)
    }

    fn default_state(&self) -> DistrictState {
        DistrictState::new(&self.layout)
    }
}
