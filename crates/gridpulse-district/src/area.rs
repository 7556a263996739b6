//! Unlockable-area grid.
//!
//! One byte per tile: 0 while the tile is locked, otherwise the ordinal in
//! which it was unlocked (1 for the starting tile). Version 1 stored a 5x5
//! grid; it is read into the low-index prefix of the current grid.

use gridpulse_core::cursor::{ByteReader, ByteWriter};
use gridpulse_core::error::DecodeError;
use gridpulse_core::grid::{cell_index, fit_cells, read_grid_field, write_grid_field};
use gridpulse_core::host::DomainCodec;
use gridpulse_core::options::CodecOptions;
use gridpulse_core::report::{DecodeReport, DecodeStage};
use gridpulse_core::version::{self, FormatVersion, Sections, VersionPlan, VersionWidth};

pub const AREA_GRID_RESOLUTION: usize = 9;
pub const LEGACY_AREA_GRID_RESOLUTION: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaLayout {
    pub resolution: usize,
}

impl Default for AreaLayout {
    fn default() -> Self {
        Self {
            resolution: AREA_GRID_RESOLUTION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaState {
    pub tiles: Vec<u8>,
}

impl AreaState {
    pub fn new(layout: &AreaLayout) -> Self {
        Self {
            tiles: vec![0; layout.resolution * layout.resolution],
        }
    }

    pub fn resolution(&self) -> usize {
        self.tiles.len().isqrt()
    }

    pub fn is_unlocked(&self, x: usize, z: usize) -> bool {
        let resolution = self.resolution();
        x < resolution && z < resolution && self.tiles[cell_index(x, z, resolution)] != 0
    }

    pub fn unlocked_count(&self) -> usize {
        self.tiles.iter().filter(|&&t| t != 0).count()
    }

    /// Ordinal the next unlocked tile receives.
    pub fn next_ordinal(&self) -> u8 {
        self.tiles.iter().copied().max().unwrap_or(0).saturating_add(1)
    }

    /// Unlock `(x, z)`. Returns `false` if it is outside the grid or was
    /// already unlocked.
    pub fn unlock(&mut self, x: usize, z: usize) -> bool {
        let resolution = self.resolution();
        if x >= resolution || z >= resolution {
            return false;
        }
        let ordinal = self.next_ordinal();
        let tile = &mut self.tiles[cell_index(x, z, resolution)];
        if *tile != 0 {
            return false;
        }
        *tile = ordinal;
        true
    }

    /// Unlock every locked tile in index order. Returns how many changed.
    pub fn unlock_all(&mut self) -> usize {
        let mut ordinal = self.next_ordinal();
        let mut unlocked = 0;
        for tile in self.tiles.iter_mut().filter(|t| **t == 0) {
            *tile = ordinal;
            ordinal = ordinal.saturating_add(1);
            unlocked += 1;
        }
        unlocked
    }
}

const PLANS: &[VersionPlan] = &[
    VersionPlan::new(1, Sections::empty()).with_stored_resolution(LEGACY_AREA_GRID_RESOLUTION),
    VersionPlan::new(2, Sections::empty()),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AreaCodec {
    pub layout: AreaLayout,
    pub options: CodecOptions,
}

impl AreaCodec {
    pub fn new(options: CodecOptions) -> Self {
        Self {
            layout: AreaLayout::default(),
            options,
        }
    }

    pub fn with_layout(layout: AreaLayout, options: CodecOptions) -> Self {
        Self { layout, options }
    }

    /// Encode `state` as stored by an older format version. Version 1 keeps
    /// only the low-index prefix.
    pub fn encode_version(&self, state: &AreaState, version: FormatVersion) -> Result<Vec<u8>, DecodeError> {
        let plan = version::select_plan(PLANS, Self::TAG, version)?;
        let tiles = self.fitted_tiles(state);
        let stored = plan.stored_cells(self.layout.resolution);
        let mut out = ByteWriter::new();
        write_grid_field(&mut out, &tiles[..stored], |t| *t);
        Ok(out.into_vec())
    }

    fn fitted_tiles<'s>(&self, state: &'s AreaState) -> std::borrow::Cow<'s, [u8]> {
        let resolution = self.layout.resolution;
        fit_cells(&state.tiles, resolution * resolution, "area tiles")
    }
}

impl DomainCodec for AreaCodec {
    type State = AreaState;

    const TAG: &'static str = "Areas";
    const VERSION_WIDTH: VersionWidth = VersionWidth::U16;

    fn current_version(&self) -> FormatVersion {
        version::current(PLANS)
    }

    fn encode(&self, state: &AreaState, out: &mut ByteWriter) {
        write_grid_field(out, &self.fitted_tiles(state), |t| *t);
    }

    fn decode(
        &self,
        version: FormatVersion,
        input: &mut ByteReader<'_>,
        report: &mut DecodeReport,
    ) -> Result<AreaState, DecodeError> {
        let plan = version::select_plan(PLANS, Self::TAG, version)?;
        let mut state = AreaState::new(&self.layout);
        let stored = plan.stored_cells(self.layout.resolution);

        report.enter(Self::TAG, DecodeStage::GatingFields);
        read_grid_field(input, &mut state.tiles[..stored], |t, v| *t = v)?;

        report.enter(Self::TAG, DecodeStage::VersionBranch);
        if stored < state.tiles.len() {
            tracing::debug!(stored, total = state.tiles.len(), "legacy area grid, remaining tiles locked");
        }

        if self.options.ignore_unlocking {
            let unlocked = state.unlock_all();
            tracing::debug!(unlocked, "unlocking ignored, every tile unlocked");
        }
        Ok(state)
    }

    fn default_state(&self) -> AreaState {
        AreaState::new(&self.layout)
    }
}
