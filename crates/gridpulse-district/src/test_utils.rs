//! Deterministic district states for tests.

use gridpulse_core::test_utils::FillRng;

use crate::district::{BLEND_CHANNELS, DistrictCell, DistrictLayout, DistrictState};

/// A 12x12 grid with the production id capacity.
pub fn small_district_layout() -> DistrictLayout {
    DistrictLayout {
        resolution: 12,
        ..DistrictLayout::default()
    }
}

fn filled_cell(rng: &mut FillRng, id_capacity: usize) -> DistrictCell {
    if rng.percent(35) {
        return DistrictCell::default();
    }
    let mut cell = DistrictCell::default();
    for k in 0..BLEND_CHANNELS {
        cell.districts[k] = rng.below(id_capacity as u64) as u8;
        cell.alphas[k] = rng.u8();
    }
    cell.districts[0] = cell.districts[0].max(1);
    cell
}

/// A state with roughly a third of each grid unassigned. Unassigned cells
/// keep the default blend.
pub fn filled_districts(layout: &DistrictLayout, seed: u64) -> DistrictState {
    let mut rng = FillRng::new(seed);
    let mut state = DistrictState::new(layout);
    for cell in state.districts.iter_mut().chain(state.parks.iter_mut()) {
        *cell = filled_cell(&mut rng, layout.id_capacity);
    }
    state
}
