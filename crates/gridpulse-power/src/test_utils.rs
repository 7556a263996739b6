//! Deterministic electricity states for tests and benchmarks.

use gridpulse_core::guard::UNASSIGNED;
use gridpulse_core::pulse::PropagationProgress;
use gridpulse_core::test_utils::FillRng;

use crate::{ElectricityLayout, ElectricityPulseGroup, ElectricityPulseUnit, ElectricityState};

/// An 8x8 grid with room for 6 groups, 10 queue slots and 16 nodes.
pub fn small_layout() -> ElectricityLayout {
    ElectricityLayout {
        resolution: 8,
        group_capacity: 6,
        unit_capacity: 10,
        node_capacity: 16,
    }
}

/// A state every field of which survives a round trip unchanged: idle cells
/// hold defaults and every index is in range.
pub fn filled_state(layout: &ElectricityLayout, seed: u64) -> ElectricityState {
    let mut rng = FillRng::new(seed);
    let mut state = ElectricityState::new(layout);
    let resolution = layout.resolution as u64;
    let groups = layout.group_capacity as u64;

    for cell in state.cells.iter_mut() {
        if !rng.percent(40) {
            continue;
        }
        cell.conductivity = 1 + rng.below(255) as u8;
        cell.charge = rng.i16();
        cell.extra_charge = rng.i16();
        cell.pulse_group = if rng.percent(20) {
            UNASSIGNED
        } else {
            rng.below(groups) as u16
        };
        cell.electrified = rng.bool();
        cell.tmp_electrified = rng.bool();
    }

    let group_count = rng.below(groups + 1);
    for _ in 0..group_count {
        state.groups.push(ElectricityPulseGroup {
            orig_charge: rng.u32(),
            cur_charge: rng.u32(),
            merge_index: if rng.bool() { UNASSIGNED } else { rng.below(groups) as u16 },
            merge_count: rng.u16(),
            x: rng.below(resolution) as u16,
            z: rng.below(resolution) as u16,
        });
    }

    let unit_count = rng.below(layout.unit_capacity as u64);
    for _ in 0..unit_count {
        state.units.push_back(ElectricityPulseUnit {
            group: rng.below(groups) as u16,
            node: rng.below(layout.node_capacity as u64) as u16,
            x: rng.below(resolution) as u16,
            z: rng.below(resolution) as i16,
        });
    }

    for slot in state.node_groups.iter_mut() {
        if rng.percent(50) {
            *slot = rng.below(groups) as u16;
        }
    }

    state.progress = PropagationProgress {
        processed_cells: rng.below(1 << 20) as i32,
        conductive_cells: state.conductive_cells() as i32,
        can_continue: rng.bool(),
    };
    state
}
