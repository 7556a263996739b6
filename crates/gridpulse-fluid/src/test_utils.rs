//! Deterministic water states for tests and benchmarks.

use gridpulse_core::guard::UNASSIGNED;
use gridpulse_core::pulse::PropagationProgress;
use gridpulse_core::test_utils::FillRng;

use crate::{NetworkPulses, WaterLayout, WaterPulseGroup, WaterPulseUnit, WaterState};

/// A 6x6 grid with room for 5 groups, 8 queue slots, 20 nodes and 40
/// pipe segments.
pub fn small_layout() -> WaterLayout {
    WaterLayout {
        resolution: 6,
        group_capacity: 5,
        unit_capacity: 8,
        node_capacity: 20,
        segment_capacity: 40,
    }
}

fn group_ref(rng: &mut FillRng, layout: &WaterLayout) -> u16 {
    if rng.percent(20) {
        UNASSIGNED
    } else {
        rng.below(layout.group_capacity as u64) as u16
    }
}

fn fill_network(rng: &mut FillRng, layout: &WaterLayout, network: &mut NetworkPulses) {
    let groups = layout.group_capacity as u64;
    for _ in 0..rng.below(groups + 1) {
        network.groups.push(WaterPulseGroup {
            orig_pressure: rng.u32(),
            cur_pressure: rng.u32(),
            merge_index: group_ref(rng, layout),
            merge_count: rng.u16(),
            node: rng.below(layout.node_capacity as u64) as u16,
        });
    }
    for _ in 0..rng.below(layout.unit_capacity as u64) {
        network.units.push_back(WaterPulseUnit {
            group: rng.below(groups) as u16,
            node: rng.below(layout.node_capacity as u64) as u16,
            x: rng.below(layout.resolution as u64) as u16,
            z: rng.below(layout.resolution as u64) as u16,
        });
    }
}

/// A state that survives a round trip unchanged: fields behind a zero gate
/// hold defaults and every index is in range.
pub fn filled_state(layout: &WaterLayout, seed: u64) -> WaterState {
    let mut rng = FillRng::new(seed);
    let mut state = WaterState::new(layout);
    let segments = layout.segment_capacity as u64;

    for i in 0..state.cells.len() {
        let mut cell = state.cells[i];
        if rng.percent(50) {
            cell.conductivity = 1 + rng.below(255) as u8;
            cell.water_pressure = rng.i16();
            cell.sewage_pressure = rng.i16();
            cell.water_pulse_group = group_ref(&mut rng, layout);
            cell.sewage_pulse_group = group_ref(&mut rng, layout);
            cell.closest_pipe_segment = rng.below(segments) as u16;
            cell.has_water = rng.bool();
            cell.has_sewage = rng.bool();
            cell.tmp_water = rng.bool();
            cell.tmp_sewage = rng.bool();
            cell.pollution = rng.u8();
        }
        if rng.percent(30) {
            cell.conductivity2 = 1 + rng.below(255) as u8;
            cell.heating_pressure = rng.i16();
            cell.heating_pulse_group = group_ref(&mut rng, layout);
            cell.closest_pipe_segment2 = rng.below(segments) as u16;
            cell.has_heating = rng.bool();
            cell.tmp_heating = rng.bool();
        }
        state.cells[i] = cell;
    }

    fill_network(&mut rng, layout, &mut state.water);
    fill_network(&mut rng, layout, &mut state.sewage);
    fill_network(&mut rng, layout, &mut state.heating);

    state.progress = PropagationProgress {
        processed_cells: rng.below(1 << 20) as i32,
        conductive_cells: state.cells.iter().filter(|c| c.carries_water()).count() as i32,
        can_continue: rng.bool(),
    };
    state
}
