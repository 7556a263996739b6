//! Hostile and damaged input for every domain codec.
//!
//! Damaged data should either decode with clamped values or fail with a
//! truncation error. It must never panic, and it must never leave the host
//! half updated.

use gridpulse_core::error::DecodeError;
use gridpulse_core::host::{DomainCodec, OwnedHost, load_domain, save_domain};
use gridpulse_core::options::CodecOptions;
use gridpulse_core::test_utils::capture_logs;
use gridpulse_core::version::FormatVersion;
use gridpulse_district::test_utils::{filled_districts, small_district_layout};
use gridpulse_district::{AreaCodec, DistrictCodec};
use gridpulse_fluid::WaterCodec;
use gridpulse_power::ElectricityCodec;
use proptest::prelude::*;

/// Load every strict prefix of `blob` into a host holding `original` and
/// check each one fails as a truncation without touching the host.
fn assert_prefixes_fail<C>(codec: &C, blob: &[u8], original: C::State)
where
    C: DomainCodec,
    C::State: Clone + PartialEq + std::fmt::Debug,
{
    let mut host = OwnedHost::new(original.clone());
    for cut in 0..blob.len() {
        let err = load_domain(codec, &mut host, Some(&blob[..cut])).unwrap_err();
        assert!(err.is_truncation(), "cut {cut} of {}: {err}", blob.len());
    }
    assert_eq!(host.installs, 0);
    assert_eq!(host.state, original);
}

#[test]
fn every_prefix_of_every_domain_is_a_truncation() {
    let electricity = ElectricityCodec::with_layout(gridpulse_power::test_utils::small_layout(), CodecOptions::default());
    let state = gridpulse_power::test_utils::filled_state(&electricity.layout, 1);
    let blob = save_domain(&electricity, &OwnedHost::new(state.clone()));
    assert_prefixes_fail(&electricity, &blob, state);

    let water = WaterCodec::with_layout(gridpulse_fluid::test_utils::small_layout(), CodecOptions::default());
    let state = gridpulse_fluid::test_utils::filled_state(&water.layout, 1);
    let blob = save_domain(&water, &OwnedHost::new(state.clone()));
    assert_prefixes_fail(&water, &blob, state);

    let districts = DistrictCodec::with_layout(small_district_layout(), CodecOptions::default());
    let state = filled_districts(&districts.layout, 1);
    let blob = save_domain(&districts, &OwnedHost::new(state.clone()));
    assert_prefixes_fail(&districts, &blob, state);

    let areas = AreaCodec::default();
    let blob = save_domain(&areas, &OwnedHost::new(areas.default_state()));
    assert_prefixes_fail(&areas, &blob, areas.default_state());
}

#[test]
fn short_payload_inside_intact_envelope() {
    let codec = ElectricityCodec::with_layout(gridpulse_power::test_utils::small_layout(), CodecOptions::default());
    let payload = codec.encode_payload(&codec.default_state());
    let err = codec
        .decode_payload(FormatVersion(1), &payload[..payload.len() - 1])
        .unwrap_err();
    assert!(matches!(err, DecodeError::Truncated { .. }));
}

#[test]
fn oversized_group_count_is_absorbed() {
    let codec = ElectricityCodec::with_layout(gridpulse_power::test_utils::small_layout(), CodecOptions::default());
    let mut state = codec.default_state();
    for i in 0..codec.layout.group_capacity {
        state.groups.push(gridpulse_power::ElectricityPulseGroup {
            orig_charge: i as u32,
            ..Default::default()
        });
    }
    let mut payload = codec.encode_payload(&state);

    // Rewrite the group count to claim one more record than the table holds
    // and splice that record in after the last one.
    // No cell conducts, so the group count follows the conductivity field.
    let count_at = codec.layout.cell_count();
    let record_len = 16;
    let capacity = codec.layout.group_capacity;
    payload[count_at..count_at + 2].copy_from_slice(&((capacity + 1) as u16).to_le_bytes());
    let insert_at = count_at + 2 + capacity * record_len;
    let extra = [7u8, 0, 0, 0, 7, 0, 0, 0, 0xFF, 0xFF, 0, 0, 0, 0, 0, 0];
    payload.splice(insert_at..insert_at, extra);

    let ((state, report), logs) = capture_logs(|| codec.decode_payload(FormatVersion(1), &payload).unwrap());
    assert_eq!(state.groups.len(), capacity);
    assert_eq!(report.discarded_records, 1);
    assert_eq!(report.anomalies_for("electricity pulse groups").count(), 1);
    assert!(logs.iter().any(|l| l.starts_with("ERROR") && l.contains("electricity pulse groups")));
    // The stream stayed aligned: the node lookup and progress read cleanly.
    assert_eq!(report.bytes_read, payload.len());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn arbitrary_payloads_never_panic(
        data in proptest::collection::vec(any::<u8>(), 0..1024),
        version in 0..4u32,
    ) {
        let options = CodecOptions::default();
        let electricity = ElectricityCodec::with_layout(gridpulse_power::test_utils::small_layout(), options);
        let water = WaterCodec::with_layout(gridpulse_fluid::test_utils::small_layout(), options);
        let districts = DistrictCodec::with_layout(small_district_layout(), options);
        let areas = AreaCodec::default();
        let version = FormatVersion(version);

        if let Ok((state, _)) = electricity.decode_payload(version, &data) {
            let groups = electricity.layout.group_capacity;
            prop_assert!(state.groups.len() <= groups);
            prop_assert!(state.units.iter().all(|u| usize::from(u.group) < groups && (u.z as usize) < electricity.layout.resolution));
        }
        if let Ok((state, _)) = water.decode_payload(version, &data) {
            prop_assert!(state.cells.iter().all(|c| usize::from(c.closest_pipe_segment) < water.layout.segment_capacity));
        }
        if let Ok((state, _)) = districts.decode_payload(version, &data) {
            prop_assert!(state.districts.iter().all(|c| c.districts.iter().all(|&d| usize::from(d) < 128)));
        }
        let _ = areas.decode_payload(version, &data);
    }

    #[test]
    fn arbitrary_blobs_never_install_garbage(data in proptest::collection::vec(any::<u8>(), 0..256)) {
        let codec = AreaCodec::default();
        let mut host = OwnedHost::new(codec.default_state());
        match load_domain(&codec, &mut host, Some(&data)) {
            Ok(_) => prop_assert_eq!(host.installs, 1),
            Err(_) => prop_assert_eq!(host.installs, 0),
        }
    }
}
