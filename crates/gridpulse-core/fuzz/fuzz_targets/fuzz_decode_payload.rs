#![no_main]
use arbitrary::Arbitrary;
use gridpulse_core::host::DomainCodec;
use gridpulse_core::options::CodecOptions;
use gridpulse_core::version::FormatVersion;
use gridpulse_district::test_utils::small_district_layout;
use gridpulse_district::{AreaCodec, DistrictCodec};
use gridpulse_fluid::WaterCodec;
use gridpulse_power::ElectricityCodec;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    version: u8,
    ignore_unlocking: bool,
    electric_roads_enabled: bool,
    payload: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let options = CodecOptions {
        ignore_unlocking: input.ignore_unlocking,
        electric_roads_enabled: input.electric_roads_enabled,
    };
    let version = FormatVersion(u32::from(input.version % 5));
    let data = input.payload.as_slice();

    // Small layouts keep each run fast; every decoder must reject or clamp,
    // never panic.
    let electricity = ElectricityCodec::with_layout(gridpulse_power::test_utils::small_layout(), options);
    let _ = electricity.decode_payload(version, data);

    let water = WaterCodec::with_layout(gridpulse_fluid::test_utils::small_layout(), options);
    let _ = water.decode_payload(version, data);

    let districts = DistrictCodec::with_layout(small_district_layout(), options);
    let _ = districts.decode_payload(version, data);

    let areas = AreaCodec::new(options);
    let _ = areas.decode_payload(version, data);
});
