//! Criterion benchmarks for the water codec at production size.
//!
//! A 462x462 grid with all three networks populated:
//! - `water_encode`
//! - `water_decode`
//! - `water_decode_v1`: legacy payload without heating

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use gridpulse_core::host::DomainCodec;
use gridpulse_core::options::CodecOptions;
use gridpulse_core::version::FormatVersion;
use gridpulse_fluid::WaterCodec;
use gridpulse_fluid::test_utils::filled_state;

fn bench_encode(c: &mut Criterion) {
    let codec = WaterCodec::new(CodecOptions::default());
    let state = filled_state(&codec.layout, 42);

    c.bench_function("water_encode", |b| {
        b.iter(|| codec.encode_payload(black_box(&state)))
    });
}

fn bench_decode(c: &mut Criterion) {
    let codec = WaterCodec::new(CodecOptions::default());
    let state = filled_state(&codec.layout, 42);
    let payload = codec.encode_payload(&state);
    let version = codec.current_version();

    c.bench_function("water_decode", |b| {
        b.iter(|| codec.decode_payload(version, black_box(&payload)))
    });

    if let Ok(legacy) = codec.encode_version(&state, FormatVersion(1)) {
        c.bench_function("water_decode_v1", |b| {
            b.iter(|| codec.decode_payload(FormatVersion(1), black_box(&legacy)))
        });
    }
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
