//! Criterion benchmarks for the electricity codec at production size.
//!
//! Two benchmarks on a 462x462 grid with roughly 40% conducting cells:
//! - `electricity_encode`: state to payload
//! - `electricity_decode`: payload to freshly allocated state

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use gridpulse_core::host::DomainCodec;
use gridpulse_core::options::CodecOptions;
use gridpulse_power::ElectricityCodec;
use gridpulse_power::test_utils::filled_state;

fn bench_encode(c: &mut Criterion) {
    let codec = ElectricityCodec::new(CodecOptions::default());
    let state = filled_state(&codec.layout, 42);

    c.bench_function("electricity_encode", |b| {
        b.iter(|| codec.encode_payload(black_box(&state)))
    });
}

fn bench_decode(c: &mut Criterion) {
    let codec = ElectricityCodec::new(CodecOptions::default());
    let payload = codec.encode_payload(&filled_state(&codec.layout, 42));
    let version = codec.current_version();

    c.bench_function("electricity_decode", |b| {
        b.iter(|| codec.decode_payload(version, black_box(&payload)))
    });
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
