#![no_main]
use gridpulse_core::envelope::decode_envelope;
use gridpulse_core::version::VersionWidth;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Returning Err is fine; a payload must always lie inside the input.
    for width in [VersionWidth::U16, VersionWidth::U32] {
        if let Ok(envelope) = decode_envelope(data, width) {
            assert!(envelope.payload.len() <= data.len());
        }
    }
});
