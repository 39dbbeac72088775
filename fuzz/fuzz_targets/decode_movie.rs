#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: movie decoder entry point.
//
// Calls `MovieDecoder::decode(data)` on arbitrary input bytes.
// Catches bugs in:
// - Prefix validation (signature, declared length)
// - zlib inflation and the inflate ceiling
// - Tag header scanning and span bookkeeping
// - Per-tag body decoding (shapes, styles, actions, sprites)
// - End sentinel and trailing data handling
fuzz_target!(|data: &[u8]| {
    let _ = swf_decoder::MovieDecoder::decode(data);
});
