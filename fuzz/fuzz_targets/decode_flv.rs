#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: FLV decoder entry point.
//
// Exercises header validation, previous-tag-size checks and the
// per-type tag decoders on arbitrary bytes.
fuzz_target!(|data: &[u8]| {
    let _ = swf_decoder::FlvDecoder::decode(data);
});
