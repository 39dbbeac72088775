#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: decode → encode → decode.
//
// Whatever the decoder accepts must encode, and the encoding must decode
// back to the same movie.
fuzz_target!(|data: &[u8]| {
    let Ok(movie) = swf_decoder::MovieDecoder::decode(data) else {
        return;
    };
    let encoded = swf_encoder::encode_movie(&movie).unwrap();
    let again = swf_decoder::MovieDecoder::decode(&encoded).unwrap();
    assert_eq!(again, movie);
});
