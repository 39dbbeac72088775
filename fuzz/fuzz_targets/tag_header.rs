#![no_main]

use libfuzzer_sys::fuzz_target;
use swf_wire::record_header::TagHeader;
use swf_wire::{BitReader, BitWriter};

// Fuzz target: tag header parsing.
//
// Any header that parses must re-encode to the bytes it was read from.
fuzz_target!(|data: &[u8]| {
    let mut r = BitReader::swf(data);
    let Ok(header) = TagHeader::read_from(&mut r) else {
        return;
    };
    let consumed = r.pointer() / 8;
    assert_eq!(consumed, header.encoded_len());

    let mut w = BitWriter::swf();
    header.write_to(&mut w).unwrap();
    assert_eq!(w.as_bytes(), &data[..consumed]);
});
