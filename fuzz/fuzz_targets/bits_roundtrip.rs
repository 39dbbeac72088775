#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use swf_wire::bits::{signed_bits, unsigned_bits};
use swf_wire::{BitReader, BitWriter};

#[derive(Debug, Arbitrary)]
enum Field {
    Signed(i32),
    Unsigned(u32),
    Flag(bool),
    Align,
}

// Fuzz target: bit-packed field roundtrip.
//
// Writes a sequence of fields at their minimal widths and reads them back.
fuzz_target!(|fields: Vec<Field>| {
    let mut w = BitWriter::swf();
    for field in &fields {
        match field {
            Field::Signed(v) => w.write_sbits(*v, signed_bits(*v)).unwrap(),
            Field::Unsigned(v) => w.write_ubits(*v, unsigned_bits(*v)).unwrap(),
            Field::Flag(v) => w.write_bool(*v).unwrap(),
            Field::Align => w.align_to_byte(),
        }
    }
    w.align_to_byte();
    let bytes = w.into_bytes();

    let mut r = BitReader::swf(&bytes);
    for field in &fields {
        match field {
            Field::Signed(v) => assert_eq!(r.read_sbits(signed_bits(*v)).unwrap(), *v),
            Field::Unsigned(v) => assert_eq!(r.read_ubits(unsigned_bits(*v)).unwrap(), *v),
            Field::Flag(v) => assert_eq!(r.read_bool().unwrap(), *v),
            Field::Align => r.align_to_byte(),
        }
    }
});
