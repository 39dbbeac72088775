#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;
use swf_decoder::MovieDecoder;
use swf_encoder::MovieEncoder;
use swf_types::{Action, Color, PushValue};

#[derive(Debug, Arbitrary)]
enum FuzzTag {
    ShowFrame,
    Background { red: u8, green: u8, blue: u8 },
    Label { name: String },
    Metadata { xml: String },
    BinaryData { data: Vec<u8> },
    Place { character_id: u16, depth: u16 },
    Remove { depth: u16 },
    Actions { values: Vec<i32>, target: String },
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    version: u8,
    tags: Vec<FuzzTag>,
    compressed: bool,
}

// Fuzz target: MovieEncoder -> MovieDecoder roundtrip.
//
// Builds movies through the encoder builder, then decodes them.
// Labels and strings carrying NUL are skipped: they cannot be encoded.
fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(input) = FuzzInput::arbitrary(&mut u) else {
        return;
    };

    let mut encoder = MovieEncoder::new(input.version.max(6));
    encoder.compressed(input.compressed);
    for tag in input.tags.iter().take(64) {
        match tag {
            FuzzTag::ShowFrame => {
                encoder.add_show_frame();
            }
            FuzzTag::Background { red, green, blue } => {
                encoder.add_background(Color::rgb(*red, *green, *blue));
            }
            FuzzTag::Label { name } if !name.contains('\0') => {
                encoder.add_frame_label(name);
            }
            FuzzTag::Metadata { xml } if !xml.contains('\0') => {
                encoder.add_metadata(xml);
            }
            FuzzTag::BinaryData { data } => {
                encoder.add_binary_data(data).unwrap();
            }
            FuzzTag::Place { character_id, depth } => {
                encoder.add_place(*character_id, *depth);
            }
            FuzzTag::Remove { depth } => {
                encoder.add_remove(*depth);
            }
            FuzzTag::Actions { values, target } if !target.contains('\0') => {
                let push = values.iter().map(|v| PushValue::Integer(*v)).collect();
                encoder.add_actions(vec![
                    Action::Push(push),
                    Action::SetTarget(target.clone()),
                ]);
            }
            _ => {}
        }
    }

    let Ok(bytes) = encoder.encode() else {
        return;
    };
    let decoded = MovieDecoder::decode(&bytes).unwrap();
    assert_eq!(&decoded, encoder.movie());
});
