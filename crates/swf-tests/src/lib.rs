//! Shared fixtures for the integration tests and benches.
//!
//! Byte fixtures are written as hex with free-form whitespace so each
//! record sits on its own line. Built fixtures go through [`MovieEncoder`]
//! and [`FlvEncoder`] so they always match the current wire layout.

#![allow(clippy::pedantic)]

use swf_encoder::{FlvEncoder, MovieEncoder};
use swf_types::define_shape::ShapeVersion;
use swf_types::shape::{CurvedEdge, ShapeRecord, ShapeWithStyle, StraightEdge, StyleChange};
use swf_types::style::{FillStyle, Gradient, GradientStop, Interpolation, LineStyle, SpreadMode, Styles};
use swf_types::{Action, Color, Matrix, Movie, PushValue, Rect};
use swf_wire::header::FlvFlags;

/// Decode a whitespace-separated hex fixture.
pub fn bytes(fixture: &str) -> Vec<u8> {
    let compact: String = fixture.split_whitespace().collect();
    hex::decode(&compact).unwrap_or_else(|e| panic!("bad hex fixture: {e}"))
}

/// "FWS" version 10, zero frame size, 12 fps, no tags.
pub const EMPTY_MOVIE: &str = "
    465753 0A 10000000
    0800 000C 0000
    0000
";

/// 550x400 at 24 fps: white background, one frame.
pub const HELLO_MOVIE: &str = "
    465753 0A 1E000000
    7800055F00000FA000 0018 0100
    4302 FFFFFF
    4000
    0000
";

/// One of several common tags, with a sprite holding its own frame.
pub const MIXED_MOVIE: &str = "
    465753 0A 2B000000
    0800 000C 0100
    4411 00000000
    4302 0080FF
    C809 0100 0100 4000 0000
    0203 07 00
    4000
    0000
";

/// Tag code 200 in short form followed by code 200 in long form.
pub const UNKNOWN_TAGS_MOVIE: &str = "
    465753 0A 1D000000
    0800 000C 0000
    0332 AABBCC
    3F32 02000000 0102
    0000
";

/// SetBackgroundColor declaring 5 body bytes where the color takes 3.
pub const OVERLONG_RECORD_MOVIE: &str = "
    465753 0A 17000000
    0800 000C 0000
    4502 FF0000 0000
    0000
";

/// SetBackgroundColor framed with a long header around its 3-byte body.
pub const LONG_FORM_MOVIE: &str = "
    465753 0A 1B000000
    0800 000C 0100
    7F02 03000000 FF0000
    4000
    0000
";

/// `HELLO_MOVIE` with the frame rect stored in 16-bit fields.
pub const WIDE_FRAME_MOVIE: &str = "
    465753 0A 1E000000
    80000157C00000FA00 0018 0100
    4302 FFFFFF
    4000
    0000
";

/// A movie whose single tag is `levels` DefineSprites, each nested in the
/// previous one and framed with a long header.
pub fn nested_sprites_movie(levels: usize) -> Vec<u8> {
    let mut sprite = Vec::new();
    for _ in 0..levels {
        let mut body = vec![1, 0, 0, 0];
        body.extend_from_slice(&sprite);
        body.extend_from_slice(&[0, 0]);
        sprite = vec![0xFF, 0x09];
        sprite.extend_from_slice(&(body.len() as u32).to_le_bytes());
        sprite.extend_from_slice(&body);
    }
    let mut movie = b"FWS\x0A".to_vec();
    let tail = [&[0x08, 0x00, 0x00, 0x0C, 0x00, 0x00][..], &sprite, &[0, 0]].concat();
    movie.extend_from_slice(&((8 + tail.len()) as u32).to_le_bytes());
    movie.extend_from_slice(&tail);
    movie
}

/// Audio and video, one tag each.
pub const AV_FLV: &str = "
    464C56 01 05 00000009
    00000000
    09 000003 000000 00 000000 17 0000
    0000000E
    08 000002 000028 00 000000 AF 01
    0000000D
";

/// Square with a solid fill and one line style.
pub fn square(side: i32, color: Color) -> ShapeWithStyle {
    ShapeWithStyle {
        styles: Styles {
            fills: vec![FillStyle::Solid(color)],
            lines: vec![LineStyle {
                width: 20,
                color: Color::rgb(0, 0, 0),
            }],
        },
        records: vec![
            ShapeRecord::StyleChange(StyleChange {
                move_to: Some((0, 0)),
                fill_style1: Some(1),
                line_style: Some(1),
                ..StyleChange::default()
            }),
            edge(side, 0),
            edge(0, side),
            edge(-side, 0),
            edge(0, -side),
        ],
        index_bits: None,
    }
}

fn edge(dx: i32, dy: i32) -> ShapeRecord {
    ShapeRecord::StraightEdge(StraightEdge::new(dx, dy).unwrap_or_else(|e| panic!("{e}")))
}

/// Circle-ish blob filled with a two-stop radial gradient.
pub fn gradient_blob(radius: i32) -> ShapeWithStyle {
    let gradient = Gradient::new(
        SpreadMode::Pad,
        Interpolation::Normal,
        vec![
            GradientStop {
                ratio: 0,
                color: Color::rgba(255, 255, 255, 255),
            },
            GradientStop {
                ratio: 255,
                color: Color::rgba(0, 0, 255, 128),
            },
        ],
    )
    .unwrap_or_else(|e| panic!("{e}"));
    let curve = |c: (i32, i32), a: (i32, i32)| {
        ShapeRecord::CurvedEdge(CurvedEdge::new(c.0, c.1, a.0, a.1).unwrap_or_else(|e| panic!("{e}")))
    };
    ShapeWithStyle {
        styles: Styles {
            fills: vec![FillStyle::RadialGradient {
                matrix: Matrix::identity(),
                gradient,
            }],
            lines: Vec::new(),
        },
        records: vec![
            ShapeRecord::StyleChange(StyleChange {
                move_to: Some((radius, 0)),
                fill_style0: Some(1),
                ..StyleChange::default()
            }),
            curve((0, radius), (-radius, 0)),
            curve((-radius, 0), (0, -radius)),
            curve((0, -radius), (radius, 0)),
            curve((radius, 0), (0, radius)),
        ],
        index_bits: None,
    }
}

/// A movie exercising every typed tag the encoder builder offers.
pub fn sample_movie(frames: usize) -> Movie {
    let mut encoder = MovieEncoder::new(10);
    encoder
        .frame_size(Rect::from_pixels(550, 400).unwrap_or_else(|e| panic!("{e}")))
        .add_file_attributes(swf_types::attributes::AttributeFlags::USE_NETWORK)
        .add_metadata("<rdf:RDF/>")
        .add_background(Color::rgb(0x33, 0x66, 0x99));
    let square = encoder
        .add_shape(ShapeVersion::One, bounds(100), square(2000, Color::rgb(255, 0, 0)))
        .unwrap_or_else(|e| panic!("{e}"));
    let blob = encoder
        .add_shape(ShapeVersion::Three, bounds(50), gradient_blob(1000))
        .unwrap_or_else(|e| panic!("{e}"));
    encoder
        .add_binary_data(&[0xDE, 0xAD, 0xBE, 0xEF])
        .unwrap_or_else(|e| panic!("{e}"));
    encoder.add_place(square, 1).add_place(blob, 2);
    for frame in 0..frames {
        encoder
            .add_frame_label(&format!("frame{frame}"))
            .add_actions(vec![
                Action::Push(vec![
                    PushValue::String("counter".into()),
                    PushValue::Integer(frame as i32),
                ]),
                Action::Simple(0x1D),
                Action::GotoFrame(0),
            ])
            .add_show_frame();
    }
    encoder.add_remove(2).add_show_frame();
    encoder.into_movie()
}

fn bounds(pixels: u16) -> Rect {
    Rect::from_pixels(pixels, pixels).unwrap_or_else(|e| panic!("{e}"))
}

/// Video with one script tag and `frames` video/audio pairs at 25 fps.
pub fn sample_flv(frames: u32, payload: usize) -> Vec<u8> {
    let mut encoder = FlvEncoder::new(1, FlvFlags::NONE);
    encoder.add_script(0, &[0x02, 0x00, 0x0A, b'o', b'n', b'M', b'e', b't', b'a', b'D', b'a', b't', b'a']);
    let data = vec![0x5A; payload];
    for frame in 0..frames {
        let timestamp = frame * 40;
        let frame_type = if frame % 25 == 0 { 1 } else { 2 };
        encoder
            .add_video(timestamp, frame_type, 7, &data)
            .add_audio(timestamp, 10, 3, true, true, &data[..payload.min(64)]);
    }
    encoder.encode().unwrap_or_else(|e| panic!("{e}"))
}
