//! Edge case integration tests for the decoders.
//!
//! - **Unknown tags**: codes without a typed decoder come back as
//!   `Tag::Opaque` with their header form intact.
//! - **Truncated and malformed containers**: every container-level problem
//!   fails the whole decode with its own error.
//! - **Coding consistency**: a record whose fields do not fill its declared
//!   length is a hard failure reporting the deviation.
//! - **Nesting**: sprites inside sprites fail cleanly in both directions,
//!   however deep the input goes.
//! - **Validated construction**: out-of-range values are rejected before
//!   they reach the wire.

use swf_decoder::{DecodeError, DecoderOptions, FlvDecoder, MovieDecoder};
use swf_encoder::{EncodeError, MovieEncoder, encode_movie};
use swf_tests::{
    AV_FLV, EMPTY_MOVIE, MIXED_MOVIE, OVERLONG_RECORD_MOVIE, UNKNOWN_TAGS_MOVIE, bytes,
    nested_sprites_movie, sample_movie,
};
use swf_types::script::DoAction;
use swf_types::shape::StraightEdge;
use swf_types::sprite::DefineSprite;
use swf_types::{Action, ActionBlock, Movie, OpaqueTag, Rect, Registries, Tag, TypeError};
use swf_wire::WireError;

// ── Unknown tags ──────────────────────────────────────────────────────────────

#[test]
fn unknown_codes_decode_as_opaque() {
    let movie = MovieDecoder::decode(&bytes(UNKNOWN_TAGS_MOVIE)).unwrap();
    assert_eq!(
        movie.tags,
        vec![
            Tag::Opaque(OpaqueTag {
                code: 200,
                long: false,
                body: vec![0xAA, 0xBB, 0xCC],
            }),
            Tag::Opaque(OpaqueTag {
                code: 200,
                long: true,
                body: vec![0x01, 0x02],
            }),
        ]
    );
}

#[test]
fn empty_registries_make_every_tag_opaque() {
    let registries = Registries::empty();
    let movie = MovieDecoder::default()
        .with_registries(&registries)
        .read(&bytes(MIXED_MOVIE))
        .unwrap();
    assert_eq!(movie.tags.len(), 5);
    assert!(movie.tags.iter().all(|t| matches!(t, Tag::Opaque(_))));
    // opaque tags still encode back to the original bytes
    assert_eq!(encode_movie(&movie).unwrap(), bytes(MIXED_MOVIE));
}

// ── Container format errors ───────────────────────────────────────────────────

#[test]
fn two_byte_input_is_truncated() {
    assert!(matches!(
        MovieDecoder::decode(b"CW"),
        Err(DecodeError::Truncated {
            needed: 8,
            available: 2
        })
    ));
}

#[test]
fn bare_signature_is_truncated() {
    assert!(matches!(
        MovieDecoder::decode(b"CWS"),
        Err(DecodeError::Truncated { .. })
    ));
}

#[test]
fn compressed_prefix_without_body_fails() {
    let bytes = [b'C', b'W', b'S', 10, 16, 0, 0, 0];
    assert!(matches!(
        MovieDecoder::decode(&bytes),
        Err(DecodeError::LengthMismatch { .. } | DecodeError::InflateFailed(_))
    ));
}

#[test]
fn corrupt_zlib_body_fails() {
    let mut movie = sample_movie(1);
    movie.compressed = true;
    let mut encoded = encode_movie(&movie).unwrap();
    // zlib header bytes that fail the FCHECK test
    encoded[8] = 0x78;
    encoded[9] = 0x00;
    assert!(matches!(
        MovieDecoder::decode(&encoded),
        Err(DecodeError::InflateFailed(_) | DecodeError::LengthMismatch { .. })
    ));
}

#[test]
fn inflate_ceiling_is_enforced() {
    let mut movie = sample_movie(5);
    movie.compressed = true;
    let encoded = encode_movie(&movie).unwrap();
    let decoder = MovieDecoder::with_options(DecoderOptions {
        max_inflated_size: 64,
        ..DecoderOptions::default()
    });
    assert!(matches!(
        decoder.read(&encoded),
        Err(DecodeError::DecompressionBomb { limit: 64, .. })
    ));
}

#[test]
fn unknown_signature_is_rejected() {
    let mut fixture = bytes(EMPTY_MOVIE);
    fixture[0] = b'Z';
    assert!(matches!(
        MovieDecoder::decode(&fixture),
        Err(DecodeError::InvalidSignature { found }) if &found == b"ZWS"
    ));
}

#[test]
fn declared_length_must_match() {
    let mut fixture = bytes(EMPTY_MOVIE);
    fixture[4] = 20;
    assert!(matches!(
        MovieDecoder::decode(&fixture),
        Err(DecodeError::LengthMismatch {
            declared: 20,
            actual: 16
        })
    ));
}

#[test]
fn missing_sentinel_is_an_error() {
    let mut fixture = bytes(EMPTY_MOVIE);
    fixture.truncate(14);
    fixture[4] = 14;
    assert!(matches!(
        MovieDecoder::decode(&fixture),
        Err(DecodeError::MissingEndSentinel)
    ));
}

#[test]
fn bytes_after_sentinel_are_an_error() {
    let mut fixture = bytes(EMPTY_MOVIE);
    fixture.extend_from_slice(&[1, 2, 3]);
    fixture[4] = 19;
    assert!(matches!(
        MovieDecoder::decode(&fixture),
        Err(DecodeError::TrailingData { extra_bytes: 3 })
    ));
}

#[test]
fn flv_cut_inside_a_tag_fails() {
    let fixture = bytes(AV_FLV);
    assert!(FlvDecoder::decode(&fixture[..20]).is_err());
    assert!(matches!(
        FlvDecoder::decode(&fixture[..5]),
        Err(DecodeError::Truncated { needed: 9, .. })
    ));
}

// ── Coding consistency ────────────────────────────────────────────────────────

#[test]
fn overlong_record_reports_deviation() {
    let err = MovieDecoder::decode(&bytes(OVERLONG_RECORD_MOVIE)).unwrap_err();
    let DecodeError::Type(TypeError::Wire(WireError::CodingMismatch(mismatch))) = err else {
        panic!("expected a coding mismatch, got {err:?}");
    };
    assert_eq!(mismatch.family, "tag");
    assert_eq!(mismatch.code, 9);
    assert_eq!(mismatch.start, 14);
    assert_eq!(mismatch.declared, 5);
    assert_eq!(mismatch.delta, -2);
}

#[test]
fn frame_count_is_recomputed_from_show_frames() {
    let mut fixture = bytes(MIXED_MOVIE);
    // header claims 7 frames; the stream holds 1
    fixture[12] = 7;
    let movie = MovieDecoder::decode(&fixture).unwrap();
    assert_eq!(movie.frame_count(), 1);
    assert_eq!(encode_movie(&movie).unwrap(), bytes(MIXED_MOVIE));
}

// ── Nesting ───────────────────────────────────────────────────────────────────

#[test]
fn one_level_of_sprites_decodes() {
    let movie = MovieDecoder::decode(&nested_sprites_movie(1)).unwrap();
    assert!(matches!(&movie.tags[..], [Tag::DefineSprite(s)] if s.tags.is_empty() && s.long_header));
    assert_eq!(encode_movie(&movie).unwrap(), nested_sprites_movie(1));
}

#[test]
fn deeply_nested_sprites_fail_without_recursing() {
    for levels in [2, 5_000] {
        let err = MovieDecoder::decode(&nested_sprites_movie(levels)).unwrap_err();
        assert!(
            matches!(err, DecodeError::Type(TypeError::NestingTooDeep { max: 1 })),
            "{levels} levels: {err:?}"
        );
    }
}

#[test]
fn sprite_inside_sprite_fails_to_encode() {
    let inner = DefineSprite {
        id: 2,
        tags: vec![Tag::ShowFrame],
        long_header: false,
    };
    let mut movie = Movie::new(10);
    movie.tags = vec![Tag::DefineSprite(DefineSprite {
        id: 1,
        tags: vec![Tag::DefineSprite(inner)],
        long_header: false,
    })];
    assert!(matches!(
        encode_movie(&movie),
        Err(EncodeError::Type(TypeError::NestingTooDeep { max: 1 }))
    ));
}

// ── Validated construction ────────────────────────────────────────────────────

#[test]
fn reserved_codes_fail_to_encode() {
    let actions = |action: Action| {
        Tag::DoAction(DoAction {
            actions: ActionBlock::Decoded(vec![action]),
            long_header: false,
        })
    };
    let opaque_end = Tag::Opaque(OpaqueTag {
        code: 0,
        long: false,
        body: vec![1, 2, 3],
    });
    for tag in [actions(Action::Simple(0)), actions(Action::Simple(0x81)), opaque_end] {
        let mut movie = Movie::new(10);
        movie.tags = vec![tag, Tag::ShowFrame];
        assert!(matches!(
            encode_movie(&movie),
            Err(EncodeError::Type(TypeError::OutOfRange { .. }))
        ));
    }
}

#[test]
fn frame_rate_outside_fixed_point_range() {
    let mut movie = Movie::new(10);
    assert!(movie.set_frame_rate(256.0).is_err());
    assert!(movie.set_frame_rate(-1.0).is_err());
    assert!(MovieEncoder::new(10).frame_rate(300.0).is_err());
}

#[test]
fn coordinates_outside_field_width() {
    assert!(matches!(
        Rect::new(0, 1 << 30, 0, 0),
        Err(TypeError::OutOfRange { .. })
    ));
    assert!(StraightEdge::new(0, 0).is_ok());
    assert!(StraightEdge::new(1 << 22, 0).is_err());
}

#[test]
fn oversized_compression_level_is_rejected() {
    let mut encoder = MovieEncoder::new(10);
    encoder.compressed(true).compression_level(12);
    assert!(matches!(
        encoder.encode(),
        Err(EncodeError::InvalidCompressionLevel { level: 12 })
    ));
}

#[test]
fn too_many_frames_fail_to_encode() {
    let mut movie = Movie::new(10);
    movie.tags = vec![Tag::ShowFrame; 65_536];
    assert!(matches!(
        encode_movie(&movie),
        Err(EncodeError::Type(TypeError::TooMany { field: "frames", .. }))
    ));
}
