//! Property tests over the bit coder, record framing and both containers.

use proptest::prelude::*;
use swf_decoder::{FlvDecoder, MovieDecoder};
use swf_encoder::{MovieEncoder, encode_flv, encode_movie};
use swf_types::{Action, Context, FlvTag, FlvVideo, Movie, OpaqueTag, Rect, Record, Registries, Tag, write_record};
use swf_wire::bits::signed_bits;
use swf_wire::header::FlvFlags;
use swf_wire::{BitReader, BitWriter};

const COORD: std::ops::RangeInclusive<i32> = -(1 << 30) + 1..=(1 << 30) - 1;

fn flv_tag() -> impl Strategy<Value = FlvTag> {
    let data = || prop::collection::vec(any::<u8>(), 0..64);
    prop_oneof![
        (any::<u32>(), 0u8..16, 0u8..4, any::<bool>(), any::<bool>(), data()).prop_map(
            |(timestamp, format, rate, is_16_bit, is_stereo, data)| FlvTag::Audio {
                timestamp,
                format,
                rate,
                is_16_bit,
                is_stereo,
                data,
            }
        ),
        (any::<u32>(), 0u8..16, 0u8..16, data()).prop_map(|(timestamp, frame_type, codec, data)| {
            FlvTag::Video {
                timestamp,
                frame_type,
                codec,
                data,
            }
        }),
        (any::<u32>(), data()).prop_map(|(timestamp, data)| FlvTag::Script { timestamp, data }),
        (20u8..=30, any::<u32>(), data()).prop_map(|(tag_type, timestamp, data)| FlvTag::Opaque {
            tag_type,
            timestamp,
            data,
        }),
    ]
}

fn opaque_tag() -> impl Strategy<Value = Tag> {
    (100u16..=1023, any::<bool>(), prop::collection::vec(any::<u8>(), 0..200))
        .prop_filter("short headers hold at most 62 bytes", |(_, long, body)| {
            *long || body.len() < 63
        })
        .prop_map(|(code, long, body)| Tag::Opaque(OpaqueTag { code, long, body }))
}

proptest! {
    #[test]
    fn signed_width_is_minimal(value in any::<i32>()) {
        let n = signed_bits(value);
        prop_assert!(n >= 1);
        let fits = |bits: u32| {
            let half = 1i64 << (bits - 1);
            (-half..half).contains(&i64::from(value))
        };
        prop_assert!(fits(n));
        if n > 1 {
            prop_assert!(!fits(n - 1));
        }
    }

    #[test]
    fn signed_fields_read_back(values in prop::collection::vec(any::<i32>(), 1..16)) {
        let mut w = BitWriter::swf();
        for v in &values {
            w.write_sbits(*v, signed_bits(*v)).unwrap();
        }
        w.align_to_byte();
        let bytes = w.into_bytes();
        let mut r = BitReader::swf(&bytes);
        for v in &values {
            prop_assert_eq!(r.read_sbits(signed_bits(*v)).unwrap(), *v);
        }
    }

    #[test]
    fn frame_size_survives(a in COORD, b in COORD, c in COORD, d in COORD) {
        let mut encoder = MovieEncoder::new(10);
        encoder.frame_size(Rect::new(a, b, c, d).unwrap());
        let decoded = MovieDecoder::decode(&encoder.encode().unwrap()).unwrap();
        prop_assert_eq!(decoded.frame_size, Rect::new(a, b, c, d).unwrap());
    }

    #[test]
    fn opaque_tags_survive(tags in prop::collection::vec(opaque_tag(), 0..8)) {
        let mut movie = Movie::new(10);
        movie.tags = tags;
        let encoded = encode_movie(&movie).unwrap();
        let decoded = MovieDecoder::decode(&encoded).unwrap();
        prop_assert_eq!(&decoded.tags, &movie.tags);
        prop_assert_eq!(encode_movie(&decoded).unwrap(), encoded);
    }

    #[test]
    fn action_codes_encode_only_when_they_read_back(
        code in any::<u8>(),
        simple in any::<bool>(),
        body in prop::collection::vec(any::<u8>(), 0..8),
    ) {
        // no typed decoders, so every long code comes back opaque
        let registries = Registries::empty();
        let ctx = Context::new(&registries, 10);
        let action = if simple { Action::Simple(code) } else { Action::Opaque { code, body } };
        let valid = if simple { (1..0x80).contains(&code) } else { code >= 0x80 };
        let mut w = BitWriter::swf();
        match write_record(&action, &mut w, &ctx) {
            Ok(_) => {
                prop_assert!(valid, "{:?} should not encode", action);
                let bytes = w.into_bytes();
                prop_assert_eq!(Action::decode(&mut BitReader::swf(&bytes), &ctx).unwrap(), action);
            }
            Err(_) => prop_assert!(!valid, "{:?} should encode", action),
        }
    }

    #[test]
    fn flv_survives(flags in any::<u8>(), tags in prop::collection::vec(flv_tag(), 0..8)) {
        let video = FlvVideo {
            version: 1,
            flags: FlvFlags::from_raw(flags),
            tags,
        };
        let encoded = encode_flv(&video).unwrap();
        prop_assert_eq!(FlvDecoder::decode(&encoded).unwrap(), video);
    }

    #[test]
    fn arbitrary_bytes_never_panic(data in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = MovieDecoder::decode(&data);
        let _ = FlvDecoder::decode(&data);
    }

    #[test]
    fn valid_prefix_with_arbitrary_body_never_panics(body in prop::collection::vec(any::<u8>(), 0..128)) {
        let mut data = b"FWS\x0A".to_vec();
        data.extend_from_slice(&(body.len() as u32 + 8).to_le_bytes());
        data.extend_from_slice(&body);
        let _ = MovieDecoder::decode(&data);
    }

    #[test]
    fn identifiers_increase(count in 1usize..64) {
        let mut encoder = MovieEncoder::new(10);
        let mut ids = Vec::new();
        for i in 0..count {
            ids.push(encoder.add_binary_data(&[i as u8]).unwrap());
        }
        prop_assert!(ids.windows(2).all(|w| w[0] < w[1]));
        let max = u32::from(*ids.last().unwrap());
        prop_assert!(encoder.movie().next_identifier() > max);

        let decoded = MovieDecoder::decode(&encoder.encode().unwrap()).unwrap();
        prop_assert!(decoded.next_identifier() > max);
    }
}
