use swf_types::{Context, FlvTag, FlvVideo, Record, Registries};
use swf_wire::header::{FLV_HEADER_SIZE, FlvHeader};
use swf_wire::record_header::FLV_TAG_HEADER_SIZE;
use swf_wire::BitReader;
use tracing::debug;

use crate::error::DecodeError;

/// Decoder for FLV files.
///
/// ```text
/// header(9) │ size₀ = 0 │ tag₀ │ size₁ = 11 + data₀ │ tag₁ │ ... │ EOF
/// ```
///
/// Every size word is checked against the tag before it.
#[derive(Clone, Copy, Debug)]
pub struct FlvDecoder<'r> {
    registries: &'r Registries,
}

impl Default for FlvDecoder<'static> {
    fn default() -> Self {
        Self {
            registries: Registries::builtin(),
        }
    }
}

impl FlvDecoder<'static> {
    /// # Errors
    ///
    /// See [`FlvDecoder::read`].
    pub fn decode(bytes: &[u8]) -> Result<FlvVideo, DecodeError> {
        Self::default().read(bytes)
    }
}

impl<'r> FlvDecoder<'r> {
    #[must_use]
    pub fn with_registries(registries: &'r Registries) -> Self {
        Self { registries }
    }

    /// # Errors
    ///
    /// - [`DecodeError::Truncated`] for fewer than 9 bytes, or a missing
    ///   size word.
    /// - [`DecodeError::InvalidSignature`] unless the file starts with "FLV".
    /// - [`DecodeError::InvalidFlvHeaderLength`] for a header length other
    ///   than 9.
    /// - [`DecodeError::PreviousTagSize`] when a size word disagrees with
    ///   the tag it follows.
    /// - [`DecodeError::Type`] when a tag fails to decode.
    pub fn read(&self, bytes: &[u8]) -> Result<FlvVideo, DecodeError> {
        let header_size = FLV_HEADER_SIZE as usize;
        if bytes.len() < header_size {
            return Err(DecodeError::Truncated {
                needed: header_size,
                available: bytes.len(),
            });
        }
        let mut r = BitReader::flv(bytes);
        let header = FlvHeader::read_from(&mut r).map_err(DecodeError::from_header)?;
        if header.header_length != FLV_HEADER_SIZE {
            return Err(DecodeError::InvalidFlvHeaderLength {
                found: header.header_length,
            });
        }
        debug!(
            version = header.version,
            flags = header.flags.raw(),
            size = bytes.len(),
            "flv header"
        );

        let ctx = Context::new(self.registries, header.version);
        let mut expected = 0;
        let mut tags = Vec::new();
        loop {
            let offset = r.pointer() / 8;
            if r.remaining_bytes() < 4 {
                return Err(DecodeError::Truncated {
                    needed: offset + 4,
                    available: bytes.len(),
                });
            }
            let found = r.read_u32()?;
            if found != expected {
                return Err(DecodeError::PreviousTagSize {
                    offset,
                    expected,
                    found,
                });
            }
            if r.is_exhausted() {
                break;
            }
            let start = r.pointer();
            let tag = FlvTag::decode(&mut r, &ctx)?;
            expected = ((r.pointer() - start) / 8) as u32;
            debug_assert!(expected >= FLV_TAG_HEADER_SIZE);
            tags.push(tag);
        }
        debug!(tags = tags.len(), "decoded flv");
        Ok(FlvVideo {
            version: header.version,
            flags: header.flags,
            tags,
        })
    }
}

#[cfg(test)]
mod tests {
    use swf_encoder::FlvEncoder;
    use swf_wire::header::FlvFlags;

    use super::*;

    fn sample() -> Vec<u8> {
        let mut encoder = FlvEncoder::new(1, FlvFlags::NONE);
        encoder
            .add_script(0, &[2, 0, 10, b'o', b'n'])
            .add_video(0, 1, 7, &[0x17, 0, 0, 0])
            .add_audio(23, 10, 3, true, true, &[0xAF, 1]);
        encoder.encode().unwrap()
    }

    #[test]
    fn header_only_file() {
        let bytes = [b'F', b'L', b'V', 1, 0x05, 0, 0, 0, 9, 0, 0, 0, 0];
        let video = FlvDecoder::decode(&bytes).unwrap();
        assert!(video.tags.is_empty());
        assert!(video.flags.has_audio() && video.flags.has_video());
    }

    #[test]
    fn reserved_flag_bits_survive() {
        let bytes = [b'F', b'L', b'V', 1, 0xF5, 0, 0, 0, 9, 0, 0, 0, 0];
        assert_eq!(FlvDecoder::decode(&bytes).unwrap().flags.raw(), 0xF5);
    }

    #[test]
    fn decodes_every_tag() {
        let video = FlvDecoder::decode(&sample()).unwrap();
        assert_eq!(video.tags.len(), 3);
        assert!(matches!(video.tags[2], FlvTag::Audio { format: 10, timestamp: 23, .. }));
    }

    #[test]
    fn header_length_must_be_nine() {
        let mut bytes = sample();
        bytes[8] = 10;
        assert!(matches!(
            FlvDecoder::decode(&bytes),
            Err(DecodeError::InvalidFlvHeaderLength { found: 10 })
        ));
    }

    #[test]
    fn first_size_word_must_be_zero() {
        let mut bytes = sample();
        bytes[12] = 1;
        assert!(matches!(
            FlvDecoder::decode(&bytes),
            Err(DecodeError::PreviousTagSize {
                offset: 9,
                expected: 0,
                found: 1
            })
        ));
    }

    #[test]
    fn size_word_must_match_previous_tag() {
        let mut bytes = sample();
        // script tag: 11 + 5 bytes, its size word follows at 13 + 16
        bytes[13 + 16 + 3] = 15;
        assert!(matches!(
            FlvDecoder::decode(&bytes),
            Err(DecodeError::PreviousTagSize {
                offset: 29,
                expected: 16,
                found: 15
            })
        ));
    }

    #[test]
    fn missing_last_size_word() {
        let bytes = sample();
        assert!(matches!(
            FlvDecoder::decode(&bytes[..bytes.len() - 2]),
            Err(DecodeError::Truncated { .. })
        ));
    }

    #[test]
    fn wrong_signature() {
        let mut bytes = sample();
        bytes[2] = b'X';
        assert!(matches!(
            FlvDecoder::decode(&bytes),
            Err(DecodeError::InvalidSignature { .. })
        ));
    }
}
