use std::borrow::Cow;

use swf_types::{Context, ContextFlags, Movie, MovieHeader, Record, Registries, Tag};
use swf_wire::header::{SWF_PREFIX_SIZE, SwfPrefix};
use swf_wire::record_header::TagHeader;
use swf_wire::BitReader;
use tracing::{debug, warn};

use crate::decompression::{self, DEFAULT_MAX_INFLATED_SIZE};
use crate::error::DecodeError;

/// Decoder settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Ceiling on the inflated body of a "CWS" movie.
    pub max_inflated_size: usize,
    /// Decode action records inside `DoAction` / `DoInitAction`. When
    /// off, action bodies are kept as raw bytes.
    pub decode_actions: bool,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            max_inflated_size: DEFAULT_MAX_INFLATED_SIZE,
            decode_actions: true,
        }
    }
}

/// Synchronous movie decoder over a complete in-memory file.
///
/// ```text
///   Start ─▶ signature ─┬─ "FWS" ───────────────┐
///                       └─ "CWS" ─▶ inflate ────┤
///                                               ▼
///              header ─▶ [tag]* ─▶ sentinel ─▶ Done
/// ```
///
/// Unknown tags decode to [`Tag::Opaque`]; any other record failure
/// aborts the decode. Offsets in errors are file offsets of the
/// uncompressed movie.
///
/// # Example
///
/// ```rust
/// use swf_decoder::MovieDecoder;
/// use swf_encoder::MovieEncoder;
///
/// let mut encoder = MovieEncoder::new(10);
/// encoder.add_show_frame();
/// let bytes = encoder.encode().unwrap();
///
/// let movie = MovieDecoder::decode(&bytes).unwrap();
/// assert_eq!(movie.frame_count(), 1);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct MovieDecoder<'r> {
    options: DecoderOptions,
    registries: &'r Registries,
}

impl Default for MovieDecoder<'static> {
    fn default() -> Self {
        Self::with_options(DecoderOptions::default())
    }
}

impl MovieDecoder<'static> {
    /// Decoder with the built-in record set.
    #[must_use]
    pub fn with_options(options: DecoderOptions) -> Self {
        Self {
            options,
            registries: Registries::builtin(),
        }
    }

    /// Decode with default options.
    ///
    /// # Errors
    ///
    /// See [`MovieDecoder::read`].
    pub fn decode(bytes: &[u8]) -> Result<Movie, DecodeError> {
        Self::default().read(bytes)
    }
}

impl<'r> MovieDecoder<'r> {
    /// Same options, different record set.
    #[must_use]
    pub fn with_registries<'n>(self, registries: &'n Registries) -> MovieDecoder<'n> {
        MovieDecoder {
            options: self.options,
            registries,
        }
    }

    #[must_use]
    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    /// Decode a complete movie.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::Truncated`] for fewer than 8 bytes.
    /// - [`DecodeError::InvalidSignature`] unless the file starts with
    ///   "FWS" or "CWS".
    /// - [`DecodeError::InflateFailed`] / [`DecodeError::DecompressionBomb`]
    ///   for a bad compressed body.
    /// - [`DecodeError::LengthMismatch`] when the (inflated) size differs
    ///   from the declared length.
    /// - [`DecodeError::MissingEndSentinel`] / [`DecodeError::TrailingData`]
    ///   for a badly terminated tag stream.
    /// - [`DecodeError::Type`] when a record fails to decode.
    pub fn read(&self, bytes: &[u8]) -> Result<Movie, DecodeError> {
        if bytes.len() < SWF_PREFIX_SIZE {
            return Err(DecodeError::Truncated {
                needed: SWF_PREFIX_SIZE,
                available: bytes.len(),
            });
        }
        let prefix = SwfPrefix::read_from(&mut BitReader::swf(bytes)).map_err(DecodeError::from_header)?;
        let declared = prefix.file_length as usize;
        debug!(
            compressed = prefix.compressed,
            version = prefix.version,
            declared,
            size = bytes.len(),
            "movie prefix"
        );

        let full = self.body(&prefix, bytes)?;

        let registries = self.registries;
        let mut ctx = Context::new(registries, prefix.version);
        if self.options.decode_actions {
            ctx = ctx.with_flags(ContextFlags::DECODE_ACTIONS);
        }
        let mut r = BitReader::swf(&full);
        r.set_text_encoding(ctx.text_encoding());
        r.set_pointer(SWF_PREFIX_SIZE * 8)?;

        let header = MovieHeader::read(&mut r)?;
        let mut tags = Vec::new();
        loop {
            if r.remaining_bytes() < 2 {
                return Err(DecodeError::MissingEndSentinel);
            }
            if TagHeader::scan_code(&mut r)? == 0 {
                r.read_u16()?;
                break;
            }
            tags.push(Tag::decode(&mut r, &ctx)?);
        }
        if !r.is_exhausted() {
            return Err(DecodeError::TrailingData {
                extra_bytes: r.remaining_bytes(),
            });
        }

        let movie = Movie::from_parts(prefix.compressed, prefix.version, &header, tags);
        if movie.frame_count() != usize::from(header.frame_count) {
            warn!(
                declared = header.frame_count,
                counted = movie.frame_count(),
                "frame count disagrees with ShowFrame tags"
            );
        }
        debug!(
            tags = movie.tags.len(),
            frames = movie.frame_count(),
            next_identifier = movie.next_identifier(),
            "decoded movie"
        );
        Ok(movie)
    }

    /// The whole movie as it would look uncompressed: the 8-byte prefix
    /// followed by the plain body.
    fn body<'b>(&self, prefix: &SwfPrefix, bytes: &'b [u8]) -> Result<Cow<'b, [u8]>, DecodeError> {
        let declared = prefix.file_length as usize;
        if !prefix.compressed {
            if bytes.len() != declared {
                return Err(DecodeError::LengthMismatch {
                    declared,
                    actual: bytes.len(),
                });
            }
            return Ok(Cow::Borrowed(bytes));
        }

        let limit = self.options.max_inflated_size;
        let expected = declared.saturating_sub(SWF_PREFIX_SIZE);
        if expected > limit {
            return Err(DecodeError::DecompressionBomb { actual: expected, limit });
        }
        let inflated = decompression::inflate(&bytes[SWF_PREFIX_SIZE..], expected, limit)?;
        debug!(
            compressed = bytes.len() - SWF_PREFIX_SIZE,
            inflated = inflated.len(),
            "inflated movie body"
        );
        if inflated.len() != expected {
            return Err(DecodeError::LengthMismatch {
                declared,
                actual: SWF_PREFIX_SIZE + inflated.len(),
            });
        }
        let mut full = Vec::with_capacity(declared);
        full.extend_from_slice(&bytes[..SWF_PREFIX_SIZE]);
        full.extend_from_slice(&inflated);
        Ok(Cow::Owned(full))
    }
}
