use swf_types::action::{Action, ActionBlock};
use swf_types::attributes::{AttributeFlags, FileAttributes, Metadata};
use swf_types::define_shape::{DefineShape, ShapeVersion};
use swf_types::display::{FrameLabel, PlaceObject2, RemoveObject2, SetBackgroundColor};
use swf_types::media::DefineBinaryData;
use swf_types::record::{prepare_all, total_size, write_all};
use swf_types::script::DoAction;
use swf_types::shape::ShapeWithStyle;
use swf_types::{Color, Movie, Rect, Registries, Tag, TypeError};
use swf_wire::header::{SWF_PREFIX_SIZE, SwfPrefix};
use swf_wire::record_header::TagHeader;
use swf_wire::{BitWriter, ByteOrder};
use tracing::debug;

use crate::compression::{self, DEFAULT_COMPRESSION_LEVEL};
use crate::error::EncodeError;

/// Builder for a movie.
///
/// Methods like [`add_show_frame`](Self::add_show_frame) and
/// [`add_shape`](Self::add_shape) append tags in order; definition
/// helpers allocate the identifier and return it so later tags can refer
/// to it.
///
/// # Usage
///
/// ```rust
/// use swf_encoder::MovieEncoder;
/// use swf_types::{Color, Rect};
///
/// let mut encoder = MovieEncoder::new(10);
/// encoder
///     .frame_size(Rect::from_pixels(550, 400).unwrap())
///     .add_background(Color::rgb(255, 255, 255))
///     .add_show_frame();
/// let bytes = encoder.encode().unwrap();
/// assert_eq!(&bytes[..3], b"FWS");
/// ```
///
/// # Output layout
///
/// ```text
/// ┌──────────────┬──────────────────────────────────────────────┐
/// │ [8 bytes]    │ "FWS"/"CWS", version, u32 LE total length    │
/// │ [N bytes]    │ frame size RECT, frame rate, frame count     │
/// │ [N bytes]    │ tags                                         │
/// │ [2 bytes]    │ end sentinel (u16 0)                         │
/// └──────────────┴──────────────────────────────────────────────┘
/// ```
///
/// For a compressed movie everything after the 8-byte prefix is a zlib
/// stream; the length field still holds the uncompressed total.
#[derive(Clone, Debug)]
pub struct MovieEncoder {
    movie: Movie,
    compression_level: u32,
}

impl MovieEncoder {
    /// An empty movie: zero frame size, 12 fps, uncompressed.
    #[must_use]
    pub fn new(version: u8) -> Self {
        Self::from_movie(Movie::new(version))
    }

    /// Continue building from an existing movie, for example one just
    /// decoded.
    #[must_use]
    pub fn from_movie(mut movie: Movie) -> Self {
        movie.refresh_identifiers();
        Self {
            movie,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }

    // ── Header settings ─────────────────────────────────────────────────

    pub fn frame_size(&mut self, frame_size: Rect) -> &mut Self {
        self.movie.frame_size = frame_size;
        self
    }

    /// # Errors
    ///
    /// [`EncodeError::Type`] unless `0 <= fps < 256`.
    pub fn frame_rate(&mut self, fps: f32) -> Result<&mut Self, EncodeError> {
        self.movie.set_frame_rate(fps)?;
        Ok(self)
    }

    /// Write a "CWS" movie, zlib-compressing everything after the prefix.
    pub fn compressed(&mut self, compressed: bool) -> &mut Self {
        self.movie.compressed = compressed;
        self
    }

    /// zlib level, 0..=9. Checked by [`encode`](Self::encode).
    pub fn compression_level(&mut self, level: u32) -> &mut Self {
        self.compression_level = level;
        self
    }

    // ── Tags ────────────────────────────────────────────────────────────

    pub fn add_tag(&mut self, tag: Tag) -> &mut Self {
        self.movie.tags.push(tag);
        self
    }

    pub fn add_show_frame(&mut self) -> &mut Self {
        self.add_tag(Tag::ShowFrame)
    }

    pub fn add_background(&mut self, color: Color) -> &mut Self {
        self.add_tag(Tag::SetBackgroundColor(SetBackgroundColor {
            color,
            long_header: false,
        }))
    }

    pub fn add_file_attributes(&mut self, flags: AttributeFlags) -> &mut Self {
        self.add_tag(Tag::FileAttributes(FileAttributes {
            flags,
            long_header: false,
        }))
    }

    pub fn add_metadata(&mut self, xml: &str) -> &mut Self {
        self.add_tag(Tag::Metadata(Metadata {
            xml: xml.to_string(),
            long_header: false,
        }))
    }

    pub fn add_frame_label(&mut self, name: &str) -> &mut Self {
        self.add_tag(Tag::FrameLabel(FrameLabel {
            name: name.to_string(),
            anchor: false,
            long_header: false,
        }))
    }

    /// Frame actions; the end code is added on encode.
    pub fn add_actions(&mut self, actions: Vec<Action>) -> &mut Self {
        self.add_tag(Tag::DoAction(DoAction {
            actions: ActionBlock::Decoded(actions),
            long_header: false,
        }))
    }

    /// Place `character_id` at `depth` with no transform.
    pub fn add_place(&mut self, character_id: u16, depth: u16) -> &mut Self {
        self.add_tag(Tag::PlaceObject2(PlaceObject2 {
            depth,
            character_id: Some(character_id),
            ..PlaceObject2::default()
        }))
    }

    pub fn add_remove(&mut self, depth: u16) -> &mut Self {
        self.add_tag(Tag::RemoveObject2(RemoveObject2 {
            depth,
            long_header: false,
        }))
    }

    /// Append a definition built around a freshly allocated identifier.
    ///
    /// # Errors
    ///
    /// [`EncodeError::Type`] once every identifier is in use.
    pub fn define(&mut self, build: impl FnOnce(u16) -> Tag) -> Result<u16, EncodeError> {
        let id = self.movie.allocate_identifier()?;
        self.movie.tags.push(build(id));
        Ok(id)
    }

    /// # Errors
    ///
    /// See [`define`](Self::define).
    pub fn add_shape(
        &mut self,
        version: ShapeVersion,
        bounds: Rect,
        shape: ShapeWithStyle,
    ) -> Result<u16, EncodeError> {
        self.define(|id| {
            Tag::DefineShape(DefineShape {
                version,
                id,
                bounds,
                shape,
                long_header: false,
            })
        })
    }

    /// # Errors
    ///
    /// See [`define`](Self::define).
    pub fn add_binary_data(&mut self, data: &[u8]) -> Result<u16, EncodeError> {
        self.define(|id| {
            Tag::DefineBinaryData(DefineBinaryData {
                id,
                data: data.to_vec(),
                long_header: false,
            })
        })
    }

    #[must_use]
    pub fn movie(&self) -> &Movie {
        &self.movie
    }

    #[must_use]
    pub fn into_movie(self) -> Movie {
        self.movie
    }

    /// Serialize the movie.
    ///
    /// # Errors
    ///
    /// See [`encode_movie_with_level`].
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        encode_movie_with_level(&self.movie, self.compression_level)
    }
}

/// Serialize `movie` with the default compression level.
///
/// # Errors
///
/// See [`encode_movie_with_level`].
pub fn encode_movie(movie: &Movie) -> Result<Vec<u8>, EncodeError> {
    encode_movie_with_level(movie, DEFAULT_COMPRESSION_LEVEL)
}

/// Serialize `movie`: prepare every tag, size the output, write the
/// prefix, header, tags and sentinel, then deflate the body when the movie
/// is compressed.
///
/// # Errors
///
/// - [`EncodeError::Type`] for invalid field values or more than 65535
///   frames.
/// - [`EncodeError::MovieTooLarge`] if the total exceeds `u32::MAX`.
/// - [`EncodeError::InvalidCompressionLevel`] / [`EncodeError::Io`] from
///   deflate.
pub fn encode_movie_with_level(movie: &Movie, level: u32) -> Result<Vec<u8>, EncodeError> {
    let registries = Registries::builtin();
    let ctx = movie.context(registries);
    let header = movie.header()?;
    let plans = prepare_all(&movie.tags, &ctx)?;

    let total = SWF_PREFIX_SIZE + header.encoded_len() + total_size(&plans) + 2;
    let file_length = u32::try_from(total).map_err(|_| EncodeError::MovieTooLarge {
        size: total,
        limit: u32::MAX as usize,
    })?;

    let mut w = BitWriter::with_capacity(ByteOrder::Little, total);
    w.set_text_encoding(ctx.text_encoding());
    SwfPrefix {
        compressed: movie.compressed,
        version: movie.version,
        file_length,
    }
    .write_to(&mut w)?;
    header.write(&mut w)?;
    write_all(&movie.tags, &plans, &mut w, &ctx)?;
    TagHeader::end().write_to(&mut w)?;

    if w.len() != total {
        return Err(TypeError::SizeMismatch {
            family: "movie",
            code: 0,
            prepared: total,
            written: w.len(),
        }
        .into());
    }

    let mut bytes = w.into_bytes();
    if movie.compressed {
        let body = compression::deflate(&bytes[SWF_PREFIX_SIZE..], level)?;
        bytes.truncate(SWF_PREFIX_SIZE);
        bytes.extend_from_slice(&body);
    }
    debug!(
        version = movie.version,
        tags = movie.tags.len(),
        frames = header.frame_count,
        length = total,
        written = bytes.len(),
        compressed = movie.compressed,
        "encoded movie"
    );
    Ok(bytes)
}
