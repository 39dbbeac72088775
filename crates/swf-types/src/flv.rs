//! FLV tags and the FLV container value.
//!
//! FLV coders are big-endian. Each tag is an 11-byte header followed by
//! `data_size` bytes; the previous-tag-size words between tags belong to
//! the container pipeline, not to the tags.

use swf_wire::header::{FLV_HEADER_SIZE, FlvFlags};
use swf_wire::record_header::{FlvTagHeader, MAX_FLV_DATA_SIZE};
use swf_wire::{BitReader, BitWriter, RecordSpan};
use tracing::trace;

use crate::context::Context;
use crate::error::{TypeError, check_range};
use crate::record::{Prepared, Record};
use crate::registry::{Family, Registries, Registry};

pub mod flv_type {
    pub const AUDIO: u8 = 8;
    pub const VIDEO: u8 = 9;
    pub const SCRIPT: u8 = 18;
}

/// One FLV tag. Timestamps are in milliseconds, extended byte included.
///
/// ```text
/// ┌────────┬──────┬──────────────────────────────────────────────┐
/// │ Tag    │ Type │ Body                                         │
/// ├────────┼──────┼──────────────────────────────────────────────┤
/// │ Audio  │ 8    │ UB[4] format UB[2] rate UB[1] size UB[1] st. │
/// │ Video  │ 9    │ UB[4] frame type UB[4] codec                 │
/// │ Script │ 18   │ raw AMF bytes                                │
/// │ Opaque │ any  │ raw bytes                                    │
/// └────────┴──────┴──────────────────────────────────────────────┘
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FlvTag {
    Audio {
        timestamp: u32,
        format: u8,
        rate: u8,
        is_16_bit: bool,
        is_stereo: bool,
        data: Vec<u8>,
    },
    Video {
        timestamp: u32,
        frame_type: u8,
        codec: u8,
        data: Vec<u8>,
    },
    Script {
        timestamp: u32,
        data: Vec<u8>,
    },
    Opaque {
        tag_type: u8,
        timestamp: u32,
        data: Vec<u8>,
    },
}

impl FlvTag {
    #[must_use]
    pub fn tag_type(&self) -> u8 {
        match self {
            Self::Audio { .. } => flv_type::AUDIO,
            Self::Video { .. } => flv_type::VIDEO,
            Self::Script { .. } => flv_type::SCRIPT,
            Self::Opaque { tag_type, .. } => *tag_type,
        }
    }

    #[must_use]
    pub fn timestamp(&self) -> u32 {
        match self {
            Self::Audio { timestamp, .. }
            | Self::Video { timestamp, .. }
            | Self::Script { timestamp, .. }
            | Self::Opaque { timestamp, .. } => *timestamp,
        }
    }

    /// Payload bytes after the per-type flags byte, if any.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        match self {
            Self::Audio { data, .. }
            | Self::Video { data, .. }
            | Self::Script { data, .. }
            | Self::Opaque { data, .. } => data,
        }
    }

    fn body_len(&self) -> usize {
        match self {
            Self::Audio { data, .. } | Self::Video { data, .. } => 1 + data.len(),
            Self::Script { data, .. } | Self::Opaque { data, .. } => data.len(),
        }
    }

    fn framed(
        r: &mut BitReader<'_>,
        body: impl FnOnce(&FlvTagHeader, &RecordSpan, &mut BitReader<'_>) -> Result<Self, TypeError>,
    ) -> Result<Self, TypeError> {
        r.align_to_byte();
        let mark = r.mark();
        let header = FlvTagHeader::read_from(r)?;
        check_range("flv stream id", i64::from(header.stream_id), 0, 0)?;
        let span = r.span(Self::FAMILY, u16::from(header.tag_type), mark, header.data_size);
        trace!(
            tag_type = header.tag_type,
            data_size = header.data_size,
            timestamp = header.timestamp,
            offset = mark.bit_offset() / 8,
            "flv tag"
        );
        let tag = body(&header, &span, r)?;
        r.finish(&span)?;
        Ok(tag)
    }

    fn read_audio(r: &mut BitReader<'_>, _ctx: &Context<'_>) -> Result<Self, TypeError> {
        Self::framed(r, |header, span, r| {
            let format = r.read_ubits(4)? as u8;
            let rate = r.read_ubits(2)? as u8;
            let is_16_bit = r.read_bool()?;
            let is_stereo = r.read_bool()?;
            Ok(Self::Audio {
                timestamp: header.timestamp,
                format,
                rate,
                is_16_bit,
                is_stereo,
                data: r.read_to_end_of(span)?.to_vec(),
            })
        })
    }

    fn read_video(r: &mut BitReader<'_>, _ctx: &Context<'_>) -> Result<Self, TypeError> {
        Self::framed(r, |header, span, r| {
            let frame_type = r.read_ubits(4)? as u8;
            let codec = r.read_ubits(4)? as u8;
            Ok(Self::Video {
                timestamp: header.timestamp,
                frame_type,
                codec,
                data: r.read_to_end_of(span)?.to_vec(),
            })
        })
    }

    fn read_script(r: &mut BitReader<'_>, _ctx: &Context<'_>) -> Result<Self, TypeError> {
        Self::framed(r, |header, span, r| {
            Ok(Self::Script {
                timestamp: header.timestamp,
                data: r.read_to_end_of(span)?.to_vec(),
            })
        })
    }
}

impl Family for FlvTag {
    const FAMILY: &'static str = "flv tag";

    fn scan_code(r: &mut BitReader<'_>) -> Result<u16, TypeError> {
        Ok(u16::from(FlvTagHeader::scan_type(r)?))
    }

    fn fallback(_code: u16, r: &mut BitReader<'_>, _ctx: &Context<'_>) -> Result<Self, TypeError> {
        Self::framed(r, |header, span, r| {
            Ok(Self::Opaque {
                tag_type: header.tag_type,
                timestamp: header.timestamp,
                data: r.read_to_end_of(span)?.to_vec(),
            })
        })
    }

    fn registry(registries: &Registries) -> &Registry<Self> {
        &registries.flv
    }
}

impl Record for FlvTag {
    type Plan = FlvTagHeader;

    fn decode(r: &mut BitReader<'_>, ctx: &Context<'_>) -> Result<Self, TypeError> {
        Self::decode_next(r, ctx)
    }

    fn prepare(&self, _ctx: &Context<'_>) -> Result<Prepared<FlvTagHeader>, TypeError> {
        match self {
            Self::Audio { format, rate, .. } => {
                check_range("flv audio format", i64::from(*format), 0, 15)?;
                check_range("flv audio rate", i64::from(*rate), 0, 3)?;
            }
            Self::Video {
                frame_type, codec, ..
            } => {
                check_range("flv video frame type", i64::from(*frame_type), 0, 15)?;
                check_range("flv video codec", i64::from(*codec), 0, 15)?;
            }
            Self::Script { .. } | Self::Opaque { .. } => {}
        }
        let len = self.body_len();
        check_range("flv data size", len as i64, 0, i64::from(MAX_FLV_DATA_SIZE))?;
        let header = FlvTagHeader::new(self.tag_type(), len as u32, self.timestamp());
        Ok(Prepared::new(header.tag_size() as usize, header))
    }

    fn encode(&self, prepared: &Prepared<FlvTagHeader>, w: &mut BitWriter, _ctx: &Context<'_>) -> Result<(), TypeError> {
        let header = &prepared.plan;
        if header.tag_type != self.tag_type() {
            return Err(TypeError::PlanMismatch { code: self.code() });
        }
        let mark = w.mark();
        header.write_to(w)?;
        let span = w.span(Self::FAMILY, u16::from(header.tag_type), mark, header.data_size);
        match self {
            Self::Audio {
                format,
                rate,
                is_16_bit,
                is_stereo,
                data,
                ..
            } => {
                w.write_ubits(u32::from(*format), 4)?;
                w.write_ubits(u32::from(*rate), 2)?;
                w.write_bool(*is_16_bit)?;
                w.write_bool(*is_stereo)?;
                w.write_bytes(data);
            }
            Self::Video {
                frame_type,
                codec,
                data,
                ..
            } => {
                w.write_ubits(u32::from(*frame_type), 4)?;
                w.write_ubits(u32::from(*codec), 4)?;
                w.write_bytes(data);
            }
            Self::Script { data, .. } | Self::Opaque { data, .. } => w.write_bytes(data),
        }
        w.finish(&span)?;
        Ok(())
    }

    fn code(&self) -> u16 {
        u16::from(self.tag_type())
    }
}

pub(crate) fn register_standard(registry: &mut Registry<FlvTag>) {
    registry.register(u16::from(flv_type::AUDIO), FlvTag::read_audio);
    registry.register(u16::from(flv_type::VIDEO), FlvTag::read_video);
    registry.register(u16::from(flv_type::SCRIPT), FlvTag::read_script);
}

/// A decoded FLV file: header fields and tags in stream order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlvVideo {
    pub version: u8,
    pub flags: FlvFlags,
    pub tags: Vec<FlvTag>,
}

impl Default for FlvVideo {
    fn default() -> Self {
        Self {
            version: 1,
            flags: FlvFlags::NONE,
            tags: Vec::new(),
        }
    }
}

impl FlvVideo {
    #[must_use]
    pub fn new(version: u8, flags: FlvFlags) -> Self {
        Self {
            version,
            flags,
            tags: Vec::new(),
        }
    }

    /// Timestamp of the last tag, in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> u32 {
        self.tags.iter().map(FlvTag::timestamp).max().unwrap_or(0)
    }

    /// Bytes the whole file occupies once encoded: header, the leading
    /// zero previous-tag-size, and each tag followed by its size word.
    ///
    /// # Errors
    ///
    /// Errors from preparing the tags.
    pub fn encoded_len(&self, ctx: &Context<'_>) -> Result<usize, TypeError> {
        let mut len = FLV_HEADER_SIZE as usize + 4;
        for tag in &self.tags {
            len += tag.prepare(ctx)?.size + 4;
        }
        Ok(len)
    }
}
