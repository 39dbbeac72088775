//! Sound, video and binary definitions. Their payloads stay opaque.

use swf_wire::record_header::TagHeader;
use swf_wire::{BitReader, BitWriter, RecordSpan};

use crate::context::Context;
use crate::error::{TypeError, check_range};
use crate::tag::{BodyPlan, TagBody};
use crate::tag_code::TagCode;

/// An event sound.
///
/// ```text
/// id u16 │ UB[4] format │ UB[2] rate │ UB[1] 16-bit │ UB[1] stereo
///        │ sample count u32 │ data …
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DefineSound {
    pub id: u16,
    /// Compression format (0 raw, 1 ADPCM, 2 MP3, ...).
    pub format: u8,
    /// 0 = 5.5 kHz, 1 = 11 kHz, 2 = 22 kHz, 3 = 44 kHz.
    pub rate: u8,
    pub is_16_bit: bool,
    pub is_stereo: bool,
    pub sample_count: u32,
    pub data: Vec<u8>,
    /// Whether a short body was framed with a long header.
    pub long_header: bool,
}

impl TagBody for DefineSound {
    fn tag_code(&self) -> TagCode {
        TagCode::DefineSound
    }

    fn plan(&self, _ctx: &Context<'_>) -> Result<(usize, BodyPlan), TypeError> {
        check_range("sound format", i64::from(self.format), 0, 15)?;
        check_range("sound rate", i64::from(self.rate), 0, 3)?;
        Ok((7 + self.data.len(), BodyPlan::Unit))
    }

    fn write_body(&self, _plan: &BodyPlan, w: &mut BitWriter, _ctx: &Context<'_>) -> Result<(), TypeError> {
        w.write_u16(self.id)?;
        w.write_ubits(u32::from(self.format), 4)?;
        w.write_ubits(u32::from(self.rate), 2)?;
        w.write_bool(self.is_16_bit)?;
        w.write_bool(self.is_stereo)?;
        w.write_u32(self.sample_count)?;
        w.write_bytes(&self.data);
        Ok(())
    }

    fn read_body(
        header: &TagHeader,
        span: &RecordSpan,
        r: &mut BitReader<'_>,
        _ctx: &Context<'_>,
    ) -> Result<Self, TypeError> {
        let id = r.read_u16()?;
        let format = r.read_ubits(4)? as u8;
        let rate = r.read_ubits(2)? as u8;
        let is_16_bit = r.read_bool()?;
        let is_stereo = r.read_bool()?;
        let sample_count = r.read_u32()?;
        let data = r.read_to_end_of(span)?.to_vec();
        Ok(Self {
            id,
            format,
            rate,
            is_16_bit,
            is_stereo,
            sample_count,
            data,
            long_header: header.is_long_by_choice(),
        })
    }
}

/// Declares an embedded video stream whose frames arrive in later tags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DefineVideoStream {
    pub id: u16,
    pub frame_count: u16,
    pub width: u16,
    pub height: u16,
    /// Deblocking filter mode, 0..=7.
    pub deblocking: u8,
    pub smoothing: bool,
    pub codec: u8,
    /// Whether a short body was framed with a long header.
    pub long_header: bool,
}

impl TagBody for DefineVideoStream {
    fn tag_code(&self) -> TagCode {
        TagCode::DefineVideoStream
    }

    fn plan(&self, _ctx: &Context<'_>) -> Result<(usize, BodyPlan), TypeError> {
        check_range("video deblocking", i64::from(self.deblocking), 0, 7)?;
        Ok((10, BodyPlan::Unit))
    }

    fn write_body(&self, _plan: &BodyPlan, w: &mut BitWriter, _ctx: &Context<'_>) -> Result<(), TypeError> {
        w.write_u16(self.id)?;
        w.write_u16(self.frame_count)?;
        w.write_u16(self.width)?;
        w.write_u16(self.height)?;
        w.write_ubits(0, 4)?;
        w.write_ubits(u32::from(self.deblocking), 3)?;
        w.write_bool(self.smoothing)?;
        w.write_u8(self.codec);
        Ok(())
    }

    fn read_body(
        header: &TagHeader,
        _span: &RecordSpan,
        r: &mut BitReader<'_>,
        _ctx: &Context<'_>,
    ) -> Result<Self, TypeError> {
        let id = r.read_u16()?;
        let frame_count = r.read_u16()?;
        let width = r.read_u16()?;
        let height = r.read_u16()?;
        r.read_ubits(4)?;
        let deblocking = r.read_ubits(3)? as u8;
        let smoothing = r.read_bool()?;
        let codec = r.read_u8()?;
        Ok(Self {
            id,
            frame_count,
            width,
            height,
            deblocking,
            smoothing,
            codec,
            long_header: header.is_long_by_choice(),
        })
    }
}

/// Arbitrary bytes under an identifier.
///
/// ```text
/// id u16 │ reserved u32 (0) │ data …
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DefineBinaryData {
    pub id: u16,
    pub data: Vec<u8>,
    /// Whether a short body was framed with a long header.
    pub long_header: bool,
}

impl TagBody for DefineBinaryData {
    fn tag_code(&self) -> TagCode {
        TagCode::DefineBinaryData
    }

    fn plan(&self, _ctx: &Context<'_>) -> Result<(usize, BodyPlan), TypeError> {
        Ok((6 + self.data.len(), BodyPlan::Unit))
    }

    fn write_body(&self, _plan: &BodyPlan, w: &mut BitWriter, _ctx: &Context<'_>) -> Result<(), TypeError> {
        w.write_u16(self.id)?;
        w.write_u32(0)?;
        w.write_bytes(&self.data);
        Ok(())
    }

    fn read_body(
        header: &TagHeader,
        span: &RecordSpan,
        r: &mut BitReader<'_>,
        _ctx: &Context<'_>,
    ) -> Result<Self, TypeError> {
        let id = r.read_u16()?;
        r.read_u32()?;
        Ok(Self {
            id,
            data: r.read_to_end_of(span)?.to_vec(),
            long_header: header.is_long_by_choice(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Record, write_record};
    use crate::registry::Registries;
    use crate::tag::Tag;

    fn roundtrip(tag: &Tag) -> Vec<u8> {
        let registries = Registries::standard();
        let ctx = Context::new(&registries, 9);
        let mut w = BitWriter::swf();
        write_record(tag, &mut w, &ctx).unwrap();
        let bytes = w.into_bytes();
        assert_eq!(&Tag::decode(&mut BitReader::swf(&bytes), &ctx).unwrap(), tag);
        bytes
    }

    #[test]
    fn sound_packs_its_format_byte() {
        let bytes = roundtrip(&Tag::DefineSound(DefineSound {
            id: 1,
            format: 2,
            rate: 3,
            is_16_bit: true,
            is_stereo: false,
            sample_count: 1000,
            data: vec![0xFF, 0xFB],
            long_header: false,
        }));
        assert_eq!(bytes[4], 0b0010_1110);
    }

    #[test]
    fn sound_rate_is_checked() {
        let registries = Registries::standard();
        let ctx = Context::new(&registries, 9);
        let tag = Tag::DefineSound(DefineSound {
            rate: 4,
            ..DefineSound::default()
        });
        assert!(matches!(
            tag.prepare(&ctx),
            Err(TypeError::OutOfRange { field: "sound rate", .. })
        ));
    }

    #[test]
    fn video_stream() {
        let bytes = roundtrip(&Tag::DefineVideoStream(DefineVideoStream {
            id: 2,
            frame_count: 30,
            width: 320,
            height: 240,
            deblocking: 5,
            smoothing: true,
            codec: 2,
            long_header: false,
        }));
        assert_eq!(bytes.len(), 12);
        assert_eq!(bytes[10], 0b0000_1011);
    }

    #[test]
    fn binary_data_keeps_payload() {
        let bytes = roundtrip(&Tag::DefineBinaryData(DefineBinaryData {
            id: 5,
            data: b"payload".to_vec(),
            long_header: false,
        }));
        assert_eq!(&bytes[4..8], &[0, 0, 0, 0]);
        assert_eq!(&bytes[8..], b"payload");
    }
}
