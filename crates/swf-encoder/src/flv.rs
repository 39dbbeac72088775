use swf_types::record::write_prepared;
use swf_types::{Context, FlvTag, FlvVideo, Record, Registries};
use swf_wire::header::{FlvFlags, FlvHeader};
use swf_wire::{BitWriter, ByteOrder};
use tracing::debug;

use crate::error::EncodeError;

/// Builder for an FLV file.
///
/// ```text
/// ┌──────────────┬───────────────────────────────────────────┐
/// │ [9 bytes]    │ "FLV", version, flags, u32 BE 9           │
/// │ [4 bytes]    │ previous tag size 0                       │
/// │ [N bytes]    │ tag 0 (11-byte header + data)             │
/// │ [4 bytes]    │ 11 + data size of tag 0                   │
/// │ ...          │                                           │
/// └──────────────┴───────────────────────────────────────────┘
/// ```
#[derive(Clone, Debug, Default)]
pub struct FlvEncoder {
    video: FlvVideo,
}

impl FlvEncoder {
    #[must_use]
    pub fn new(version: u8, flags: FlvFlags) -> Self {
        Self {
            video: FlvVideo::new(version, flags),
        }
    }

    #[must_use]
    pub fn from_video(video: FlvVideo) -> Self {
        Self { video }
    }

    pub fn add_tag(&mut self, tag: FlvTag) -> &mut Self {
        self.video.tags.push(tag);
        self
    }

    pub fn add_audio(
        &mut self,
        timestamp: u32,
        format: u8,
        rate: u8,
        is_16_bit: bool,
        is_stereo: bool,
        data: &[u8],
    ) -> &mut Self {
        self.video.flags = self.video.flags.with(FlvFlags::AUDIO);
        self.add_tag(FlvTag::Audio {
            timestamp,
            format,
            rate,
            is_16_bit,
            is_stereo,
            data: data.to_vec(),
        })
    }

    pub fn add_video(&mut self, timestamp: u32, frame_type: u8, codec: u8, data: &[u8]) -> &mut Self {
        self.video.flags = self.video.flags.with(FlvFlags::VIDEO);
        self.add_tag(FlvTag::Video {
            timestamp,
            frame_type,
            codec,
            data: data.to_vec(),
        })
    }

    /// Raw AMF bytes, typically the `onMetaData` script tag.
    pub fn add_script(&mut self, timestamp: u32, data: &[u8]) -> &mut Self {
        self.add_tag(FlvTag::Script {
            timestamp,
            data: data.to_vec(),
        })
    }

    #[must_use]
    pub fn video(&self) -> &FlvVideo {
        &self.video
    }

    /// # Errors
    ///
    /// See [`encode_flv`].
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        encode_flv(&self.video)
    }
}

/// Serialize an FLV file.
///
/// # Errors
///
/// [`EncodeError::Type`] for a field that does not fit its bits, or
/// [`EncodeError::Wire`] for a tag larger than 16 MiB.
pub fn encode_flv(video: &FlvVideo) -> Result<Vec<u8>, EncodeError> {
    let registries = Registries::builtin();
    let ctx = Context::new(registries, video.version);
    let mut w = BitWriter::with_capacity(ByteOrder::Big, video.encoded_len(&ctx)?);

    FlvHeader::new(video.version, video.flags).write_to(&mut w)?;
    w.write_u32(0)?;
    for tag in &video.tags {
        let prepared = tag.prepare(&ctx)?;
        write_prepared(tag, &prepared, &mut w, &ctx)?;
        w.write_u32(prepared.plan.tag_size())?;
    }
    debug!(
        version = video.version,
        flags = video.flags.raw(),
        tags = video.tags.len(),
        length = w.len(),
        "encoded flv"
    );
    Ok(w.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_header_and_zero_size() {
        let bytes = FlvEncoder::new(1, FlvFlags::NONE).encode().unwrap();
        assert_eq!(bytes, vec![b'F', b'L', b'V', 1, 0, 0, 0, 0, 9, 0, 0, 0, 0]);
    }

    #[test]
    fn tags_set_header_flags_and_size_words() {
        let mut encoder = FlvEncoder::new(1, FlvFlags::NONE);
        encoder
            .add_video(0, 1, 2, &[0xAB, 0xCD])
            .add_audio(40, 2, 3, true, true, &[0x01]);
        let bytes = encoder.encode().unwrap();
        assert_eq!(bytes[4], 0x05);
        // video: 11-byte header + 3 data bytes
        assert_eq!(&bytes[13 + 14..13 + 18], &[0, 0, 0, 14]);
        assert_eq!(&bytes[bytes.len() - 4..], &[0, 0, 0, 13]);
    }

    #[test]
    fn decoder_reads_what_encoder_writes() {
        let mut encoder = FlvEncoder::new(1, FlvFlags::NONE);
        encoder
            .add_script(0, &[2, 0, 10])
            .add_video(33, 1, 7, &[0; 16]);
        let bytes = encoder.encode().unwrap();
        let decoded = swf_decoder::FlvDecoder::decode(&bytes).unwrap();
        assert_eq!(&decoded, encoder.video());
    }
}
