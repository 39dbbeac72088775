use crate::coder::{BitReader, BitWriter};
use crate::error::WireError;

/// Signature of an uncompressed movie: ASCII "FWS".
pub const SWF_SIGNATURE: [u8; 3] = *b"FWS";

/// Signature of a zlib-compressed movie: ASCII "CWS".
pub const CWS_SIGNATURE: [u8; 3] = *b"CWS";

/// Size of the fixed movie prefix that is never compressed.
pub const SWF_PREFIX_SIZE: usize = 8;

/// Signature of a Flash Video stream: ASCII "FLV".
pub const FLV_SIGNATURE: [u8; 3] = *b"FLV";

/// Header length every FLV stream declares.
pub const FLV_HEADER_SIZE: u32 = 9;

/// The 8-byte prefix of a movie.
///
/// ```text
/// ┌────────┬─────────┬──────────────────────────────────────────┐
/// │ Offset │ Size    │ Description                              │
/// ├────────┼─────────┼──────────────────────────────────────────┤
/// │ 0x00   │ 3 bytes │ "FWS" or "CWS"                           │
/// │ 0x03   │ 1 byte  │ Format version                           │
/// │ 0x04   │ 4 bytes │ Uncompressed length incl. prefix (LE)    │
/// └────────┴─────────┴──────────────────────────────────────────┘
/// ```
///
/// Everything after the prefix (frame size, frame rate, frame count, tags)
/// is zlib-compressed when the signature is "CWS".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwfPrefix {
    pub compressed: bool,
    pub version: u8,
    pub file_length: u32,
}

impl SwfPrefix {
    #[must_use]
    pub fn signature(&self) -> [u8; 3] {
        if self.compressed { CWS_SIGNATURE } else { SWF_SIGNATURE }
    }

    /// # Errors
    ///
    /// Only fails if the writer rejects a word, which a fixed-width prefix
    /// never triggers.
    pub fn write_to(&self, w: &mut BitWriter) -> Result<(), WireError> {
        w.write_bytes(&self.signature());
        w.write_u8(self.version);
        w.write_u32(self.file_length)
    }

    /// Parse the prefix from the start of `r`.
    ///
    /// # Errors
    ///
    /// - [`WireError::OutOfBounds`] if fewer than 8 bytes are available.
    /// - [`WireError::InvalidSignature`] for anything but "FWS"/"CWS".
    pub fn read_from(r: &mut BitReader<'_>) -> Result<Self, WireError> {
        let raw = r.read_bytes(3)?;
        let found = [raw[0], raw[1], raw[2]];
        let compressed = match found {
            SWF_SIGNATURE => false,
            CWS_SIGNATURE => true,
            _ => return Err(WireError::InvalidSignature { found }),
        };
        let version = r.read_u8()?;
        let file_length = r.read_u32()?;
        Ok(Self {
            compressed,
            version,
            file_length,
        })
    }
}

/// FLV header flags.
///
/// Bit layout:
///   bit 0 = stream contains video tags
///   bit 2 = stream contains audio tags
///   other bits reserved
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlvFlags(u8);

impl FlvFlags {
    pub const VIDEO: Self = Self(0b0000_0001);
    pub const AUDIO: Self = Self(0b0000_0100);
    pub const NONE: Self = Self(0);

    #[must_use]
    pub fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    #[must_use]
    pub fn raw(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn has_video(self) -> bool {
        self.0 & Self::VIDEO.0 != 0
    }

    #[must_use]
    pub fn has_audio(self) -> bool {
        self.0 & Self::AUDIO.0 != 0
    }

    #[must_use]
    pub fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// The 9-byte FLV file header. All words are big-endian.
///
/// ```text
/// ┌────────┬─────────┬──────────────────────────────────────┐
/// │ Offset │ Size    │ Description                          │
/// ├────────┼─────────┼──────────────────────────────────────┤
/// │ 0x00   │ 3 bytes │ "FLV"                                │
/// │ 0x03   │ 1 byte  │ Version                              │
/// │ 0x04   │ 1 byte  │ Flags (audio / video)                │
/// │ 0x05   │ 4 bytes │ Header length (always 9)             │
/// └────────┴─────────┴──────────────────────────────────────┘
/// ```
///
/// The header length is returned as read so the decoder can report a
/// non-standard value with its own error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlvHeader {
    pub version: u8,
    pub flags: FlvFlags,
    pub header_length: u32,
}

impl FlvHeader {
    #[must_use]
    pub fn new(version: u8, flags: FlvFlags) -> Self {
        Self {
            version,
            flags,
            header_length: FLV_HEADER_SIZE,
        }
    }

    /// # Errors
    ///
    /// Only fails if the writer rejects a word.
    pub fn write_to(&self, w: &mut BitWriter) -> Result<(), WireError> {
        w.write_bytes(&FLV_SIGNATURE);
        w.write_u8(self.version);
        w.write_u8(self.flags.raw());
        w.write_u32(self.header_length)
    }

    /// # Errors
    ///
    /// - [`WireError::OutOfBounds`] if fewer than 9 bytes are available.
    /// - [`WireError::InvalidSignature`] if the stream does not start with "FLV".
    pub fn read_from(r: &mut BitReader<'_>) -> Result<Self, WireError> {
        let raw = r.read_bytes(3)?;
        let found = [raw[0], raw[1], raw[2]];
        if found != FLV_SIGNATURE {
            return Err(WireError::InvalidSignature { found });
        }
        let version = r.read_u8()?;
        let flags = FlvFlags::from_raw(r.read_u8()?);
        let header_length = r.read_u32()?;
        Ok(Self {
            version,
            flags,
            header_length,
        })
    }
}
