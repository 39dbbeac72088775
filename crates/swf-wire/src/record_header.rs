//! Headers that frame individual records in the three record streams.
//!
//! Each header knows its own encoded size so the two-phase encoder can
//! account for it before anything is written.

use crate::coder::{BitReader, BitWriter};
use crate::error::WireError;

/// Short-form length value that announces a trailing 32-bit length.
pub const LONG_LENGTH_MARKER: u32 = 0x3F;

/// Largest tag type code (10 bits).
pub const MAX_TAG_CODE: u16 = 0x3FF;

/// Movie tag header.
///
/// ```text
///  short form (length < 63)          long form
/// ┌────────────────────────────┐    ┌────────────────────────────┬──────────────┐
/// │ u16 LE: code << 6 | length │    │ u16 LE: code << 6 | 0x3F   │ u32 LE length│
/// └────────────────────────────┘    └────────────────────────────┴──────────────┘
/// ```
///
/// Some tags are always written in long form even when short enough, and
/// files in the wild use the long form freely. `long` records which form
/// is used so an opaque record re-encodes byte for byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TagHeader {
    pub code: u16,
    pub length: u32,
    pub long: bool,
}

impl TagHeader {
    /// Header in the shortest form that can hold `length`.
    #[must_use]
    pub fn new(code: u16, length: u32) -> Self {
        Self {
            code,
            length,
            long: length >= LONG_LENGTH_MARKER,
        }
    }

    /// Header forced into long form when `long` is set.
    #[must_use]
    pub fn with_form(code: u16, length: u32, long: bool) -> Self {
        Self {
            code,
            length,
            long: long || length >= LONG_LENGTH_MARKER,
        }
    }

    /// The zero-code, zero-length header ending a tag stream.
    #[must_use]
    pub fn end() -> Self {
        Self::new(0, 0)
    }

    #[must_use]
    pub fn is_end(&self) -> bool {
        self.code == 0
    }

    /// Bytes this header occupies on the wire.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        if self.is_long() { 6 } else { 2 }
    }

    /// Whether the header is written in long form.
    #[must_use]
    pub fn is_long(&self) -> bool {
        self.long || self.length >= LONG_LENGTH_MARKER
    }

    /// Long form on a length the short form could hold.
    #[must_use]
    pub fn is_long_by_choice(&self) -> bool {
        self.long && self.length < LONG_LENGTH_MARKER
    }

    /// # Errors
    ///
    /// [`WireError::HeaderFieldOverflow`] if the code exceeds 10 bits,
    /// [`WireError::MisplacedEndCode`] for a code 0 header other than the
    /// bare end sentinel.
    pub fn write_to(&self, w: &mut BitWriter) -> Result<(), WireError> {
        if self.code > MAX_TAG_CODE {
            return Err(WireError::HeaderFieldOverflow {
                field: "tag code",
                value: u64::from(self.code),
                bits: 10,
            });
        }
        if self.is_end() && (self.length != 0 || self.long) {
            return Err(WireError::MisplacedEndCode { family: "tag" });
        }
        if self.is_long() {
            w.write_u16(self.code << 6 | LONG_LENGTH_MARKER as u16)?;
            w.write_u32(self.length)
        } else {
            w.write_u16(self.code << 6 | self.length as u16)
        }
    }

    /// # Errors
    ///
    /// [`WireError::OutOfBounds`] if the header is cut short.
    pub fn read_from(r: &mut BitReader<'_>) -> Result<Self, WireError> {
        let word = r.read_u16()?;
        let code = word >> 6;
        let short = u32::from(word & 0x3F);
        if short == LONG_LENGTH_MARKER {
            let length = r.read_u32()?;
            Ok(Self {
                code,
                length,
                long: true,
            })
        } else {
            Ok(Self {
                code,
                length: short,
                long: false,
            })
        }
    }

    /// Read the next tag code and rewind.
    ///
    /// # Errors
    ///
    /// [`WireError::OutOfBounds`] if fewer than two bytes remain.
    pub fn scan_code(r: &mut BitReader<'_>) -> Result<u16, WireError> {
        r.align_to_byte();
        let start = r.pointer();
        let word = r.read_u16()?;
        r.set_pointer(start)?;
        Ok(word >> 6)
    }
}

/// Action record header.
///
/// ```text
/// ┌───────────┐                 ┌───────────┬───────────────┐
/// │ u8 code   │  code < 0x80    │ u8 code   │ u16 LE length │  code >= 0x80
/// └───────────┘                 └───────────┴───────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionHeader {
    pub code: u8,
    pub length: u16,
}

impl ActionHeader {
    /// Codes from this value up carry a length and a body.
    pub const FIRST_LONG_CODE: u8 = 0x80;

    #[must_use]
    pub fn new(code: u8, length: u16) -> Self {
        Self { code, length }
    }

    #[must_use]
    pub fn has_body(&self) -> bool {
        self.code >= Self::FIRST_LONG_CODE
    }

    #[must_use]
    pub fn encoded_len(&self) -> usize {
        if self.has_body() { 3 } else { 1 }
    }

    /// # Errors
    ///
    /// Only fails if the writer rejects a word.
    pub fn write_to(&self, w: &mut BitWriter) -> Result<(), WireError> {
        w.write_u8(self.code);
        if self.has_body() {
            w.write_u16(self.length)?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// [`WireError::OutOfBounds`] if the header is cut short.
    pub fn read_from(r: &mut BitReader<'_>) -> Result<Self, WireError> {
        let code = r.read_u8()?;
        let length = if code >= Self::FIRST_LONG_CODE {
            r.read_u16()?
        } else {
            0
        };
        Ok(Self { code, length })
    }

    /// Read the next action code and rewind.
    ///
    /// # Errors
    ///
    /// [`WireError::OutOfBounds`] at the end of the buffer.
    pub fn scan_code(r: &mut BitReader<'_>) -> Result<u8, WireError> {
        r.align_to_byte();
        let start = r.pointer();
        let code = r.read_u8()?;
        r.set_pointer(start)?;
        Ok(code)
    }
}

/// Size of an FLV tag header in bytes.
pub const FLV_TAG_HEADER_SIZE: u32 = 11;

/// Largest FLV tag body (24-bit data size).
pub const MAX_FLV_DATA_SIZE: u32 = 0x00FF_FFFF;

/// FLV tag header. All words are big-endian.
///
/// ```text
/// ┌────────┬─────────┬──────────────────────────────────────────┐
/// │ Offset │ Size    │ Description                              │
/// ├────────┼─────────┼──────────────────────────────────────────┤
/// │ 0x00   │ 1 byte  │ Tag type (8 audio, 9 video, 18 script)   │
/// │ 0x01   │ 3 bytes │ Data size                                │
/// │ 0x04   │ 3 bytes │ Timestamp, low 24 bits (ms)              │
/// │ 0x07   │ 1 byte  │ Timestamp, high 8 bits                   │
/// │ 0x08   │ 3 bytes │ Stream id (always 0)                     │
/// └────────┴─────────┴──────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlvTagHeader {
    pub tag_type: u8,
    pub data_size: u32,
    pub timestamp: u32,
    pub stream_id: u32,
}

impl FlvTagHeader {
    #[must_use]
    pub fn new(tag_type: u8, data_size: u32, timestamp: u32) -> Self {
        Self {
            tag_type,
            data_size,
            timestamp,
            stream_id: 0,
        }
    }

    /// Value of the previous-tag-size word that follows this tag.
    #[must_use]
    pub fn tag_size(&self) -> u32 {
        FLV_TAG_HEADER_SIZE + self.data_size
    }

    /// # Errors
    ///
    /// [`WireError::HeaderFieldOverflow`] if the data size or stream id
    /// exceeds 24 bits.
    pub fn write_to(&self, w: &mut BitWriter) -> Result<(), WireError> {
        if self.data_size > MAX_FLV_DATA_SIZE {
            return Err(WireError::HeaderFieldOverflow {
                field: "flv data size",
                value: u64::from(self.data_size),
                bits: 24,
            });
        }
        if self.stream_id > MAX_FLV_DATA_SIZE {
            return Err(WireError::HeaderFieldOverflow {
                field: "flv stream id",
                value: u64::from(self.stream_id),
                bits: 24,
            });
        }
        w.write_u8(self.tag_type);
        w.write_u24(self.data_size)?;
        w.write_u24(self.timestamp & 0x00FF_FFFF)?;
        w.write_u8((self.timestamp >> 24) as u8);
        w.write_u24(self.stream_id)
    }

    /// # Errors
    ///
    /// [`WireError::OutOfBounds`] if fewer than 11 bytes remain.
    pub fn read_from(r: &mut BitReader<'_>) -> Result<Self, WireError> {
        let tag_type = r.read_u8()?;
        let data_size = r.read_u24()?;
        let low = r.read_u24()?;
        let high = u32::from(r.read_u8()?);
        let stream_id = r.read_u24()?;
        Ok(Self {
            tag_type,
            data_size,
            timestamp: high << 24 | low,
            stream_id,
        })
    }

    /// Read the next tag type and rewind.
    ///
    /// # Errors
    ///
    /// [`WireError::OutOfBounds`] at the end of the buffer.
    pub fn scan_type(r: &mut BitReader<'_>) -> Result<u8, WireError> {
        r.align_to_byte();
        let start = r.pointer();
        let tag_type = r.read_u8()?;
        r.set_pointer(start)?;
        Ok(tag_type)
    }
}
