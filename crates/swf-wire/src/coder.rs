use std::borrow::Cow;

use crate::error::{CodingMismatch, WireError};

/// Byte order used by multi-byte word access.
///
/// SWF stores words little-endian, FLV big-endian. Bit fields are always
/// packed most-significant bit first regardless of this setting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

/// Text encoding applied by the string helpers.
///
/// SWF 6 and later store UTF-8; earlier movies store single-byte text,
/// which is passed through as Latin-1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextEncoding {
    #[default]
    Utf8,
    Latin1,
}

impl TextEncoding {
    /// Encoding used by movies of the given format version.
    #[must_use]
    pub fn for_version(version: u8) -> Self {
        if version >= 6 { Self::Utf8 } else { Self::Latin1 }
    }

    fn decode(self, bytes: &[u8], offset: usize) -> Result<String, WireError> {
        match self {
            Self::Utf8 => String::from_utf8(bytes.to_vec()).map_err(|e| WireError::InvalidText {
                offset,
                reason: e.to_string(),
            }),
            Self::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }

    fn encode(self, text: &str, offset: usize) -> Result<Cow<'_, [u8]>, WireError> {
        match self {
            Self::Utf8 => Ok(Cow::Borrowed(text.as_bytes())),
            Self::Latin1 => text
                .chars()
                .map(|c| {
                    u8::try_from(u32::from(c)).map_err(|_| WireError::InvalidText {
                        offset,
                        reason: format!("{c:?} has no Latin-1 encoding"),
                    })
                })
                .collect::<Result<Vec<u8>, _>>()
                .map(Cow::Owned),
        }
    }
}

/// A saved cursor position, taken at the start of a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mark {
    start: usize,
}

impl Mark {
    /// Bit offset the mark was taken at.
    #[must_use]
    pub fn bit_offset(self) -> usize {
        self.start
    }
}

/// The extent a record claims for itself: where it started and where its
/// body must end according to the declared length.
///
/// Built by `span()` right after the record header has been read or
/// written, consumed by `finish()` once the body is done.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordSpan {
    family: &'static str,
    code: u16,
    start: usize,
    declared: u32,
    end: usize,
}

impl RecordSpan {
    #[must_use]
    pub fn family(&self) -> &'static str {
        self.family
    }

    #[must_use]
    pub fn code(&self) -> u16 {
        self.code
    }

    #[must_use]
    pub fn declared(&self) -> u32 {
        self.declared
    }

    /// Bit offset at which the body must end.
    #[must_use]
    pub fn end(&self) -> usize {
        self.end
    }

    fn check(&self, pos: usize) -> Result<(), WireError> {
        if pos == self.end {
            return Ok(());
        }
        // both offsets are byte-aligned here
        let delta = (pos as i64 - self.end as i64) / 8;
        Err(CodingMismatch {
            family: self.family,
            code: self.code,
            start: self.start / 8,
            declared: self.declared,
            delta,
        }
        .into())
    }
}

fn sign_extend(value: u64, width: u32) -> i64 {
    if width == 0 || width >= 64 {
        return value as i64;
    }
    let shift = 64 - width;
    ((value << shift) as i64) >> shift
}

fn check_bits(width: u32) -> Result<(), WireError> {
    if width > 32 {
        return Err(WireError::FieldTooWide { width });
    }
    Ok(())
}

fn check_word(bytes: usize) -> Result<(), WireError> {
    if bytes == 0 || bytes > 8 {
        return Err(WireError::WordTooWide { bytes });
    }
    Ok(())
}

fn seek_target(pos: usize, delta: i64, limit: usize) -> Result<usize, WireError> {
    let target = pos as i64 + delta;
    if target < 0 || target as usize > limit {
        return Err(WireError::PointerOutOfRange { target, limit });
    }
    Ok(target as usize)
}

/// Bit-addressable read cursor over a borrowed byte buffer.
///
/// ```text
///   byte 0            byte 1
///  ┌─┬─┬─┬─┬─┬─┬─┬─┐ ┌─┬─┬─┬─┬─┬─┬─┬─┐
///  │7│6│5│4│3│2│1│0│ │7│6│5│4│3│2│1│0│   bit fields: MSB first
///  └─┴─┴─┴─┴─┴─┴─┴─┘ └─┴─┴─┴─┴─┴─┴─┴─┘
///   ▲ pointer 0        ▲ pointer 8
/// ```
///
/// The pointer is an absolute bit offset. Bit reads continue from any
/// offset; word, string and byte reads first skip to the next byte
/// boundary. Reading past the end fails with [`WireError::OutOfBounds`];
/// the pointer is left unchanged on failure.
#[derive(Debug)]
pub struct BitReader<'a> {
    buf: &'a [u8],
    pos: usize,
    order: ByteOrder,
    encoding: TextEncoding,
}

impl<'a> BitReader<'a> {
    #[must_use]
    pub fn new(buf: &'a [u8], order: ByteOrder) -> Self {
        Self {
            buf,
            pos: 0,
            order,
            encoding: TextEncoding::Utf8,
        }
    }

    /// Reader in SWF mode (little-endian words).
    #[must_use]
    pub fn swf(buf: &'a [u8]) -> Self {
        Self::new(buf, ByteOrder::Little)
    }

    /// Reader in FLV mode (big-endian words).
    #[must_use]
    pub fn flv(buf: &'a [u8]) -> Self {
        Self::new(buf, ByteOrder::Big)
    }

    pub fn set_text_encoding(&mut self, encoding: TextEncoding) {
        self.encoding = encoding;
    }

    #[must_use]
    pub fn text_encoding(&self) -> TextEncoding {
        self.encoding
    }

    #[must_use]
    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    // ── Positioning ─────────────────────────────────────────────────────

    /// Current bit offset.
    #[must_use]
    pub fn pointer(&self) -> usize {
        self.pos
    }

    /// Move to an absolute bit offset within `0..=len*8`.
    ///
    /// # Errors
    ///
    /// [`WireError::PointerOutOfRange`] if `bits` lies past the end.
    pub fn set_pointer(&mut self, bits: usize) -> Result<(), WireError> {
        self.pos = seek_target(0, bits as i64, self.limit())?;
        Ok(())
    }

    /// Move the pointer by a signed number of bits.
    ///
    /// # Errors
    ///
    /// [`WireError::PointerOutOfRange`] if the target lies outside the buffer.
    pub fn adjust_pointer(&mut self, delta_bits: i64) -> Result<(), WireError> {
        self.pos = seek_target(self.pos, delta_bits, self.limit())?;
        Ok(())
    }

    /// Round the pointer up to the next byte boundary.
    pub fn align_to_byte(&mut self) {
        self.pos = (self.pos + 7) & !7;
    }

    /// Total size of the buffer in bits.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.buf.len() * 8
    }

    #[must_use]
    pub fn remaining_bits(&self) -> usize {
        self.limit().saturating_sub(self.pos)
    }

    /// Whole bytes left after the current (possibly partial) byte.
    #[must_use]
    pub fn remaining_bytes(&self) -> usize {
        self.buf.len().saturating_sub(self.pos.div_ceil(8))
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.limit()
    }

    fn ensure(&self, needed: usize) -> Result<(), WireError> {
        if needed > self.remaining_bits() {
            return Err(WireError::OutOfBounds {
                offset: self.pos,
                needed,
                available: self.remaining_bits(),
            });
        }
        Ok(())
    }

    // ── Record bookkeeping ──────────────────────────────────────────────

    /// Remember the current position as the start of a record.
    #[must_use]
    pub fn mark(&self) -> Mark {
        Mark { start: self.pos }
    }

    /// Describe the record that started at `mark` and whose body, starting
    /// at the current pointer, declares `declared` bytes.
    #[must_use]
    pub fn span(&self, family: &'static str, code: u16, mark: Mark, declared: u32) -> RecordSpan {
        RecordSpan {
            family,
            code,
            start: mark.start,
            declared,
            end: self.pos + declared as usize * 8,
        }
    }

    /// Align to the next byte and verify the cursor sits exactly at the
    /// end of `span`.
    ///
    /// # Errors
    ///
    /// [`WireError::CodingMismatch`] with the signed byte delta between the
    /// actual and expected end.
    pub fn finish(&mut self, span: &RecordSpan) -> Result<(), WireError> {
        self.align_to_byte();
        span.check(self.pos)
    }

    // ── Bit fields ──────────────────────────────────────────────────────

    fn read_raw(&mut self, width: u32) -> Result<u64, WireError> {
        check_bits(width)?;
        self.ensure(width as usize)?;
        let mut value: u64 = 0;
        let mut remaining = width;
        while remaining > 0 {
            let byte = u64::from(self.buf[self.pos >> 3]);
            let available = 8 - (self.pos & 7) as u32;
            let take = available.min(remaining);
            let chunk = (byte >> (available - take)) & ((1 << take) - 1);
            value = (value << take) | chunk;
            self.pos += take as usize;
            remaining -= take;
        }
        Ok(value)
    }

    /// Read an `n`-bit field (0..=32), sign-extending when `signed`.
    ///
    /// # Errors
    ///
    /// [`WireError::FieldTooWide`] for `n > 32`, [`WireError::OutOfBounds`]
    /// if the buffer is too short.
    pub fn read_bits(&mut self, n: u32, signed: bool) -> Result<i64, WireError> {
        let raw = self.read_raw(n)?;
        if signed {
            Ok(sign_extend(raw, n))
        } else {
            Ok(raw as i64)
        }
    }

    /// Read an unsigned `n`-bit field.
    ///
    /// # Errors
    ///
    /// See [`read_bits`](Self::read_bits).
    pub fn read_ubits(&mut self, n: u32) -> Result<u32, WireError> {
        Ok(self.read_raw(n)? as u32)
    }

    /// Read a signed `n`-bit field.
    ///
    /// # Errors
    ///
    /// See [`read_bits`](Self::read_bits).
    pub fn read_sbits(&mut self, n: u32) -> Result<i32, WireError> {
        Ok(sign_extend(self.read_raw(n)?, n) as i32)
    }

    /// Read a single-bit flag.
    ///
    /// # Errors
    ///
    /// [`WireError::OutOfBounds`] at the end of the buffer.
    pub fn read_bool(&mut self) -> Result<bool, WireError> {
        Ok(self.read_raw(1)? == 1)
    }

    // ── Words ───────────────────────────────────────────────────────────

    /// Read a `byte_count`-byte word (1..=8) in the reader's byte order.
    ///
    /// # Errors
    ///
    /// [`WireError::WordTooWide`] or [`WireError::OutOfBounds`].
    pub fn read_word(&mut self, byte_count: usize, signed: bool) -> Result<i64, WireError> {
        check_word(byte_count)?;
        self.align_to_byte();
        self.ensure(byte_count * 8)?;
        let start = self.pos >> 3;
        let bytes = &self.buf[start..start + byte_count];
        let mut value: u64 = 0;
        match self.order {
            ByteOrder::Little => {
                for &b in bytes.iter().rev() {
                    value = (value << 8) | u64::from(b);
                }
            }
            ByteOrder::Big => {
                for &b in bytes {
                    value = (value << 8) | u64::from(b);
                }
            }
        }
        self.pos += byte_count * 8;
        let width = (byte_count * 8) as u32;
        Ok(if signed { sign_extend(value, width) } else { value as i64 })
    }

    /// # Errors
    ///
    /// [`WireError::OutOfBounds`] at the end of the buffer.
    pub fn read_u8(&mut self) -> Result<u8, WireError> {
        Ok(self.read_word(1, false)? as u8)
    }

    /// # Errors
    ///
    /// [`WireError::OutOfBounds`] at the end of the buffer.
    pub fn read_u16(&mut self) -> Result<u16, WireError> {
        Ok(self.read_word(2, false)? as u16)
    }

    /// # Errors
    ///
    /// [`WireError::OutOfBounds`] at the end of the buffer.
    pub fn read_i16(&mut self) -> Result<i16, WireError> {
        Ok(self.read_word(2, true)? as i16)
    }

    /// # Errors
    ///
    /// [`WireError::OutOfBounds`] at the end of the buffer.
    pub fn read_u24(&mut self) -> Result<u32, WireError> {
        Ok(self.read_word(3, false)? as u32)
    }

    /// # Errors
    ///
    /// [`WireError::OutOfBounds`] at the end of the buffer.
    pub fn read_u32(&mut self) -> Result<u32, WireError> {
        Ok(self.read_word(4, false)? as u32)
    }

    /// # Errors
    ///
    /// [`WireError::OutOfBounds`] at the end of the buffer.
    pub fn read_i32(&mut self) -> Result<i32, WireError> {
        Ok(self.read_word(4, true)? as i32)
    }

    /// # Errors
    ///
    /// [`WireError::OutOfBounds`] at the end of the buffer.
    pub fn read_f32(&mut self) -> Result<f32, WireError> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    /// # Errors
    ///
    /// [`WireError::OutOfBounds`] at the end of the buffer.
    pub fn read_f64(&mut self) -> Result<f64, WireError> {
        Ok(f64::from_bits(self.read_word(8, false)? as u64))
    }

    // ── Bytes and strings ───────────────────────────────────────────────

    /// Borrow the next `n` bytes.
    ///
    /// # Errors
    ///
    /// [`WireError::OutOfBounds`] if fewer than `n` bytes remain.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        self.align_to_byte();
        self.ensure(n * 8)?;
        let start = self.pos >> 3;
        self.pos += n * 8;
        Ok(&self.buf[start..start + n])
    }

    /// Borrow every byte up to the end of `span`.
    ///
    /// # Errors
    ///
    /// [`WireError::OutOfBounds`] if the span ends past the buffer.
    pub fn read_to_end_of(&mut self, span: &RecordSpan) -> Result<&'a [u8], WireError> {
        self.align_to_byte();
        let n = span.end.saturating_sub(self.pos) / 8;
        self.read_bytes(n)
    }

    /// Read a null-terminated string in the active text encoding.
    ///
    /// # Errors
    ///
    /// [`WireError::UnterminatedString`] if no terminator is found,
    /// [`WireError::InvalidText`] if the bytes do not decode.
    pub fn read_string(&mut self) -> Result<String, WireError> {
        self.align_to_byte();
        let start = self.pos >> 3;
        let len = self.buf[start.min(self.buf.len())..]
            .iter()
            .position(|&b| b == 0)
            .ok_or(WireError::UnterminatedString { offset: start })?;
        let text = self.encoding.decode(&self.buf[start..start + len], start)?;
        self.pos += (len + 1) * 8;
        Ok(text)
    }

    /// Read a length-delimited string of exactly `len` bytes; a trailing
    /// null inside those bytes is dropped.
    ///
    /// # Errors
    ///
    /// [`WireError::OutOfBounds`] or [`WireError::InvalidText`].
    pub fn read_string_exact(&mut self, len: usize) -> Result<String, WireError> {
        let offset = self.pos.div_ceil(8);
        let bytes = self.read_bytes(len)?;
        let text = match bytes.split_last() {
            Some((0, rest)) => rest,
            _ => bytes,
        };
        self.encoding.decode(text, offset)
    }
}

/// Bit-addressable write cursor over an owned, growable buffer.
///
/// Writing at the end grows the buffer; writing after `set_pointer` has
/// moved the cursor back patches the existing bits in place. Unused bits
/// of a partially written byte are zero.
#[derive(Debug, Default)]
pub struct BitWriter {
    buf: Vec<u8>,
    pos: usize,
    order: ByteOrder,
    encoding: TextEncoding,
}

impl BitWriter {
    #[must_use]
    pub fn new(order: ByteOrder) -> Self {
        Self::with_capacity(order, 0)
    }

    /// Writer with room for `bytes` bytes before reallocating.
    #[must_use]
    pub fn with_capacity(order: ByteOrder, bytes: usize) -> Self {
        Self {
            buf: Vec::with_capacity(bytes),
            pos: 0,
            order,
            encoding: TextEncoding::Utf8,
        }
    }

    /// Writer in SWF mode (little-endian words).
    #[must_use]
    pub fn swf() -> Self {
        Self::new(ByteOrder::Little)
    }

    /// Writer in FLV mode (big-endian words).
    #[must_use]
    pub fn flv() -> Self {
        Self::new(ByteOrder::Big)
    }

    pub fn set_text_encoding(&mut self, encoding: TextEncoding) {
        self.encoding = encoding;
    }

    #[must_use]
    pub fn text_encoding(&self) -> TextEncoding {
        self.encoding
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    // ── Positioning ─────────────────────────────────────────────────────

    #[must_use]
    pub fn pointer(&self) -> usize {
        self.pos
    }

    /// # Errors
    ///
    /// [`WireError::PointerOutOfRange`] if `bits` lies past the end.
    pub fn set_pointer(&mut self, bits: usize) -> Result<(), WireError> {
        self.pos = seek_target(0, bits as i64, self.buf.len() * 8)?;
        Ok(())
    }

    /// # Errors
    ///
    /// [`WireError::PointerOutOfRange`] if the target lies outside the buffer.
    pub fn adjust_pointer(&mut self, delta_bits: i64) -> Result<(), WireError> {
        self.pos = seek_target(self.pos, delta_bits, self.buf.len() * 8)?;
        Ok(())
    }

    pub fn align_to_byte(&mut self) {
        self.pos = (self.pos + 7) & !7;
    }

    // ── Record bookkeeping ──────────────────────────────────────────────

    #[must_use]
    pub fn mark(&self) -> Mark {
        Mark { start: self.pos }
    }

    #[must_use]
    pub fn span(&self, family: &'static str, code: u16, mark: Mark, declared: u32) -> RecordSpan {
        RecordSpan {
            family,
            code,
            start: mark.start,
            declared,
            end: self.pos + declared as usize * 8,
        }
    }

    /// # Errors
    ///
    /// [`WireError::CodingMismatch`] if the body written does not match
    /// the length written into the header.
    pub fn finish(&mut self, span: &RecordSpan) -> Result<(), WireError> {
        self.align_to_byte();
        span.check(self.pos)
    }

    // ── Bit fields ──────────────────────────────────────────────────────

    fn write_raw(&mut self, value: u64, width: u32) -> Result<(), WireError> {
        check_bits(width)?;
        let mut remaining = width;
        while remaining > 0 {
            let index = self.pos >> 3;
            if index == self.buf.len() {
                self.buf.push(0);
            }
            let available = 8 - (self.pos & 7) as u32;
            let take = available.min(remaining);
            let shift = available - take;
            let chunk = ((value >> (remaining - take)) & ((1 << take) - 1)) as u8;
            let mask = (((1u16 << take) - 1) as u8) << shift;
            self.buf[index] = (self.buf[index] & !mask) | (chunk << shift);
            self.pos += take as usize;
            remaining -= take;
        }
        Ok(())
    }

    /// Write the low `n` bits of `value` (0..=32); higher bits, including
    /// the sign of negative values, are truncated.
    ///
    /// # Errors
    ///
    /// [`WireError::FieldTooWide`] for `n > 32`.
    pub fn write_bits(&mut self, value: i64, n: u32) -> Result<(), WireError> {
        self.write_raw(value as u64, n)
    }

    /// # Errors
    ///
    /// [`WireError::FieldTooWide`] for `n > 32`.
    pub fn write_ubits(&mut self, value: u32, n: u32) -> Result<(), WireError> {
        self.write_raw(u64::from(value), n)
    }

    /// # Errors
    ///
    /// [`WireError::FieldTooWide`] for `n > 32`.
    pub fn write_sbits(&mut self, value: i32, n: u32) -> Result<(), WireError> {
        self.write_raw(i64::from(value) as u64, n)
    }

    /// # Errors
    ///
    /// Never fails in practice; kept fallible for symmetry.
    pub fn write_bool(&mut self, value: bool) -> Result<(), WireError> {
        self.write_raw(u64::from(value), 1)
    }

    // ── Words ───────────────────────────────────────────────────────────

    fn put_byte(&mut self, byte: u8) {
        let index = self.pos >> 3;
        if index == self.buf.len() {
            self.buf.push(byte);
        } else {
            self.buf[index] = byte;
        }
        self.pos += 8;
    }

    /// Write the low `byte_count` bytes of `value` in the writer's byte order.
    ///
    /// # Errors
    ///
    /// [`WireError::WordTooWide`] unless `byte_count` is 1..=8.
    pub fn write_word(&mut self, value: i64, byte_count: usize) -> Result<(), WireError> {
        check_word(byte_count)?;
        self.align_to_byte();
        let value = value as u64;
        match self.order {
            ByteOrder::Little => {
                for i in 0..byte_count {
                    self.put_byte((value >> (8 * i)) as u8);
                }
            }
            ByteOrder::Big => {
                for i in (0..byte_count).rev() {
                    self.put_byte((value >> (8 * i)) as u8);
                }
            }
        }
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) {
        self.align_to_byte();
        self.put_byte(value);
    }

    /// # Errors
    ///
    /// Never fails for a fixed width; fallible for symmetry with
    /// [`write_word`](Self::write_word).
    pub fn write_u16(&mut self, value: u16) -> Result<(), WireError> {
        self.write_word(i64::from(value), 2)
    }

    /// # Errors
    ///
    /// See [`write_u16`](Self::write_u16).
    pub fn write_i16(&mut self, value: i16) -> Result<(), WireError> {
        self.write_word(i64::from(value), 2)
    }

    /// # Errors
    ///
    /// See [`write_u16`](Self::write_u16).
    pub fn write_u24(&mut self, value: u32) -> Result<(), WireError> {
        self.write_word(i64::from(value), 3)
    }

    /// # Errors
    ///
    /// See [`write_u16`](Self::write_u16).
    pub fn write_u32(&mut self, value: u32) -> Result<(), WireError> {
        self.write_word(i64::from(value), 4)
    }

    /// # Errors
    ///
    /// See [`write_u16`](Self::write_u16).
    pub fn write_i32(&mut self, value: i32) -> Result<(), WireError> {
        self.write_word(i64::from(value), 4)
    }

    /// # Errors
    ///
    /// See [`write_u16`](Self::write_u16).
    pub fn write_f32(&mut self, value: f32) -> Result<(), WireError> {
        self.write_u32(value.to_bits())
    }

    /// # Errors
    ///
    /// See [`write_u16`](Self::write_u16).
    pub fn write_f64(&mut self, value: f64) -> Result<(), WireError> {
        self.write_word(value.to_bits() as i64, 8)
    }

    // ── Bytes and strings ───────────────────────────────────────────────

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.align_to_byte();
        for &b in bytes {
            self.put_byte(b);
        }
    }

    /// Encoded size of `text` as a null-terminated string.
    ///
    /// # Errors
    ///
    /// [`WireError::InvalidText`] if `text` cannot be represented.
    pub fn string_len(encoding: TextEncoding, text: &str) -> Result<usize, WireError> {
        Ok(encoding.encode(text, 0)?.len() + 1)
    }

    /// Write `text` followed by a null terminator.
    ///
    /// # Errors
    ///
    /// [`WireError::InvalidText`] if `text` cannot be represented in the
    /// active encoding.
    pub fn write_string(&mut self, text: &str) -> Result<(), WireError> {
        let bytes = self.encoding.encode(text, self.pos.div_ceil(8))?;
        self.write_bytes(&bytes);
        self.put_byte(0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_cross_byte_boundaries() {
        let mut w = BitWriter::swf();
        w.write_ubits(0b101, 3).unwrap();
        w.write_ubits(0b1_1001_1001, 9).unwrap();
        w.write_sbits(-3, 4).unwrap();
        let bytes = w.into_bytes();
        assert_eq!(bytes, vec![0b1011_1001, 0b1001_1101]);

        let mut r = BitReader::swf(&bytes);
        assert_eq!(r.read_ubits(3).unwrap(), 0b101);
        assert_eq!(r.read_ubits(9).unwrap(), 0b1_1001_1001);
        assert_eq!(r.read_sbits(4).unwrap(), -3);
        assert!(r.is_exhausted());
    }

    #[test]
    fn signed_fields_sign_extend_and_truncate() {
        let mut w = BitWriter::swf();
        w.write_bits(-1, 5).unwrap();
        w.write_bits(0x1FF, 3).unwrap(); // truncated to 0b111
        let bytes = w.into_bytes();
        assert_eq!(bytes, vec![0xFF]);

        let mut r = BitReader::swf(&bytes);
        assert_eq!(r.read_bits(5, true).unwrap(), -1);
        assert_eq!(r.read_bits(3, false).unwrap(), 7);
    }

    #[test]
    fn full_width_fields() {
        let mut w = BitWriter::swf();
        w.write_sbits(i32::MIN, 32).unwrap();
        w.write_ubits(u32::MAX, 32).unwrap();
        let bytes = w.into_bytes();
        let mut r = BitReader::swf(&bytes);
        assert_eq!(r.read_sbits(32).unwrap(), i32::MIN);
        assert_eq!(r.read_ubits(32).unwrap(), u32::MAX);
    }

    #[test]
    fn zero_width_reads_nothing() {
        let mut r = BitReader::swf(&[]);
        assert_eq!(r.read_bits(0, true).unwrap(), 0);
        assert_eq!(r.pointer(), 0);
    }

    #[test]
    fn too_wide_is_rejected() {
        let mut r = BitReader::swf(&[0; 8]);
        assert!(matches!(
            r.read_bits(33, false),
            Err(WireError::FieldTooWide { width: 33 })
        ));
        let mut w = BitWriter::swf();
        assert!(matches!(
            w.write_bits(0, 40),
            Err(WireError::FieldTooWide { width: 40 })
        ));
    }

    #[test]
    fn out_of_bounds_leaves_pointer() {
        let mut r = BitReader::swf(&[0xAB]);
        r.read_ubits(4).unwrap();
        let err = r.read_ubits(5).unwrap_err();
        assert!(matches!(
            err,
            WireError::OutOfBounds {
                offset: 4,
                needed: 5,
                available: 4
            }
        ));
        assert_eq!(r.pointer(), 4);
    }

    #[test]
    fn words_follow_byte_order() {
        let mut w = BitWriter::swf();
        w.write_u16(0x1234).unwrap();
        w.write_u32(0xDEAD_BEEF).unwrap();
        assert_eq!(w.as_bytes(), &[0x34, 0x12, 0xEF, 0xBE, 0xAD, 0xDE]);

        let mut w = BitWriter::flv();
        w.write_u24(0x0A_0B_0C).unwrap();
        w.write_u16(0x1234).unwrap();
        assert_eq!(w.as_bytes(), &[0x0A, 0x0B, 0x0C, 0x12, 0x34]);

        let bytes = [0xFE, 0xFF];
        assert_eq!(BitReader::swf(&bytes).read_i16().unwrap(), -2);
        assert_eq!(BitReader::flv(&bytes).read_u16().unwrap(), 0xFEFF);
    }

    #[test]
    fn word_access_aligns_first() {
        let mut w = BitWriter::swf();
        w.write_ubits(1, 1).unwrap();
        w.write_u8(0x42);
        assert_eq!(w.as_bytes(), &[0x80, 0x42]);

        let bytes = w.into_bytes();
        let mut r = BitReader::swf(&bytes);
        assert!(r.read_bool().unwrap());
        assert_eq!(r.read_u8().unwrap(), 0x42);
    }

    #[test]
    fn scan_by_read_and_rewind() {
        let bytes = [0x43, 0x02, 0xFF];
        let mut r = BitReader::swf(&bytes);
        let start = r.pointer();
        let word = r.read_u16().unwrap();
        r.set_pointer(start).unwrap();
        assert_eq!(word >> 6, 9);
        assert_eq!(r.read_u16().unwrap(), word);
    }

    #[test]
    fn pointer_moves_stay_in_bounds() {
        let bytes = [0u8; 2];
        let mut r = BitReader::swf(&bytes);
        r.set_pointer(16).unwrap();
        assert!(r.is_exhausted());
        assert!(matches!(
            r.set_pointer(17),
            Err(WireError::PointerOutOfRange { target: 17, limit: 16 })
        ));
        r.adjust_pointer(-10).unwrap();
        assert_eq!(r.pointer(), 6);
        assert!(r.adjust_pointer(-7).is_err());
    }

    #[test]
    fn writer_patches_in_place() {
        let mut w = BitWriter::swf();
        w.write_u16(0).unwrap();
        w.write_u8(0xAA);
        w.set_pointer(0).unwrap();
        w.write_u16(0xBEEF).unwrap();
        assert_eq!(w.as_bytes(), &[0xEF, 0xBE, 0xAA]);
        assert_eq!(w.pointer(), 16);
    }

    #[test]
    fn strings_terminated_and_exact() {
        let mut w = BitWriter::swf();
        w.write_string("frame1").unwrap();
        w.write_bytes(b"abc\0");
        let bytes = w.into_bytes();
        assert_eq!(&bytes[..7], b"frame1\0");

        let mut r = BitReader::swf(&bytes);
        assert_eq!(r.read_string().unwrap(), "frame1");
        assert_eq!(r.read_string_exact(4).unwrap(), "abc");
        assert!(r.is_exhausted());
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let mut r = BitReader::swf(b"abc");
        assert!(matches!(
            r.read_string(),
            Err(WireError::UnterminatedString { offset: 0 })
        ));
    }

    #[test]
    fn latin1_passthrough() {
        let mut w = BitWriter::swf();
        w.set_text_encoding(TextEncoding::Latin1);
        w.write_string("caf\u{e9}").unwrap();
        assert_eq!(w.as_bytes(), &[b'c', b'a', b'f', 0xE9, 0]);
        assert!(w.write_string("\u{263A}").is_err());

        let bytes = [b'c', b'a', b'f', 0xE9, 0];
        let mut r = BitReader::swf(&bytes);
        r.set_text_encoding(TextEncoding::Latin1);
        assert_eq!(r.read_string().unwrap(), "caf\u{e9}");
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        let mut r = BitReader::swf(&[0xC3, 0x28, 0x00]);
        assert!(matches!(r.read_string(), Err(WireError::InvalidText { .. })));
    }

    #[test]
    fn finish_reports_signed_delta() {
        let bytes = [0u8; 12];
        let mut r = BitReader::swf(&bytes);
        let mark = r.mark();
        r.read_u16().unwrap();
        let span = r.span("tag", 9, mark, 10);
        r.read_bytes(8).unwrap();
        let err = r.finish(&span).unwrap_err();
        match err {
            WireError::CodingMismatch(m) => {
                assert_eq!(m.code, 9);
                assert_eq!(m.start, 0);
                assert_eq!(m.declared, 10);
                assert_eq!(m.delta, -2);
            }
            other => panic!("expected CodingMismatch, got {other:?}"),
        }
    }

    #[test]
    fn finish_aligns_before_checking() {
        let bytes = [0u8; 3];
        let mut r = BitReader::swf(&bytes);
        let mark = r.mark();
        r.read_u8().unwrap();
        let span = r.span("action", 0x96, mark, 2);
        r.read_ubits(13).unwrap();
        r.finish(&span).unwrap();
        assert_eq!(r.pointer(), 24);
    }

    #[test]
    fn doubles_and_floats() {
        let mut w = BitWriter::swf();
        w.write_f32(1.5).unwrap();
        w.write_f64(-0.25).unwrap();
        let bytes = w.into_bytes();
        let mut r = BitReader::swf(&bytes);
        assert!((r.read_f32().unwrap() - 1.5).abs() < f32::EPSILON);
        assert!((r.read_f64().unwrap() + 0.25).abs() < f64::EPSILON);
    }

    proptest::proptest! {
        #[test]
        fn arbitrary_fields_survive(fields in proptest::collection::vec((proptest::prelude::any::<u32>(), 0u32..=32), 0..40)) {
            let mut w = BitWriter::swf();
            for &(value, width) in &fields {
                w.write_ubits(value, width).unwrap();
            }
            let bytes = w.into_bytes();
            let mut r = BitReader::swf(&bytes);
            for &(value, width) in &fields {
                let mask = if width == 32 { u32::MAX } else { (1u32 << width) - 1 };
                proptest::prop_assert_eq!(r.read_ubits(width).unwrap(), value & mask);
            }
        }
    }
}
