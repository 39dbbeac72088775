//! Bit-packed geometry and color structures.
//!
//! Each structure stores a group of integers at one shared width, written
//! as an unsigned prefix, and ends on a byte boundary. Values built in
//! memory use the narrowest width; a decoded structure whose width was
//! wider than needed keeps it, so it encodes back to the same bits.

use swf_wire::bits::{max_signed_bits, signed_bits};
use swf_wire::{BitReader, BitWriter};

use crate::context::{Context, ContextFlags};
use crate::error::{TypeError, check_range};

/// Largest value a group member may take when its width lives in a 5-bit
/// prefix (31 bits, signed).
const MAX_31: i64 = (1 << 30) - 1;
const MIN_31: i64 = -(1 << 30);

/// Read an unsigned width prefix, rejecting zero.
pub(crate) fn read_width(r: &mut BitReader<'_>, bits: u32, field: &'static str) -> Result<u32, TypeError> {
    let width = r.read_ubits(bits)?;
    if width == 0 {
        return Err(TypeError::ZeroBitWidth { field });
    }
    Ok(width)
}

fn check_31(field: &'static str, value: i32) -> Result<(), TypeError> {
    check_range(field, i64::from(value), MIN_31, MAX_31)
}

fn bytes_for(bits: u32) -> usize {
    bits.div_ceil(8) as usize
}

/// Width to write: the decoded one when it was wider than `minimal`.
pub(crate) fn kept_width(minimal: u32, kept: Option<u8>) -> u32 {
    kept.map_or(minimal, |n| minimal.max(u32::from(n)))
}

/// Decoded width worth remembering: only one wider than `minimal`.
pub(crate) fn wider_than(read: u32, minimal: u32) -> Option<u8> {
    (read > minimal).then(|| read as u8)
}

/// Axis-aligned rectangle in twips.
///
/// ```text
///  UB[5] nbits │ SB[nbits] x_min │ x_max │ y_min │ y_max │ pad to byte
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    x_min: i32,
    x_max: i32,
    y_min: i32,
    y_max: i32,
    nbits: Option<u8>,
}

impl Rect {
    /// # Errors
    ///
    /// [`TypeError::OutOfRange`] if a coordinate needs more than 31 bits.
    pub fn new(x_min: i32, x_max: i32, y_min: i32, y_max: i32) -> Result<Self, TypeError> {
        check_31("rect x_min", x_min)?;
        check_31("rect x_max", x_max)?;
        check_31("rect y_min", y_min)?;
        check_31("rect y_max", y_max)?;
        Ok(Self {
            x_min,
            x_max,
            y_min,
            y_max,
            nbits: None,
        })
    }

    /// Rectangle from the origin to `width` x `height` pixels.
    ///
    /// # Errors
    ///
    /// [`TypeError::OutOfRange`] if the size in twips overflows.
    pub fn from_pixels(width: u16, height: u16) -> Result<Self, TypeError> {
        Self::new(0, i32::from(width) * 20, 0, i32::from(height) * 20)
    }

    #[must_use]
    pub fn x_min(&self) -> i32 {
        self.x_min
    }

    #[must_use]
    pub fn x_max(&self) -> i32 {
        self.x_max
    }

    #[must_use]
    pub fn y_min(&self) -> i32 {
        self.y_min
    }

    #[must_use]
    pub fn y_max(&self) -> i32 {
        self.y_max
    }

    #[must_use]
    pub fn width(&self) -> i32 {
        self.x_max - self.x_min
    }

    #[must_use]
    pub fn height(&self) -> i32 {
        self.y_max - self.y_min
    }

    fn minimal_bits(&self) -> u32 {
        max_signed_bits(&[self.x_min, self.x_max, self.y_min, self.y_max])
    }

    /// Width of each coordinate field on the wire.
    #[must_use]
    pub fn field_bits(&self) -> u32 {
        kept_width(self.minimal_bits(), self.nbits)
    }

    /// Encoded size in bytes.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        bytes_for(5 + 4 * self.field_bits())
    }

    /// # Errors
    ///
    /// Wire errors only; coordinates were validated on construction.
    pub fn write(&self, w: &mut BitWriter) -> Result<(), TypeError> {
        let n = self.field_bits();
        w.write_ubits(n, 5)?;
        for v in [self.x_min, self.x_max, self.y_min, self.y_max] {
            w.write_sbits(v, n)?;
        }
        w.align_to_byte();
        Ok(())
    }

    /// # Errors
    ///
    /// [`TypeError::ZeroBitWidth`] for a zero width prefix, or a wire error.
    pub fn read(r: &mut BitReader<'_>) -> Result<Self, TypeError> {
        r.align_to_byte();
        let n = read_width(r, 5, "rect")?;
        let mut rect = Self {
            x_min: r.read_sbits(n)?,
            x_max: r.read_sbits(n)?,
            y_min: r.read_sbits(n)?,
            y_max: r.read_sbits(n)?,
            nbits: None,
        };
        rect.nbits = wider_than(n, rect.minimal_bits());
        r.align_to_byte();
        Ok(rect)
    }
}

/// 2-D affine transform.
///
/// Scale and rotate/skew terms are 16.16 fixed point stored as raw `i32`;
/// translation is in twips.
///
/// ```text
///  UB[1] has_scale  [UB[5] n │ FB[n] sx │ FB[n] sy]
///  UB[1] has_rotate [UB[5] n │ FB[n] r0 │ FB[n] r1]
///  UB[5] n │ SB[n] tx │ SB[n] ty │ pad to byte
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Matrix {
    scale: Option<(i32, i32)>,
    rotate: Option<(i32, i32)>,
    translate: (i32, i32),
    /// Decoded widths of the scale, rotate and translate pairs.
    nbits: [Option<u8>; 3],
}

impl Matrix {
    /// Pure translation.
    ///
    /// # Errors
    ///
    /// [`TypeError::OutOfRange`] if a term needs more than 31 bits.
    pub fn translation(x: i32, y: i32) -> Result<Self, TypeError> {
        check_31("matrix translate_x", x)?;
        check_31("matrix translate_y", y)?;
        Ok(Self {
            translate: (x, y),
            ..Self::default()
        })
    }

    #[must_use]
    pub fn identity() -> Self {
        Self::default()
    }

    /// Add scale terms (16.16 fixed point).
    ///
    /// # Errors
    ///
    /// [`TypeError::OutOfRange`] if a term needs more than 31 bits.
    pub fn with_scale(self, x: i32, y: i32) -> Result<Self, TypeError> {
        check_31("matrix scale_x", x)?;
        check_31("matrix scale_y", y)?;
        let mut nbits = self.nbits;
        nbits[0] = None;
        Ok(Self {
            scale: Some((x, y)),
            nbits,
            ..self
        })
    }

    /// Add rotate/skew terms (16.16 fixed point).
    ///
    /// # Errors
    ///
    /// [`TypeError::OutOfRange`] if a term needs more than 31 bits.
    pub fn with_rotate(self, skew0: i32, skew1: i32) -> Result<Self, TypeError> {
        check_31("matrix rotate_skew0", skew0)?;
        check_31("matrix rotate_skew1", skew1)?;
        let mut nbits = self.nbits;
        nbits[1] = None;
        Ok(Self {
            rotate: Some((skew0, skew1)),
            nbits,
            ..self
        })
    }

    #[must_use]
    pub fn scale(&self) -> Option<(i32, i32)> {
        self.scale
    }

    #[must_use]
    pub fn rotate(&self) -> Option<(i32, i32)> {
        self.rotate
    }

    #[must_use]
    pub fn translate(&self) -> (i32, i32) {
        self.translate
    }

    fn minimal_pair_bits((a, b): (i32, i32)) -> u32 {
        signed_bits(a).max(signed_bits(b))
    }

    fn pair_bits(&self, slot: usize, pair: (i32, i32)) -> u32 {
        kept_width(Self::minimal_pair_bits(pair), self.nbits[slot])
    }

    #[must_use]
    pub fn encoded_len(&self) -> usize {
        let mut bits = 1 + 1 + 5 + 2 * self.pair_bits(2, self.translate);
        if let Some(pair) = self.scale {
            bits += 5 + 2 * self.pair_bits(0, pair);
        }
        if let Some(pair) = self.rotate {
            bits += 5 + 2 * self.pair_bits(1, pair);
        }
        bytes_for(bits)
    }

    fn write_pair(&self, w: &mut BitWriter, slot: usize, pair: (i32, i32)) -> Result<(), TypeError> {
        let n = self.pair_bits(slot, pair);
        w.write_ubits(n, 5)?;
        w.write_sbits(pair.0, n)?;
        w.write_sbits(pair.1, n)?;
        Ok(())
    }

    fn read_pair(r: &mut BitReader<'_>, field: &'static str) -> Result<((i32, i32), Option<u8>), TypeError> {
        let n = read_width(r, 5, field)?;
        let pair = (r.read_sbits(n)?, r.read_sbits(n)?);
        Ok((pair, wider_than(n, Self::minimal_pair_bits(pair))))
    }

    /// # Errors
    ///
    /// Wire errors only.
    pub fn write(&self, w: &mut BitWriter) -> Result<(), TypeError> {
        for (slot, part) in [self.scale, self.rotate].into_iter().enumerate() {
            w.write_bool(part.is_some())?;
            if let Some(pair) = part {
                self.write_pair(w, slot, pair)?;
            }
        }
        self.write_pair(w, 2, self.translate)?;
        w.align_to_byte();
        Ok(())
    }

    /// # Errors
    ///
    /// [`TypeError::ZeroBitWidth`] for a zero width prefix, or a wire error.
    pub fn read(r: &mut BitReader<'_>) -> Result<Self, TypeError> {
        r.align_to_byte();
        let mut nbits = [None; 3];
        let mut scale = None;
        if r.read_bool()? {
            let (pair, n) = Self::read_pair(r, "matrix scale")?;
            scale = Some(pair);
            nbits[0] = n;
        }
        let mut rotate = None;
        if r.read_bool()? {
            let (pair, n) = Self::read_pair(r, "matrix rotate")?;
            rotate = Some(pair);
            nbits[1] = n;
        }
        let (translate, n) = Self::read_pair(r, "matrix translate")?;
        nbits[2] = n;
        r.align_to_byte();
        Ok(Self {
            scale,
            rotate,
            translate,
            nbits,
        })
    }
}

/// An RGB or RGBA color. Whether alpha is on the wire depends on the
/// [`ContextFlags::TRANSPARENT`] flag; without it alpha reads as 255 and is
/// not written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Color {
    #[must_use]
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: 255,
        }
    }

    #[must_use]
    pub const fn rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub fn encoded_len(ctx: &Context<'_>) -> usize {
        if ctx.has(ContextFlags::TRANSPARENT) { 4 } else { 3 }
    }

    pub fn write(&self, w: &mut BitWriter, ctx: &Context<'_>) {
        w.write_bytes(&[self.red, self.green, self.blue]);
        if ctx.has(ContextFlags::TRANSPARENT) {
            w.write_u8(self.alpha);
        }
    }

    /// # Errors
    ///
    /// [`swf_wire::WireError::OutOfBounds`] if the color is cut short.
    pub fn read(r: &mut BitReader<'_>, ctx: &Context<'_>) -> Result<Self, TypeError> {
        let red = r.read_u8()?;
        let green = r.read_u8()?;
        let blue = r.read_u8()?;
        let alpha = if ctx.has(ContextFlags::TRANSPARENT) {
            r.read_u8()?
        } else {
            255
        };
        Ok(Self {
            red,
            green,
            blue,
            alpha,
        })
    }
}

/// One set of color transform terms, in 8.8 fixed point for multipliers
/// and plain offsets for add terms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Terms {
    pub red: i16,
    pub green: i16,
    pub blue: i16,
    pub alpha: i16,
}

impl Terms {
    /// Multiplier terms that leave a color unchanged.
    pub const IDENTITY_MULT: Self = Self {
        red: 256,
        green: 256,
        blue: 256,
        alpha: 256,
    };

    /// Add terms that leave a color unchanged.
    pub const ZERO: Self = Self {
        red: 0,
        green: 0,
        blue: 0,
        alpha: 0,
    };

    fn values(self, alpha: bool) -> Vec<i32> {
        let mut values = vec![i32::from(self.red), i32::from(self.green), i32::from(self.blue)];
        if alpha {
            values.push(i32::from(self.alpha));
        }
        values
    }
}

/// Color transform, with or without alpha terms.
///
/// ```text
///  UB[1] has_add │ UB[1] has_mult │ UB[4] nbits
///  [SB[nbits] r g b (a)]  mult
///  [SB[nbits] r g b (a)]  add
///  pad to byte
/// ```
///
/// With a 4-bit width prefix every term is limited to 15 signed bits.
/// Alpha terms are present on the wire only under
/// [`ContextFlags::TRANSPARENT`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ColorTransform {
    mult: Option<Terms>,
    add: Option<Terms>,
    nbits: Option<u8>,
}

impl ColorTransform {
    /// # Errors
    ///
    /// [`TypeError::OutOfRange`] if a term needs more than 15 bits.
    pub fn new(mult: Option<Terms>, add: Option<Terms>) -> Result<Self, TypeError> {
        for terms in [mult, add].into_iter().flatten() {
            for v in terms.values(true) {
                check_range("color transform term", i64::from(v), -(1 << 14), (1 << 14) - 1)?;
            }
        }
        Ok(Self {
            mult,
            add,
            nbits: None,
        })
    }

    #[must_use]
    pub fn mult(&self) -> Option<Terms> {
        self.mult
    }

    #[must_use]
    pub fn add(&self) -> Option<Terms> {
        self.add
    }

    fn minimal_bits(&self, alpha: bool) -> u32 {
        let values: Vec<i32> = [self.mult, self.add]
            .into_iter()
            .flatten()
            .flat_map(|t| t.values(alpha))
            .collect();
        max_signed_bits(&values)
    }

    fn field_bits(&self, alpha: bool) -> u32 {
        kept_width(self.minimal_bits(alpha), self.nbits)
    }

    fn term_count(&self, alpha: bool) -> u32 {
        let per = if alpha { 4 } else { 3 };
        per * (u32::from(self.mult.is_some()) + u32::from(self.add.is_some()))
    }

    #[must_use]
    pub fn encoded_len(&self, ctx: &Context<'_>) -> usize {
        let alpha = ctx.has(ContextFlags::TRANSPARENT);
        bytes_for(6 + self.term_count(alpha) * self.field_bits(alpha))
    }

    /// # Errors
    ///
    /// Wire errors only.
    pub fn write(&self, w: &mut BitWriter, ctx: &Context<'_>) -> Result<(), TypeError> {
        let alpha = ctx.has(ContextFlags::TRANSPARENT);
        let n = self.field_bits(alpha);
        w.write_bool(self.add.is_some())?;
        w.write_bool(self.mult.is_some())?;
        w.write_ubits(n, 4)?;
        for terms in [self.mult, self.add].into_iter().flatten() {
            for v in terms.values(alpha) {
                w.write_sbits(v, n)?;
            }
        }
        w.align_to_byte();
        Ok(())
    }

    fn read_terms(r: &mut BitReader<'_>, n: u32, alpha: bool, default_alpha: i16) -> Result<Terms, TypeError> {
        // a 15-bit field always fits i16
        let red = r.read_sbits(n)? as i16;
        let green = r.read_sbits(n)? as i16;
        let blue = r.read_sbits(n)? as i16;
        let alpha = if alpha { r.read_sbits(n)? as i16 } else { default_alpha };
        Ok(Terms {
            red,
            green,
            blue,
            alpha,
        })
    }

    /// # Errors
    ///
    /// [`TypeError::ZeroBitWidth`] for a zero width prefix, or a wire error.
    pub fn read(r: &mut BitReader<'_>, ctx: &Context<'_>) -> Result<Self, TypeError> {
        let alpha = ctx.has(ContextFlags::TRANSPARENT);
        r.align_to_byte();
        let has_add = r.read_bool()?;
        let has_mult = r.read_bool()?;
        let n = read_width(r, 4, "color transform")?;
        let mult = if has_mult {
            Some(Self::read_terms(r, n, alpha, 256)?)
        } else {
            None
        };
        let add = if has_add {
            Some(Self::read_terms(r, n, alpha, 0)?)
        } else {
            None
        };
        r.align_to_byte();
        let mut cx = Self {
            mult,
            add,
            nbits: None,
        };
        cx.nbits = wider_than(n, cx.minimal_bits(alpha));
        Ok(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registries;

    fn encode<F: FnOnce(&mut BitWriter)>(f: F) -> Vec<u8> {
        let mut w = BitWriter::swf();
        f(&mut w);
        w.into_bytes()
    }

    #[test]
    fn zero_rect_takes_two_bytes() {
        let rect = Rect::default();
        assert_eq!(rect.encoded_len(), 2);
        let bytes = encode(|w| rect.write(w).unwrap());
        // nbits = 1, four zero bits, padding
        assert_eq!(bytes, vec![0b0000_1000, 0b0000_0000]);
    }

    #[test]
    fn stage_rect_layout() {
        // 550 x 400 px = 11000 x 8000 twips, 15-bit fields
        let rect = Rect::from_pixels(550, 400).unwrap();
        assert_eq!(rect.encoded_len(), 9);
        let bytes = encode(|w| rect.write(w).unwrap());
        assert_eq!(bytes, vec![0x78, 0x00, 0x05, 0x5F, 0x00, 0x00, 0x0F, 0xA0, 0x00]);
        let back = Rect::read(&mut BitReader::swf(&bytes)).unwrap();
        assert_eq!(back, rect);
    }

    #[test]
    fn wide_rect_fields_are_kept() {
        // the stage rect written at 16 bits per field
        let bytes = [0x80, 0x00, 0x01, 0x57, 0xC0, 0x00, 0x00, 0xFA, 0x00];
        let rect = Rect::read(&mut BitReader::swf(&bytes)).unwrap();
        assert_eq!(rect.width(), 11000);
        assert_eq!(rect.height(), 8000);
        assert_eq!(rect.field_bits(), 16);
        assert_eq!(rect.encoded_len(), bytes.len());
        assert_eq!(encode(|w| rect.write(w).unwrap()), bytes);
        // same coordinates, built in memory: narrowest width
        let built = Rect::from_pixels(550, 400).unwrap();
        assert_eq!(built.field_bits(), 15);
        assert_ne!(built, rect);
    }

    #[test]
    fn rect_rejects_32_bit_values() {
        assert!(matches!(
            Rect::new(i32::MIN, 0, 0, 0),
            Err(TypeError::OutOfRange { field: "rect x_min", .. })
        ));
        assert!(Rect::new(-(1 << 30), (1 << 30) - 1, 0, 0).is_ok());
    }

    #[test]
    fn zero_width_rect_prefix_is_rejected() {
        let err = Rect::read(&mut BitReader::swf(&[0x00])).unwrap_err();
        assert!(matches!(err, TypeError::ZeroBitWidth { field: "rect" }));
    }

    #[test]
    fn identity_matrix_layout() {
        let m = Matrix::identity();
        assert_eq!(m.encoded_len(), 2);
        let bytes = encode(|w| m.write(w).unwrap());
        // 0 0 00001 0 0 -> 9 bits
        assert_eq!(bytes, vec![0b0000_0010, 0b0000_0000]);
        assert_eq!(Matrix::read(&mut BitReader::swf(&bytes)).unwrap(), m);
    }

    #[test]
    fn matrix_with_all_parts() {
        let m = Matrix::translation(200, -40)
            .unwrap()
            .with_scale(0x1_0000, 0x8000)
            .unwrap()
            .with_rotate(-3, 7)
            .unwrap();
        let bytes = encode(|w| m.write(w).unwrap());
        assert_eq!(bytes.len(), m.encoded_len());
        assert_eq!(Matrix::read(&mut BitReader::swf(&bytes)).unwrap(), m);
    }

    #[test]
    fn wide_matrix_pairs_are_kept_until_replaced() {
        // no scale, no rotate, translate width 8 holding (1, -1)
        let bytes = [0b0001_0000, 0b0000_0011, 0b1111_1110];
        let m = Matrix::read(&mut BitReader::swf(&bytes)).unwrap();
        assert_eq!(m.translate(), (1, -1));
        assert_eq!(m.encoded_len(), 3);
        assert_eq!(encode(|w| m.write(w).unwrap()), bytes);

        let scaled = m.with_scale(2, 2).unwrap();
        let rebuilt = Matrix::translation(1, -1).unwrap().with_scale(2, 2).unwrap();
        assert_ne!(scaled, rebuilt);
        // the translate pair keeps its 8-bit width
        assert_eq!(scaled.encoded_len(), 5);
        assert_eq!(rebuilt.encoded_len(), 3);
    }

    #[test]
    fn color_alpha_follows_context() {
        let registries = Registries::standard();
        let opaque = Context::new(&registries, 8);
        let transparent = opaque.with_flags(ContextFlags::TRANSPARENT);
        let color = Color::rgba(1, 2, 3, 4);

        let rgb = encode(|w| color.write(w, &opaque));
        assert_eq!(rgb, vec![1, 2, 3]);
        let rgba = encode(|w| color.write(w, &transparent));
        assert_eq!(rgba, vec![1, 2, 3, 4]);

        let back = Color::read(&mut BitReader::swf(&rgb), &opaque).unwrap();
        assert_eq!(back, Color::rgb(1, 2, 3));
    }

    #[test]
    fn color_transform_with_alpha() {
        let registries = Registries::standard();
        let ctx = Context::new(&registries, 8).with_flags(ContextFlags::TRANSPARENT);
        let cx = ColorTransform::new(
            Some(Terms {
                red: 256,
                green: 128,
                blue: 0,
                alpha: 256,
            }),
            Some(Terms {
                red: -255,
                ..Terms::ZERO
            }),
        )
        .unwrap();
        let bytes = encode(|w| cx.write(w, &ctx).unwrap());
        assert_eq!(bytes.len(), cx.encoded_len(&ctx));
        assert_eq!(ColorTransform::read(&mut BitReader::swf(&bytes), &ctx).unwrap(), cx);
    }

    #[test]
    fn color_transform_terms_limited_to_15_bits() {
        let big = Terms {
            red: 20_000,
            ..Terms::ZERO
        };
        assert!(matches!(
            ColorTransform::new(None, Some(big)),
            Err(TypeError::OutOfRange { .. })
        ));
    }
}
