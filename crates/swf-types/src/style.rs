use swf_wire::{BitReader, BitWriter};

use crate::context::{Context, ContextFlags};
use crate::error::{TypeError, check_count, check_range};
use crate::geometry::{Color, Matrix};
use crate::record::{Prepared, Record, write_record};
use crate::registry::{Family, Registries, Registry};

/// Fill style type codes.
pub mod fill_code {
    pub const SOLID: u16 = 0x00;
    pub const LINEAR_GRADIENT: u16 = 0x10;
    pub const RADIAL_GRADIENT: u16 = 0x12;
    pub const REPEATING_BITMAP: u16 = 0x40;
    pub const CLIPPED_BITMAP: u16 = 0x41;
    pub const HARD_REPEATING_BITMAP: u16 = 0x42;
    pub const HARD_CLIPPED_BITMAP: u16 = 0x43;
}

/// Gradient spread mode (2 bits).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SpreadMode {
    #[default]
    Pad,
    Reflect,
    Repeat,
    Reserved,
}

impl SpreadMode {
    fn from_raw(raw: u32) -> Self {
        match raw & 0b11 {
            0 => Self::Pad,
            1 => Self::Reflect,
            2 => Self::Repeat,
            _ => Self::Reserved,
        }
    }

    fn raw(self) -> u32 {
        match self {
            Self::Pad => 0,
            Self::Reflect => 1,
            Self::Repeat => 2,
            Self::Reserved => 3,
        }
    }
}

/// Gradient color interpolation mode (2 bits).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Interpolation {
    #[default]
    Normal,
    Linear,
    Reserved(u8),
}

impl Interpolation {
    fn from_raw(raw: u32) -> Self {
        match raw & 0b11 {
            0 => Self::Normal,
            1 => Self::Linear,
            other => Self::Reserved(other as u8),
        }
    }

    fn raw(self) -> u32 {
        match self {
            Self::Normal => 0,
            Self::Linear => 1,
            Self::Reserved(v) => u32::from(v),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GradientStop {
    pub ratio: u8,
    pub color: Color,
}

/// Gradient definition: up to 15 color stops.
///
/// ```text
///  UB[2] spread │ UB[2] interpolation │ UB[4] count │ count × (u8 ratio, color)
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Gradient {
    spread: SpreadMode,
    interpolation: Interpolation,
    stops: Vec<GradientStop>,
}

impl Gradient {
    pub const MAX_STOPS: usize = 15;

    /// # Errors
    ///
    /// [`TypeError::TooMany`] for more than 15 stops,
    /// [`TypeError::OutOfRange`] for a reserved interpolation value above 3.
    pub fn new(
        spread: SpreadMode,
        interpolation: Interpolation,
        stops: Vec<GradientStop>,
    ) -> Result<Self, TypeError> {
        check_count("gradient stops", stops.len(), Self::MAX_STOPS)?;
        if let Interpolation::Reserved(v) = interpolation {
            check_range("gradient interpolation", i64::from(v), 2, 3)?;
        }
        Ok(Self {
            spread,
            interpolation,
            stops,
        })
    }

    #[must_use]
    pub fn spread(&self) -> SpreadMode {
        self.spread
    }

    #[must_use]
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    #[must_use]
    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    #[must_use]
    pub fn encoded_len(&self, ctx: &Context<'_>) -> usize {
        1 + self.stops.len() * (1 + Color::encoded_len(ctx))
    }

    /// # Errors
    ///
    /// Wire errors only.
    pub fn write(&self, w: &mut BitWriter, ctx: &Context<'_>) -> Result<(), TypeError> {
        w.write_ubits(self.spread.raw(), 2)?;
        w.write_ubits(self.interpolation.raw(), 2)?;
        w.write_ubits(self.stops.len() as u32, 4)?;
        for stop in &self.stops {
            w.write_u8(stop.ratio);
            stop.color.write(w, ctx);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Wire errors for truncated input.
    pub fn read(r: &mut BitReader<'_>, ctx: &Context<'_>) -> Result<Self, TypeError> {
        r.align_to_byte();
        let spread = SpreadMode::from_raw(r.read_ubits(2)?);
        let interpolation = Interpolation::from_raw(r.read_ubits(2)?);
        let count = r.read_ubits(4)?;
        let mut stops = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let ratio = r.read_u8()?;
            let color = Color::read(r, ctx)?;
            stops.push(GradientStop { ratio, color });
        }
        Ok(Self {
            spread,
            interpolation,
            stops,
        })
    }
}

/// Bitmap fill flavour: the low two bits of codes `0x40..=0x43`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BitmapFill {
    pub repeating: bool,
    pub smoothed: bool,
}

impl BitmapFill {
    fn code(self) -> u16 {
        fill_code::REPEATING_BITMAP | u16::from(!self.repeating) | u16::from(!self.smoothed) << 1
    }

    fn from_code(code: u16) -> Self {
        Self {
            repeating: code & 0b01 == 0,
            smoothed: code & 0b10 == 0,
        }
    }
}

/// A fill style entry of a shape's style table.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FillStyle {
    Solid(Color),
    LinearGradient { matrix: Matrix, gradient: Gradient },
    RadialGradient { matrix: Matrix, gradient: Gradient },
    Bitmap {
        fill: BitmapFill,
        bitmap_id: u16,
        matrix: Matrix,
    },
}

impl FillStyle {
    fn body_len(&self, ctx: &Context<'_>) -> usize {
        match self {
            Self::Solid(_) => Color::encoded_len(ctx),
            Self::LinearGradient { matrix, gradient } | Self::RadialGradient { matrix, gradient } => {
                matrix.encoded_len() + gradient.encoded_len(ctx)
            }
            Self::Bitmap { matrix, .. } => 2 + matrix.encoded_len(),
        }
    }

    fn read_solid(r: &mut BitReader<'_>, ctx: &Context<'_>) -> Result<Self, TypeError> {
        r.read_u8()?;
        Ok(Self::Solid(Color::read(r, ctx)?))
    }

    fn read_gradient(r: &mut BitReader<'_>, ctx: &Context<'_>) -> Result<Self, TypeError> {
        let code = u16::from(r.read_u8()?);
        let matrix = Matrix::read(r)?;
        let gradient = Gradient::read(r, ctx)?;
        Ok(if code == fill_code::RADIAL_GRADIENT {
            Self::RadialGradient { matrix, gradient }
        } else {
            Self::LinearGradient { matrix, gradient }
        })
    }

    fn read_bitmap(r: &mut BitReader<'_>, _ctx: &Context<'_>) -> Result<Self, TypeError> {
        let code = u16::from(r.read_u8()?);
        let bitmap_id = r.read_u16()?;
        let matrix = Matrix::read(r)?;
        Ok(Self::Bitmap {
            fill: BitmapFill::from_code(code),
            bitmap_id,
            matrix,
        })
    }
}

impl Family for FillStyle {
    const FAMILY: &'static str = "fill style";

    fn scan_code(r: &mut BitReader<'_>) -> Result<u16, TypeError> {
        r.align_to_byte();
        let start = r.pointer();
        let code = r.read_u8()?;
        r.set_pointer(start)?;
        Ok(u16::from(code))
    }

    fn fallback(code: u16, _r: &mut BitReader<'_>, _ctx: &Context<'_>) -> Result<Self, TypeError> {
        Err(TypeError::UnknownCode {
            family: Self::FAMILY,
            code,
        })
    }

    fn registry(registries: &Registries) -> &Registry<Self> {
        &registries.fill_styles
    }
}

impl Record for FillStyle {
    type Plan = ();

    fn decode(r: &mut BitReader<'_>, ctx: &Context<'_>) -> Result<Self, TypeError> {
        Self::decode_next(r, ctx)
    }

    fn prepare(&self, ctx: &Context<'_>) -> Result<Prepared<()>, TypeError> {
        Ok(Prepared::new(1 + self.body_len(ctx), ()))
    }

    fn encode(&self, _prepared: &Prepared<()>, w: &mut BitWriter, ctx: &Context<'_>) -> Result<(), TypeError> {
        w.write_u8(self.code() as u8);
        match self {
            Self::Solid(color) => color.write(w, ctx),
            Self::LinearGradient { matrix, gradient } | Self::RadialGradient { matrix, gradient } => {
                matrix.write(w)?;
                gradient.write(w, ctx)?;
            }
            Self::Bitmap {
                bitmap_id, matrix, ..
            } => {
                w.write_u16(*bitmap_id)?;
                matrix.write(w)?;
            }
        }
        Ok(())
    }

    fn code(&self) -> u16 {
        match self {
            Self::Solid(_) => fill_code::SOLID,
            Self::LinearGradient { .. } => fill_code::LINEAR_GRADIENT,
            Self::RadialGradient { .. } => fill_code::RADIAL_GRADIENT,
            Self::Bitmap { fill, .. } => fill.code(),
        }
    }
}

pub(crate) fn register_standard(registry: &mut Registry<FillStyle>) {
    registry.register(fill_code::SOLID, FillStyle::read_solid);
    registry.register(fill_code::LINEAR_GRADIENT, FillStyle::read_gradient);
    registry.register(fill_code::RADIAL_GRADIENT, FillStyle::read_gradient);
    for code in fill_code::REPEATING_BITMAP..=fill_code::HARD_CLIPPED_BITMAP {
        registry.register(code, FillStyle::read_bitmap);
    }
}

/// A line style entry: width in twips and a color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LineStyle {
    pub width: u16,
    pub color: Color,
}

impl LineStyle {
    #[must_use]
    pub fn encoded_len(ctx: &Context<'_>) -> usize {
        2 + Color::encoded_len(ctx)
    }
}

fn count_len(count: usize, ctx: &Context<'_>) -> usize {
    if ctx.has(ContextFlags::EXTENDED_STYLES) && count >= 0xFF { 3 } else { 1 }
}

fn write_count(w: &mut BitWriter, field: &'static str, count: usize, ctx: &Context<'_>) -> Result<(), TypeError> {
    if ctx.has(ContextFlags::EXTENDED_STYLES) {
        check_count(field, count, usize::from(u16::MAX))?;
        if count >= 0xFF {
            w.write_u8(0xFF);
            w.write_u16(count as u16)?;
            return Ok(());
        }
    } else {
        check_count(field, count, 0xFF)?;
    }
    w.write_u8(count as u8);
    Ok(())
}

fn read_count(r: &mut BitReader<'_>, ctx: &Context<'_>) -> Result<usize, TypeError> {
    let count = r.read_u8()?;
    if count == 0xFF && ctx.has(ContextFlags::EXTENDED_STYLES) {
        return Ok(usize::from(r.read_u16()?));
    }
    Ok(usize::from(count))
}

/// Fill and line style tables, as they appear at the start of a shape and
/// inside a style change record that introduces new styles.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Styles {
    pub fills: Vec<FillStyle>,
    pub lines: Vec<LineStyle>,
}

impl Styles {
    /// # Errors
    ///
    /// Errors from sizing the individual fill styles.
    pub fn encoded_len(&self, ctx: &Context<'_>) -> Result<usize, TypeError> {
        let mut len = count_len(self.fills.len(), ctx) + count_len(self.lines.len(), ctx);
        for fill in &self.fills {
            len += fill.prepare(ctx)?.size;
        }
        len += self.lines.len() * LineStyle::encoded_len(ctx);
        Ok(len)
    }

    /// # Errors
    ///
    /// [`TypeError::TooMany`] when a table exceeds its count prefix.
    pub fn write(&self, w: &mut BitWriter, ctx: &Context<'_>) -> Result<(), TypeError> {
        write_count(w, "fill styles", self.fills.len(), ctx)?;
        for fill in &self.fills {
            write_record(fill, w, ctx)?;
        }
        write_count(w, "line styles", self.lines.len(), ctx)?;
        for line in &self.lines {
            w.write_u16(line.width)?;
            line.color.write(w, ctx);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Wire errors, or [`TypeError::UnknownCode`] for an unknown fill type.
    pub fn read(r: &mut BitReader<'_>, ctx: &Context<'_>) -> Result<Self, TypeError> {
        let fill_count = read_count(r, ctx)?;
        let mut fills = Vec::with_capacity(fill_count.min(256));
        for _ in 0..fill_count {
            fills.push(FillStyle::decode(r, ctx)?);
        }
        let line_count = read_count(r, ctx)?;
        let mut lines = Vec::with_capacity(line_count.min(256));
        for _ in 0..line_count {
            let width = r.read_u16()?;
            let color = Color::read(r, ctx)?;
            lines.push(LineStyle { width, color });
        }
        Ok(Self { fills, lines })
    }
}
