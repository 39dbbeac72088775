//! Display list tags: stage color, object placement and removal, frame
//! labels.

use swf_wire::record_header::TagHeader;
use swf_wire::{BitReader, BitWriter, RecordSpan};

use crate::context::{Context, ContextFlags};
use crate::error::TypeError;
use crate::geometry::{Color, ColorTransform, Matrix};
use crate::tag::{BodyPlan, TagBody};
use crate::tag_code::TagCode;

/// Stage background color. Always stored as RGB.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SetBackgroundColor {
    pub color: Color,
    /// Whether a short body was framed with a long header.
    pub long_header: bool,
}

impl TagBody for SetBackgroundColor {
    fn tag_code(&self) -> TagCode {
        TagCode::SetBackgroundColor
    }

    fn plan(&self, _ctx: &Context<'_>) -> Result<(usize, BodyPlan), TypeError> {
        Ok((3, BodyPlan::Unit))
    }

    fn write_body(&self, _plan: &BodyPlan, w: &mut BitWriter, ctx: &Context<'_>) -> Result<(), TypeError> {
        self.color.write(w, &ctx.without_flags(ContextFlags::TRANSPARENT));
        Ok(())
    }

    fn read_body(
        header: &TagHeader,
        _span: &RecordSpan,
        r: &mut BitReader<'_>,
        ctx: &Context<'_>,
    ) -> Result<Self, TypeError> {
        Ok(Self {
            color: Color::read(r, &ctx.without_flags(ContextFlags::TRANSPARENT))?,
            long_header: header.is_long_by_choice(),
        })
    }
}

const HAS_CLIP_ACTIONS: u8 = 0x80;
const HAS_CLIP_DEPTH: u8 = 0x40;
const HAS_NAME: u8 = 0x20;
const HAS_RATIO: u8 = 0x10;
const HAS_COLOR_TRANSFORM: u8 = 0x08;
const HAS_MATRIX: u8 = 0x04;
const HAS_CHARACTER: u8 = 0x02;
const IS_MOVE: u8 = 0x01;

/// Places a character on the display list, or modifies the entry already
/// at `depth` when `is_move` is set.
///
/// ```text
/// flags u8 │ depth u16 │ [character u16] │ [matrix] │ [cxform, alpha]
///          │ [ratio u16] │ [name string] │ [clip depth u16] │ [clip actions]
/// ```
///
/// Each optional field is present when its flag bit is set. Clip actions
/// run to the end of the tag and are kept as raw bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlaceObject2 {
    pub depth: u16,
    pub is_move: bool,
    pub character_id: Option<u16>,
    pub matrix: Option<Matrix>,
    pub color_transform: Option<ColorTransform>,
    pub ratio: Option<u16>,
    pub name: Option<String>,
    pub clip_depth: Option<u16>,
    pub clip_actions: Option<Vec<u8>>,
    /// Whether a short body was framed with a long header.
    pub long_header: bool,
}

impl PlaceObject2 {
    fn flags(&self) -> u8 {
        let mut flags = 0;
        for (present, bit) in [
            (self.clip_actions.is_some(), HAS_CLIP_ACTIONS),
            (self.clip_depth.is_some(), HAS_CLIP_DEPTH),
            (self.name.is_some(), HAS_NAME),
            (self.ratio.is_some(), HAS_RATIO),
            (self.color_transform.is_some(), HAS_COLOR_TRANSFORM),
            (self.matrix.is_some(), HAS_MATRIX),
            (self.character_id.is_some(), HAS_CHARACTER),
            (self.is_move, IS_MOVE),
        ] {
            if present {
                flags |= bit;
            }
        }
        flags
    }
}

impl TagBody for PlaceObject2 {
    fn tag_code(&self) -> TagCode {
        TagCode::PlaceObject2
    }

    fn plan(&self, ctx: &Context<'_>) -> Result<(usize, BodyPlan), TypeError> {
        let cx = ctx.with_flags(ContextFlags::TRANSPARENT);
        let mut len = 3;
        if self.character_id.is_some() {
            len += 2;
        }
        if let Some(matrix) = &self.matrix {
            len += matrix.encoded_len();
        }
        if let Some(cxform) = &self.color_transform {
            len += cxform.encoded_len(&cx);
        }
        if self.ratio.is_some() {
            len += 2;
        }
        if let Some(name) = &self.name {
            len += BitWriter::string_len(ctx.text_encoding(), name)?;
        }
        if self.clip_depth.is_some() {
            len += 2;
        }
        if let Some(actions) = &self.clip_actions {
            len += actions.len();
        }
        Ok((len, BodyPlan::Unit))
    }

    fn write_body(&self, _plan: &BodyPlan, w: &mut BitWriter, ctx: &Context<'_>) -> Result<(), TypeError> {
        w.write_u8(self.flags());
        w.write_u16(self.depth)?;
        if let Some(id) = self.character_id {
            w.write_u16(id)?;
        }
        if let Some(matrix) = &self.matrix {
            matrix.write(w)?;
        }
        if let Some(cxform) = &self.color_transform {
            cxform.write(w, &ctx.with_flags(ContextFlags::TRANSPARENT))?;
        }
        if let Some(ratio) = self.ratio {
            w.write_u16(ratio)?;
        }
        if let Some(name) = &self.name {
            w.write_string(name)?;
        }
        if let Some(depth) = self.clip_depth {
            w.write_u16(depth)?;
        }
        if let Some(actions) = &self.clip_actions {
            w.write_bytes(actions);
        }
        Ok(())
    }

    fn read_body(
        header: &TagHeader,
        span: &RecordSpan,
        r: &mut BitReader<'_>,
        ctx: &Context<'_>,
    ) -> Result<Self, TypeError> {
        let flags = r.read_u8()?;
        let has = |bit: u8| flags & bit != 0;
        let depth = r.read_u16()?;
        let character_id = if has(HAS_CHARACTER) { Some(r.read_u16()?) } else { None };
        let matrix = if has(HAS_MATRIX) { Some(Matrix::read(r)?) } else { None };
        let color_transform = if has(HAS_COLOR_TRANSFORM) {
            Some(ColorTransform::read(r, &ctx.with_flags(ContextFlags::TRANSPARENT))?)
        } else {
            None
        };
        let ratio = if has(HAS_RATIO) { Some(r.read_u16()?) } else { None };
        let name = if has(HAS_NAME) { Some(r.read_string()?) } else { None };
        let clip_depth = if has(HAS_CLIP_DEPTH) { Some(r.read_u16()?) } else { None };
        let clip_actions = if has(HAS_CLIP_ACTIONS) {
            Some(r.read_to_end_of(span)?.to_vec())
        } else {
            None
        };
        Ok(Self {
            depth,
            is_move: has(IS_MOVE),
            character_id,
            matrix,
            color_transform,
            ratio,
            name,
            clip_depth,
            clip_actions,
            long_header: header.is_long_by_choice(),
        })
    }
}

/// Removes whatever sits at `depth`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RemoveObject2 {
    pub depth: u16,
    /// Whether a short body was framed with a long header.
    pub long_header: bool,
}

impl TagBody for RemoveObject2 {
    fn tag_code(&self) -> TagCode {
        TagCode::RemoveObject2
    }

    fn plan(&self, _ctx: &Context<'_>) -> Result<(usize, BodyPlan), TypeError> {
        Ok((2, BodyPlan::Unit))
    }

    fn write_body(&self, _plan: &BodyPlan, w: &mut BitWriter, _ctx: &Context<'_>) -> Result<(), TypeError> {
        Ok(w.write_u16(self.depth)?)
    }

    fn read_body(
        header: &TagHeader,
        _span: &RecordSpan,
        r: &mut BitReader<'_>,
        _ctx: &Context<'_>,
    ) -> Result<Self, TypeError> {
        Ok(Self {
            depth: r.read_u16()?,
            long_header: header.is_long_by_choice(),
        })
    }
}

/// Names the current frame. A named anchor is marked by one trailing
/// byte set to 1.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FrameLabel {
    pub name: String,
    pub anchor: bool,
    /// Whether a short body was framed with a long header.
    pub long_header: bool,
}

impl TagBody for FrameLabel {
    fn tag_code(&self) -> TagCode {
        TagCode::FrameLabel
    }

    fn plan(&self, ctx: &Context<'_>) -> Result<(usize, BodyPlan), TypeError> {
        let len = BitWriter::string_len(ctx.text_encoding(), &self.name)?;
        Ok((len + usize::from(self.anchor), BodyPlan::Unit))
    }

    fn write_body(&self, _plan: &BodyPlan, w: &mut BitWriter, _ctx: &Context<'_>) -> Result<(), TypeError> {
        w.write_string(&self.name)?;
        if self.anchor {
            w.write_u8(1);
        }
        Ok(())
    }

    fn read_body(
        header: &TagHeader,
        span: &RecordSpan,
        r: &mut BitReader<'_>,
        _ctx: &Context<'_>,
    ) -> Result<Self, TypeError> {
        let name = r.read_string()?;
        let anchor = if r.pointer() < span.end() {
            r.read_u8()? == 1
        } else {
            false
        };
        Ok(Self {
            name,
            anchor,
            long_header: header.is_long_by_choice(),
        })
    }
}
