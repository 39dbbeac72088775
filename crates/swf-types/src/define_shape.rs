use swf_wire::record_header::TagHeader;
use swf_wire::{BitReader, BitWriter, RecordSpan};

use crate::context::{Context, ContextFlags};
use crate::error::TypeError;
use crate::geometry::Rect;
use crate::shape::ShapeWithStyle;
use crate::tag::{BodyPlan, TagBody};
use crate::tag_code::TagCode;

/// Which of the three shape definition tags carries the shape.
///
/// ```text
/// ┌─────────┬──────┬─────────────────┬─────────────┐
/// │ Version │ Code │ Style counts    │ Colors      │
/// ├─────────┼──────┼─────────────────┼─────────────┤
/// │ One     │ 2    │ u8              │ RGB         │
/// │ Two     │ 22   │ u8 or 0xFF+u16  │ RGB         │
/// │ Three   │ 32   │ u8 or 0xFF+u16  │ RGBA        │
/// └─────────┴──────┴─────────────────┴─────────────┘
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ShapeVersion {
    #[default]
    One,
    Two,
    Three,
}

impl ShapeVersion {
    #[must_use]
    pub fn tag_code(self) -> TagCode {
        match self {
            Self::One => TagCode::DefineShape,
            Self::Two => TagCode::DefineShape2,
            Self::Three => TagCode::DefineShape3,
        }
    }

    #[must_use]
    pub fn from_tag_code(code: TagCode) -> Option<Self> {
        match code {
            TagCode::DefineShape => Some(Self::One),
            TagCode::DefineShape2 => Some(Self::Two),
            TagCode::DefineShape3 => Some(Self::Three),
            _ => None,
        }
    }

    /// Context the shape body is coded under.
    fn scope<'r>(self, ctx: &Context<'r>) -> Context<'r> {
        match self {
            Self::One => ctx.without_flags(ContextFlags::EXTENDED_STYLES.union(ContextFlags::TRANSPARENT)),
            Self::Two => ctx
                .with_flags(ContextFlags::EXTENDED_STYLES)
                .without_flags(ContextFlags::TRANSPARENT),
            Self::Three => ctx.with_flags(ContextFlags::EXTENDED_STYLES.union(ContextFlags::TRANSPARENT)),
        }
    }
}

/// A shape definition: identifier, bounding box and the shape itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefineShape {
    pub version: ShapeVersion,
    pub id: u16,
    pub bounds: Rect,
    pub shape: ShapeWithStyle,
    /// Whether a short body was framed with a long header.
    pub long_header: bool,
}

impl TagBody for DefineShape {
    fn tag_code(&self) -> TagCode {
        self.version.tag_code()
    }

    fn plan(&self, ctx: &Context<'_>) -> Result<(usize, BodyPlan), TypeError> {
        let plan = self.shape.plan(&self.version.scope(ctx))?;
        Ok((2 + self.bounds.encoded_len() + plan.size(), BodyPlan::Shape(plan)))
    }

    fn write_body(&self, plan: &BodyPlan, w: &mut BitWriter, ctx: &Context<'_>) -> Result<(), TypeError> {
        let BodyPlan::Shape(plan) = plan else {
            return Err(TypeError::PlanMismatch {
                code: self.tag_code().wire_id(),
            });
        };
        w.write_u16(self.id)?;
        self.bounds.write(w)?;
        self.shape.write(plan, w, &self.version.scope(ctx))
    }

    fn read_body(
        header: &TagHeader,
        _span: &RecordSpan,
        r: &mut BitReader<'_>,
        ctx: &Context<'_>,
    ) -> Result<Self, TypeError> {
        let version = ShapeVersion::from_tag_code(TagCode::from_wire_id(header.code)).ok_or(
            TypeError::UnknownCode {
                family: "shape version",
                code: header.code,
            },
        )?;
        let id = r.read_u16()?;
        let bounds = Rect::read(r)?;
        let shape = ShapeWithStyle::read(r, &version.scope(ctx))?;
        r.align_to_byte();
        Ok(Self {
            version,
            id,
            bounds,
            shape,
            long_header: header.is_long_by_choice(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Color;
    use crate::record::{Record, write_record};
    use crate::registry::Registries;
    use crate::shape::{ShapeRecord, StraightEdge, StyleChange};
    use crate::style::{FillStyle, LineStyle, Styles};
    use crate::tag::Tag;

    fn square(version: ShapeVersion) -> DefineShape {
        let mut records = vec![ShapeRecord::StyleChange(StyleChange {
            move_to: Some((0, 0)),
            fill_style1: Some(1),
            line_style: Some(1),
            ..StyleChange::default()
        })];
        for (dx, dy) in [(200, 0), (0, 200), (-200, 0), (0, -200)] {
            records.push(ShapeRecord::StraightEdge(StraightEdge::new(dx, dy).unwrap()));
        }
        DefineShape {
            version,
            id: 1,
            bounds: Rect::new(0, 200, 0, 200).unwrap(),
            shape: ShapeWithStyle {
                styles: Styles {
                    fills: vec![FillStyle::Solid(Color::rgba(0, 128, 255, 100))],
                    lines: vec![LineStyle {
                        width: 20,
                        color: Color::rgba(0, 0, 0, 50),
                    }],
                },
                records,
                index_bits: None,
            },
            long_header: false,
        }
    }

    fn roundtrip(shape: DefineShape) -> DefineShape {
        let registries = Registries::standard();
        let ctx = Context::new(&registries, 8);
        let tag = Tag::DefineShape(shape);
        let mut w = BitWriter::swf();
        write_record(&tag, &mut w, &ctx).unwrap();
        let bytes = w.into_bytes();
        match Tag::decode(&mut BitReader::swf(&bytes), &ctx).unwrap() {
            Tag::DefineShape(decoded) => decoded,
            other => panic!("expected shape, got {other:?}"),
        }
    }

    #[test]
    fn shape3_keeps_alpha() {
        let shape = square(ShapeVersion::Three);
        assert_eq!(roundtrip(shape.clone()), shape);
    }

    #[test]
    fn shape1_drops_alpha() {
        let decoded = roundtrip(square(ShapeVersion::One));
        assert_eq!(decoded.version, ShapeVersion::One);
        assert_eq!(
            decoded.shape.styles.fills[0],
            FillStyle::Solid(Color::rgb(0, 128, 255))
        );
    }

    #[test]
    fn version_picks_tag_code() {
        assert_eq!(Tag::DefineShape(square(ShapeVersion::Two)).code(), 22);
        assert_eq!(Tag::DefineShape(square(ShapeVersion::Three)).code(), 32);
    }
}
