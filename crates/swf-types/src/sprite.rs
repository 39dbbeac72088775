use swf_wire::record_header::TagHeader;
use swf_wire::{BitReader, BitWriter, RecordSpan, WireError};
use tracing::warn;

use crate::context::Context;
use crate::error::{TypeError, check_count};
use crate::record::{Record, prepare_all, total_size, write_all};
use crate::tag::{BodyPlan, Tag, TagBody};
use crate::tag_code::TagCode;

/// A movie clip: an identifier and a nested, sentinel-terminated tag
/// stream.
///
/// ```text
/// id u16 │ frame count u16 │ tags … │ u16 0
/// ```
///
/// The frame count is not stored: it is the number of `ShowFrame` tags
/// and is recomputed on encode.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DefineSprite {
    pub id: u16,
    pub tags: Vec<Tag>,
    /// Whether a short body was framed with a long header.
    pub long_header: bool,
}

impl DefineSprite {
    #[must_use]
    pub fn frame_count(&self) -> usize {
        count_frames(&self.tags)
    }
}

/// Counts `ShowFrame` tags, opaque ones included.
pub(crate) fn count_frames(tags: &[Tag]) -> usize {
    tags.iter()
        .filter(|t| t.tag_code() == TagCode::ShowFrame)
        .count()
}

impl TagBody for DefineSprite {
    fn tag_code(&self) -> TagCode {
        TagCode::DefineSprite
    }

    fn plan(&self, ctx: &Context<'_>) -> Result<(usize, BodyPlan), TypeError> {
        check_count("sprite frames", self.frame_count(), usize::from(u16::MAX))?;
        let plans = prepare_all(&self.tags, &ctx.nested()?)?;
        Ok((4 + total_size(&plans) + 2, BodyPlan::Sprite(plans)))
    }

    fn write_body(&self, plan: &BodyPlan, w: &mut BitWriter, ctx: &Context<'_>) -> Result<(), TypeError> {
        let BodyPlan::Sprite(plans) = plan else {
            return Err(TypeError::PlanMismatch {
                code: TagCode::DefineSprite.wire_id(),
            });
        };
        w.write_u16(self.id)?;
        w.write_u16(self.frame_count() as u16)?;
        write_all(&self.tags, plans, w, &ctx.nested()?)?;
        w.write_u16(0)?;
        Ok(())
    }

    fn read_body(
        header: &TagHeader,
        span: &RecordSpan,
        r: &mut BitReader<'_>,
        ctx: &Context<'_>,
    ) -> Result<Self, TypeError> {
        let inner = ctx.nested()?;
        let id = r.read_u16()?;
        let declared_frames = r.read_u16()?;
        let mut tags = Vec::new();
        loop {
            let available = span.end().saturating_sub(r.pointer());
            if available < 16 {
                return Err(WireError::OutOfBounds {
                    offset: r.pointer(),
                    needed: 16,
                    available,
                }
                .into());
            }
            if TagHeader::scan_code(r)? == 0 {
                r.read_u16()?;
                break;
            }
            tags.push(Tag::decode(r, &inner)?);
        }
        let frames = count_frames(&tags);
        if frames != usize::from(declared_frames) {
            warn!(id, declared_frames, frames, "sprite frame count disagrees with its ShowFrame tags");
        }
        Ok(Self {
            id,
            tags,
            long_header: header.is_long_by_choice(),
        })
    }
}
