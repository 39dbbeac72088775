use swf_wire::record_header::TagHeader;
use swf_wire::{BitReader, BitWriter, RecordSpan};

use crate::action::{ActionBlock, ActionPlans};
use crate::context::Context;
use crate::error::TypeError;
use crate::record::Prepared;
use crate::tag::{BodyPlan, TagBody};
use crate::tag_code::TagCode;

fn actions_plan(plan: &BodyPlan, code: TagCode) -> Result<&Prepared<ActionPlans>, TypeError> {
    match plan {
        BodyPlan::Actions(prepared) => Ok(prepared),
        _ => Err(TypeError::PlanMismatch { code: code.wire_id() }),
    }
}

/// Actions run when the frame is reached.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DoAction {
    pub actions: ActionBlock,
    /// Whether a short body was framed with a long header.
    pub long_header: bool,
}

impl TagBody for DoAction {
    fn tag_code(&self) -> TagCode {
        TagCode::DoAction
    }

    fn plan(&self, ctx: &Context<'_>) -> Result<(usize, BodyPlan), TypeError> {
        let prepared = self.actions.prepare(ctx)?;
        Ok((prepared.size, BodyPlan::Actions(prepared)))
    }

    fn write_body(&self, plan: &BodyPlan, w: &mut BitWriter, ctx: &Context<'_>) -> Result<(), TypeError> {
        self.actions.write(actions_plan(plan, TagCode::DoAction)?, w, ctx)
    }

    fn read_body(
        header: &TagHeader,
        span: &RecordSpan,
        r: &mut BitReader<'_>,
        ctx: &Context<'_>,
    ) -> Result<Self, TypeError> {
        Ok(Self {
            actions: ActionBlock::read(r, span, ctx)?,
            long_header: header.is_long_by_choice(),
        })
    }
}

/// Actions run once, before the first use of sprite `sprite_id`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DoInitAction {
    pub sprite_id: u16,
    pub actions: ActionBlock,
    /// Whether a short body was framed with a long header.
    pub long_header: bool,
}

impl TagBody for DoInitAction {
    fn tag_code(&self) -> TagCode {
        TagCode::DoInitAction
    }

    fn plan(&self, ctx: &Context<'_>) -> Result<(usize, BodyPlan), TypeError> {
        let prepared = self.actions.prepare(ctx)?;
        Ok((2 + prepared.size, BodyPlan::Actions(prepared)))
    }

    fn write_body(&self, plan: &BodyPlan, w: &mut BitWriter, ctx: &Context<'_>) -> Result<(), TypeError> {
        let prepared = actions_plan(plan, TagCode::DoInitAction)?;
        w.write_u16(self.sprite_id)?;
        self.actions.write(prepared, w, ctx)
    }

    fn read_body(
        header: &TagHeader,
        span: &RecordSpan,
        r: &mut BitReader<'_>,
        ctx: &Context<'_>,
    ) -> Result<Self, TypeError> {
        let sprite_id = r.read_u16()?;
        Ok(Self {
            sprite_id,
            actions: ActionBlock::read(r, span, ctx)?,
            long_header: header.is_long_by_choice(),
        })
    }
}

/// Player limits for script execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScriptLimits {
    pub max_recursion_depth: u16,
    pub timeout_seconds: u16,
    /// Whether a short body was framed with a long header.
    pub long_header: bool,
}

impl Default for ScriptLimits {
    fn default() -> Self {
        Self {
            max_recursion_depth: 256,
            timeout_seconds: 15,
            long_header: false,
        }
    }
}

impl TagBody for ScriptLimits {
    fn tag_code(&self) -> TagCode {
        TagCode::ScriptLimits
    }

    fn plan(&self, _ctx: &Context<'_>) -> Result<(usize, BodyPlan), TypeError> {
        Ok((4, BodyPlan::Unit))
    }

    fn write_body(&self, _plan: &BodyPlan, w: &mut BitWriter, _ctx: &Context<'_>) -> Result<(), TypeError> {
        w.write_u16(self.max_recursion_depth)?;
        w.write_u16(self.timeout_seconds)?;
        Ok(())
    }

    fn read_body(
        header: &TagHeader,
        _span: &RecordSpan,
        r: &mut BitReader<'_>,
        _ctx: &Context<'_>,
    ) -> Result<Self, TypeError> {
        Ok(Self {
            max_recursion_depth: r.read_u16()?,
            timeout_seconds: r.read_u16()?,
            long_header: header.is_long_by_choice(),
        })
    }
}
