//! Structural action records.
//!
//! Actions are decoded to the level of their operands and no further:
//! nothing here interprets or executes them.

use swf_wire::record_header::ActionHeader;
use swf_wire::{BitReader, BitWriter, RecordSpan};
use tracing::trace;

use crate::context::Context;
use crate::error::{TypeError, check_count, check_range};
use crate::record::{Prepared, Record, total_size, write_prepared};
use crate::registry::{Family, Registries, Registry};

/// Action codes with a typed representation.
pub mod action_code {
    pub const END: u8 = 0x00;
    pub const GOTO_FRAME: u8 = 0x81;
    pub const GET_URL: u8 = 0x83;
    pub const CONSTANT_POOL: u8 = 0x88;
    pub const SET_TARGET: u8 = 0x8B;
    pub const PUSH: u8 = 0x96;
    pub const JUMP: u8 = 0x99;
    pub const IF: u8 = 0x9D;
}

/// One operand of a `Push` action.
#[derive(Clone, Debug, PartialEq)]
pub enum PushValue {
    String(String),
    Float(f32),
    Null,
    Undefined,
    Register(u8),
    Boolean(bool),
    Double(f64),
    Integer(i32),
    Constant8(u8),
    Constant16(u16),
}

impl PushValue {
    fn type_id(&self) -> u8 {
        match self {
            Self::String(_) => 0,
            Self::Float(_) => 1,
            Self::Null => 2,
            Self::Undefined => 3,
            Self::Register(_) => 4,
            Self::Boolean(_) => 5,
            Self::Double(_) => 6,
            Self::Integer(_) => 7,
            Self::Constant8(_) => 8,
            Self::Constant16(_) => 9,
        }
    }

    fn encoded_len(&self, ctx: &Context<'_>) -> Result<usize, TypeError> {
        let payload = match self {
            Self::String(s) => BitWriter::string_len(ctx.text_encoding(), s)?,
            Self::Null | Self::Undefined => 0,
            Self::Register(_) | Self::Boolean(_) | Self::Constant8(_) => 1,
            Self::Constant16(_) => 2,
            Self::Float(_) | Self::Integer(_) => 4,
            Self::Double(_) => 8,
        };
        Ok(1 + payload)
    }

    fn write(&self, w: &mut BitWriter) -> Result<(), TypeError> {
        w.write_u8(self.type_id());
        match self {
            Self::String(s) => w.write_string(s)?,
            Self::Float(v) => w.write_f32(*v)?,
            Self::Null | Self::Undefined => {}
            Self::Register(v) | Self::Constant8(v) => w.write_u8(*v),
            Self::Boolean(v) => w.write_u8(u8::from(*v)),
            Self::Double(v) => {
                // two little-endian words, high word first
                let bits = v.to_bits();
                w.write_u32((bits >> 32) as u32)?;
                w.write_u32(bits as u32)?;
            }
            Self::Integer(v) => w.write_i32(*v)?,
            Self::Constant16(v) => w.write_u16(*v)?,
        }
        Ok(())
    }

    fn read(r: &mut BitReader<'_>) -> Result<Self, TypeError> {
        let type_id = r.read_u8()?;
        Ok(match type_id {
            0 => Self::String(r.read_string()?),
            1 => Self::Float(r.read_f32()?),
            2 => Self::Null,
            3 => Self::Undefined,
            4 => Self::Register(r.read_u8()?),
            5 => Self::Boolean(r.read_u8()? != 0),
            6 => {
                let high = u64::from(r.read_u32()?);
                let low = u64::from(r.read_u32()?);
                Self::Double(f64::from_bits(high << 32 | low))
            }
            7 => Self::Integer(r.read_i32()?),
            8 => Self::Constant8(r.read_u8()?),
            9 => Self::Constant16(r.read_u16()?),
            other => {
                return Err(TypeError::UnknownCode {
                    family: "push value",
                    code: u16::from(other),
                });
            }
        })
    }
}

/// An action record.
///
/// Codes below `0x80` carry no operands and decode to [`Action::Simple`].
/// Codes from `0x80` up carry a length-prefixed body; those without a
/// typed form are kept verbatim in [`Action::Opaque`].
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Simple(u8),
    GotoFrame(u16),
    GetUrl { url: String, target: String },
    ConstantPool(Vec<String>),
    SetTarget(String),
    Push(Vec<PushValue>),
    Jump(i16),
    If(i16),
    Opaque { code: u8, body: Vec<u8> },
}

impl Action {
    fn action_code(&self) -> u8 {
        match self {
            Self::Simple(code) | Self::Opaque { code, .. } => *code,
            Self::GotoFrame(_) => action_code::GOTO_FRAME,
            Self::GetUrl { .. } => action_code::GET_URL,
            Self::ConstantPool(_) => action_code::CONSTANT_POOL,
            Self::SetTarget(_) => action_code::SET_TARGET,
            Self::Push(_) => action_code::PUSH,
            Self::Jump(_) => action_code::JUMP,
            Self::If(_) => action_code::IF,
        }
    }

    fn body_len(&self, ctx: &Context<'_>) -> Result<usize, TypeError> {
        let encoding = ctx.text_encoding();
        Ok(match self {
            Self::Simple(_) => 0,
            Self::GotoFrame(_) | Self::Jump(_) | Self::If(_) => 2,
            Self::GetUrl { url, target } => {
                BitWriter::string_len(encoding, url)? + BitWriter::string_len(encoding, target)?
            }
            Self::ConstantPool(strings) => {
                check_count("constant pool", strings.len(), usize::from(u16::MAX))?;
                let mut len = 2;
                for s in strings {
                    len += BitWriter::string_len(encoding, s)?;
                }
                len
            }
            Self::SetTarget(target) => BitWriter::string_len(encoding, target)?,
            Self::Push(values) => {
                let mut len = 0;
                for value in values {
                    len += value.encoded_len(ctx)?;
                }
                len
            }
            Self::Opaque { body, .. } => body.len(),
        })
    }

    fn write_body(&self, w: &mut BitWriter) -> Result<(), TypeError> {
        match self {
            Self::Simple(_) => {}
            Self::GotoFrame(frame) => w.write_u16(*frame)?,
            Self::GetUrl { url, target } => {
                w.write_string(url)?;
                w.write_string(target)?;
            }
            Self::ConstantPool(strings) => {
                w.write_u16(strings.len() as u16)?;
                for s in strings {
                    w.write_string(s)?;
                }
            }
            Self::SetTarget(target) => w.write_string(target)?,
            Self::Push(values) => {
                for value in values {
                    value.write(w)?;
                }
            }
            Self::Jump(offset) | Self::If(offset) => w.write_i16(*offset)?,
            Self::Opaque { body, .. } => w.write_bytes(body),
        }
        Ok(())
    }

    /// Read a header, hand the body to `body`, then check the body ended
    /// where the header said it would.
    fn framed(
        r: &mut BitReader<'_>,
        body: impl FnOnce(&mut BitReader<'_>, &RecordSpan) -> Result<Self, TypeError>,
    ) -> Result<Self, TypeError> {
        r.align_to_byte();
        let mark = r.mark();
        let header = ActionHeader::read_from(r)?;
        let span = r.span(Self::FAMILY, u16::from(header.code), mark, u32::from(header.length));
        trace!(code = header.code, length = header.length, offset = mark.bit_offset() / 8, "action");
        let action = body(r, &span)?;
        r.finish(&span)?;
        Ok(action)
    }

    fn read_simple(r: &mut BitReader<'_>, _ctx: &Context<'_>) -> Result<Self, TypeError> {
        let header = ActionHeader::read_from(r)?;
        Ok(Self::Simple(header.code))
    }

    fn read_goto_frame(r: &mut BitReader<'_>, _ctx: &Context<'_>) -> Result<Self, TypeError> {
        Self::framed(r, |r, _| Ok(Self::GotoFrame(r.read_u16()?)))
    }

    fn read_get_url(r: &mut BitReader<'_>, _ctx: &Context<'_>) -> Result<Self, TypeError> {
        Self::framed(r, |r, _| {
            let url = r.read_string()?;
            let target = r.read_string()?;
            Ok(Self::GetUrl { url, target })
        })
    }

    fn read_constant_pool(r: &mut BitReader<'_>, _ctx: &Context<'_>) -> Result<Self, TypeError> {
        Self::framed(r, |r, _| {
            let count = r.read_u16()?;
            let mut strings = Vec::with_capacity(usize::from(count).min(1024));
            for _ in 0..count {
                strings.push(r.read_string()?);
            }
            Ok(Self::ConstantPool(strings))
        })
    }

    fn read_set_target(r: &mut BitReader<'_>, _ctx: &Context<'_>) -> Result<Self, TypeError> {
        Self::framed(r, |r, _| Ok(Self::SetTarget(r.read_string()?)))
    }

    fn read_push(r: &mut BitReader<'_>, _ctx: &Context<'_>) -> Result<Self, TypeError> {
        Self::framed(r, |r, span| {
            let mut values = Vec::new();
            while r.pointer() < span.end() {
                values.push(PushValue::read(r)?);
            }
            Ok(Self::Push(values))
        })
    }

    fn read_jump(r: &mut BitReader<'_>, _ctx: &Context<'_>) -> Result<Self, TypeError> {
        Self::framed(r, |r, _| Ok(Self::Jump(r.read_i16()?)))
    }

    fn read_if(r: &mut BitReader<'_>, _ctx: &Context<'_>) -> Result<Self, TypeError> {
        Self::framed(r, |r, _| Ok(Self::If(r.read_i16()?)))
    }

    fn read_opaque(r: &mut BitReader<'_>) -> Result<Self, TypeError> {
        Self::framed(r, |r, span| {
            Ok(Self::Opaque {
                code: span.code() as u8,
                body: r.read_to_end_of(span)?.to_vec(),
            })
        })
    }
}

impl Family for Action {
    const FAMILY: &'static str = "action";

    fn scan_code(r: &mut BitReader<'_>) -> Result<u16, TypeError> {
        Ok(u16::from(ActionHeader::scan_code(r)?))
    }

    fn fallback(code: u16, r: &mut BitReader<'_>, ctx: &Context<'_>) -> Result<Self, TypeError> {
        if code < u16::from(ActionHeader::FIRST_LONG_CODE) {
            Self::read_simple(r, ctx)
        } else {
            Self::read_opaque(r)
        }
    }

    fn registry(registries: &Registries) -> &Registry<Self> {
        &registries.actions
    }
}

impl Record for Action {
    /// Body length, as written into the header.
    type Plan = u16;

    fn decode(r: &mut BitReader<'_>, ctx: &Context<'_>) -> Result<Self, TypeError> {
        Self::decode_next(r, ctx)
    }

    fn prepare(&self, ctx: &Context<'_>) -> Result<Prepared<u16>, TypeError> {
        let first_long = i64::from(ActionHeader::FIRST_LONG_CODE);
        // code 0 ends a block; short codes always decode as simple actions
        match self {
            Self::Simple(code) => check_range("simple action code", i64::from(*code), 1, first_long - 1)?,
            Self::Opaque { code, .. } => check_range("opaque action code", i64::from(*code), first_long, 0xFF)?,
            _ => {}
        }
        let body = self.body_len(ctx)?;
        check_count("action body bytes", body, usize::from(u16::MAX))?;
        let header = ActionHeader::new(self.action_code(), body as u16);
        Ok(Prepared::new(header.encoded_len() + body, body as u16))
    }

    fn encode(&self, prepared: &Prepared<u16>, w: &mut BitWriter, _ctx: &Context<'_>) -> Result<(), TypeError> {
        let header = ActionHeader::new(self.action_code(), prepared.plan);
        let mark = w.mark();
        header.write_to(w)?;
        let span = w.span(Self::FAMILY, u16::from(header.code), mark, u32::from(header.length));
        self.write_body(w)?;
        w.finish(&span)?;
        Ok(())
    }

    fn code(&self) -> u16 {
        u16::from(self.action_code())
    }
}

pub(crate) fn register_standard(registry: &mut Registry<Action>) {
    for code in 0x01..u16::from(ActionHeader::FIRST_LONG_CODE) {
        registry.register(code, Action::read_simple);
    }
    registry.register(u16::from(action_code::GOTO_FRAME), Action::read_goto_frame);
    registry.register(u16::from(action_code::GET_URL), Action::read_get_url);
    registry.register(u16::from(action_code::CONSTANT_POOL), Action::read_constant_pool);
    registry.register(u16::from(action_code::SET_TARGET), Action::read_set_target);
    registry.register(u16::from(action_code::PUSH), Action::read_push);
    registry.register(u16::from(action_code::JUMP), Action::read_jump);
    registry.register(u16::from(action_code::IF), Action::read_if);
}

/// Body of an action-carrying tag: decoded actions, or the raw bytes when
/// the context asks not to decode them.
#[derive(Clone, Debug, PartialEq)]
pub enum ActionBlock {
    /// Actions without the terminating end code, which is implicit.
    Decoded(Vec<Action>),
    /// Body bytes exactly as stored, end code included.
    Raw(Vec<u8>),
}

impl Default for ActionBlock {
    fn default() -> Self {
        Self::Decoded(Vec::new())
    }
}

/// Plans for an action block, one per action.
pub type ActionPlans = Vec<Prepared<u16>>;

impl ActionBlock {
    /// # Errors
    ///
    /// Errors from preparing the individual actions.
    pub fn prepare(&self, ctx: &Context<'_>) -> Result<Prepared<ActionPlans>, TypeError> {
        match self {
            Self::Decoded(actions) => {
                let plans = actions
                    .iter()
                    .map(|a| a.prepare(ctx))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Prepared::new(total_size(&plans) + 1, plans))
            }
            Self::Raw(bytes) => Ok(Prepared::new(bytes.len(), Vec::new())),
        }
    }

    /// # Errors
    ///
    /// Errors from writing the individual actions.
    pub fn write(&self, prepared: &Prepared<ActionPlans>, w: &mut BitWriter, ctx: &Context<'_>) -> Result<(), TypeError> {
        match self {
            Self::Decoded(actions) => {
                if actions.len() != prepared.plan.len() {
                    return Err(TypeError::PlanMismatch {
                        code: u16::from(action_code::END),
                    });
                }
                for (action, plan) in actions.iter().zip(&prepared.plan) {
                    write_prepared(action, plan, w, ctx)?;
                }
                w.write_u8(action_code::END);
            }
            Self::Raw(bytes) => w.write_bytes(bytes),
        }
        Ok(())
    }

    /// Read actions up to and including the end code, or take every byte
    /// up to the end of `span` when action decoding is disabled.
    ///
    /// # Errors
    ///
    /// Wire and action decoding errors.
    pub fn read(r: &mut BitReader<'_>, span: &RecordSpan, ctx: &Context<'_>) -> Result<Self, TypeError> {
        if !ctx.has(crate::ContextFlags::DECODE_ACTIONS) {
            return Ok(Self::Raw(r.read_to_end_of(span)?.to_vec()));
        }
        let mut actions = Vec::new();
        loop {
            if ActionHeader::scan_code(r)? == action_code::END {
                r.read_u8()?;
                break;
            }
            actions.push(Action::decode(r, ctx)?);
        }
        Ok(Self::Decoded(actions))
    }

    /// Number of actions, or `None` for an undecoded block.
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Decoded(actions) => Some(actions.len()),
            Self::Raw(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ContextFlags;
    use crate::record::write_record;

    fn ctx(registries: &Registries) -> Context<'_> {
        Context::new(registries, 8).with_flags(ContextFlags::DECODE_ACTIONS)
    }

    fn roundtrip(action: &Action) -> Vec<u8> {
        let registries = Registries::standard();
        let ctx = ctx(&registries);
        let mut w = BitWriter::swf();
        let written = write_record(action, &mut w, &ctx).unwrap();
        let bytes = w.into_bytes();
        assert_eq!(written, bytes.len());
        let back = Action::decode(&mut BitReader::swf(&bytes), &ctx).unwrap();
        assert_eq!(&back, action);
        bytes
    }

    #[test]
    fn simple_action_is_one_byte() {
        assert_eq!(roundtrip(&Action::Simple(0x06)), vec![0x06]);
    }

    #[test]
    fn goto_frame_layout() {
        assert_eq!(roundtrip(&Action::GotoFrame(5)), vec![0x81, 2, 0, 5, 0]);
    }

    #[test]
    fn typed_actions_roundtrip() {
        roundtrip(&Action::GetUrl {
            url: "http://example.com".into(),
            target: "_blank".into(),
        });
        roundtrip(&Action::ConstantPool(vec!["a".into(), "bc".into()]));
        roundtrip(&Action::SetTarget("/clip".into()));
        roundtrip(&Action::Jump(-12));
        roundtrip(&Action::If(40));
        roundtrip(&Action::Opaque {
            code: 0x8E,
            body: vec![1, 2, 3, 4],
        });
    }

    #[test]
    fn push_values_roundtrip() {
        roundtrip(&Action::Push(vec![
            PushValue::String("x".into()),
            PushValue::Float(1.5),
            PushValue::Null,
            PushValue::Undefined,
            PushValue::Register(3),
            PushValue::Boolean(true),
            PushValue::Double(-2.25),
            PushValue::Integer(-7),
            PushValue::Constant8(1),
            PushValue::Constant16(300),
        ]));
    }

    #[test]
    fn push_double_stores_high_word_first() {
        let bytes = roundtrip(&Action::Push(vec![PushValue::Double(1.0)]));
        // 1.0 = 0x3FF00000_00000000
        assert_eq!(bytes, vec![0x96, 9, 0, 6, 0x00, 0x00, 0xF0, 0x3F, 0, 0, 0, 0]);
    }

    #[test]
    fn unknown_push_type_is_rejected() {
        let registries = Registries::standard();
        let ctx = ctx(&registries);
        let bytes = [0x96, 1, 0, 0x0A];
        let err = Action::decode(&mut BitReader::swf(&bytes), &ctx).unwrap_err();
        assert!(matches!(
            err,
            TypeError::UnknownCode {
                family: "push value",
                code: 10
            }
        ));
    }

    #[test]
    fn unknown_long_action_falls_back_to_opaque() {
        let registries = Registries::standard();
        let ctx = ctx(&registries);
        let bytes = [0xC0, 2, 0, 0xAA, 0xBB];
        let action = Action::decode(&mut BitReader::swf(&bytes), &ctx).unwrap();
        assert_eq!(
            action,
            Action::Opaque {
                code: 0xC0,
                body: vec![0xAA, 0xBB]
            }
        );
    }

    #[test]
    fn reserved_codes_are_rejected_before_writing() {
        let registries = Registries::standard();
        let ctx = ctx(&registries);
        for (action, field) in [
            (Action::Simple(action_code::END), "simple action code"),
            (Action::Simple(0x81), "simple action code"),
            (
                Action::Opaque {
                    code: action_code::END,
                    body: vec![],
                },
                "opaque action code",
            ),
            (
                Action::Opaque {
                    code: 0x10,
                    body: vec![1],
                },
                "opaque action code",
            ),
        ] {
            let mut w = BitWriter::swf();
            match write_record(&action, &mut w, &ctx) {
                Err(TypeError::OutOfRange { field: f, .. }) => assert_eq!(f, field),
                other => panic!("{action:?}: expected out of range, got {other:?}"),
            }
            assert!(w.as_bytes().is_empty());
        }
        assert_eq!(roundtrip(&Action::Simple(0x7F)), vec![0x7F]);
        assert_eq!(roundtrip(&Action::Opaque { code: 0xFF, body: vec![] }), vec![0xFF, 0, 0]);
    }

    #[test]
    fn body_shorter_than_declared_is_a_mismatch() {
        let registries = Registries::standard();
        let ctx = ctx(&registries);
        // GotoFrame declaring 4 bytes but only using 2
        let bytes = [0x81, 4, 0, 1, 0, 0, 0];
        let err = Action::decode(&mut BitReader::swf(&bytes), &ctx).unwrap_err();
        match err {
            TypeError::Wire(swf_wire::WireError::CodingMismatch(m)) => {
                assert_eq!(m.family, "action");
                assert_eq!(m.delta, -2);
            }
            other => panic!("expected coding mismatch, got {other:?}"),
        }
    }

    #[test]
    fn action_block_appends_end_code() {
        let registries = Registries::standard();
        let ctx = ctx(&registries);
        let block = ActionBlock::Decoded(vec![Action::Simple(0x07), Action::GotoFrame(0)]);
        let prepared = block.prepare(&ctx).unwrap();
        assert_eq!(prepared.size, 1 + 5 + 1);
        let mut w = BitWriter::swf();
        block.write(&prepared, &mut w, &ctx).unwrap();
        assert_eq!(w.as_bytes(), &[0x07, 0x81, 2, 0, 0, 0, 0x00]);
    }
}
