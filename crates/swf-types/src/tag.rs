use swf_wire::record_header::{MAX_TAG_CODE, TagHeader};
use swf_wire::{BitReader, BitWriter, RecordSpan};
use tracing::trace;

use crate::action::ActionPlans;
use crate::attributes::{FileAttributes, Metadata};
use crate::context::Context;
use crate::define_shape::DefineShape;
use crate::display::{FrameLabel, PlaceObject2, RemoveObject2, SetBackgroundColor};
use crate::error::{TypeError, check_count, check_range};
use crate::media::{DefineBinaryData, DefineSound, DefineVideoStream};
use crate::record::{Prepared, Record};
use crate::registry::{Family, Registries, Registry};
use crate::script::{DoAction, DoInitAction, ScriptLimits};
use crate::shape::ShapePlan;
use crate::sprite::DefineSprite;
use crate::tag_code::TagCode;

/// A movie tag: the union of every typed tag plus an opaque fallback.
///
/// ```text
/// ┌────────────────────┬──────────────────┐
/// │ Variant            │ Code             │
/// ├────────────────────┼──────────────────┤
/// │ ShowFrame          │ 1                │
/// │ DefineShape        │ 2 / 22 / 32      │
/// │ SetBackgroundColor │ 9                │
/// │ DoAction           │ 12               │
/// │ DefineSound        │ 14               │
/// │ PlaceObject2       │ 26               │
/// │ RemoveObject2      │ 28               │
/// │ DefineSprite       │ 39               │
/// │ FrameLabel         │ 43               │
/// │ DoInitAction       │ 59               │
/// │ DefineVideoStream  │ 60               │
/// │ ScriptLimits       │ 65               │
/// │ FileAttributes     │ 69               │
/// │ Metadata           │ 77               │
/// │ DefineBinaryData   │ 87               │
/// │ Opaque             │ anything else    │
/// └────────────────────┴──────────────────┘
/// ```
///
/// The stream-end sentinel (code 0) is not a variant: containers consume
/// and write it themselves.
///
/// Typed tags remember a long header on a short body in their
/// `long_header` field and write it back the same way; otherwise the
/// shortest header that holds the body is used. A `ShowFrame` with a long
/// header decodes as an opaque code 1 tag.
#[derive(Clone, Debug, PartialEq)]
pub enum Tag {
  ShowFrame,
  DefineShape(DefineShape),
  SetBackgroundColor(SetBackgroundColor),
  DoAction(DoAction),
  DefineSound(DefineSound),
  PlaceObject2(PlaceObject2),
  RemoveObject2(RemoveObject2),
  DefineSprite(DefineSprite),
  FrameLabel(FrameLabel),
  DoInitAction(DoInitAction),
  DefineVideoStream(DefineVideoStream),
  ScriptLimits(ScriptLimits),
  FileAttributes(FileAttributes),
  Metadata(Metadata),
  DefineBinaryData(DefineBinaryData),
  Opaque(OpaqueTag),
}

/// A tag kept as raw bytes: its code, its header form and its body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpaqueTag {
  pub code: u16,
  /// Whether the header used the long (32-bit length) form.
  pub long: bool,
  pub body: Vec<u8>,
}

impl OpaqueTag {
  /// Opaque tag in the shortest header form.
  #[must_use]
  pub fn new(code: u16, body: Vec<u8>) -> Self {
    Self {
      code,
      long: false,
      body,
    }
  }
}

/// Encoding plan for one tag: its header (with the body length) and
/// whatever the body needs beyond that.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagPlan {
  pub header: TagHeader,
  pub body: BodyPlan,
}

/// Body-specific part of a [`TagPlan`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BodyPlan {
  /// Fixed layout; nothing to remember.
  Unit,
  Shape(ShapePlan),
  Actions(Prepared<ActionPlans>),
  Sprite(Vec<Prepared<TagPlan>>),
}

/// Body coding for one typed tag. The tag header is handled by
/// [`Tag`]'s `Record` implementation.
pub(crate) trait TagBody {
  fn tag_code(&self) -> TagCode;

  /// Body length in bytes and the plan needed to write it.
  fn plan(&self, ctx: &Context<'_>) -> Result<(usize, BodyPlan), TypeError>;

  fn write_body(&self, plan: &BodyPlan, w: &mut BitWriter, ctx: &Context<'_>) -> Result<(), TypeError>;

  /// Decode the body; the cursor sits just past the header and must end
  /// at `span.end()`.
  fn read_body(
    header: &TagHeader,
    span: &RecordSpan,
    r: &mut BitReader<'_>,
    ctx: &Context<'_>,
  ) -> Result<Self, TypeError>
  where
    Self: Sized;
}

/// Read a tag header, decode the body with `body`, and verify the body
/// ended where the header said.
pub(crate) fn read_framed_with<T>(
  r: &mut BitReader<'_>,
  ctx: &Context<'_>,
  body: impl FnOnce(&TagHeader, &RecordSpan, &mut BitReader<'_>, &Context<'_>) -> Result<T, TypeError>,
) -> Result<T, TypeError> {
  r.align_to_byte();
  let mark = r.mark();
  let header = TagHeader::read_from(r)?;
  let span = r.span(Tag::FAMILY, header.code, mark, header.length);
  trace!(
    code = header.code,
    length = header.length,
    offset = mark.bit_offset() / 8,
    "tag"
  );
  let value = body(&header, &span, r, ctx)?;
  r.finish(&span)?;
  Ok(value)
}

pub(crate) fn read_framed<B: TagBody>(r: &mut BitReader<'_>, ctx: &Context<'_>) -> Result<B, TypeError> {
  read_framed_with(r, ctx, B::read_body)
}

impl Tag {
  #[must_use]
  pub fn tag_code(&self) -> TagCode {
    match self {
      Self::ShowFrame => TagCode::ShowFrame,
      Self::Opaque(t) => TagCode::from_wire_id(t.code),
      other => other.body().map_or(TagCode::End, |b| b.tag_code()),
    }
  }

  /// Whether the tag is framed with a long header on a short body.
  #[must_use]
  pub fn long_header(&self) -> bool {
    match self {
      Self::ShowFrame => false,
      Self::Opaque(t) => t.long,
      Self::DefineShape(t) => t.long_header,
      Self::SetBackgroundColor(t) => t.long_header,
      Self::DoAction(t) => t.long_header,
      Self::DefineSound(t) => t.long_header,
      Self::PlaceObject2(t) => t.long_header,
      Self::RemoveObject2(t) => t.long_header,
      Self::DefineSprite(t) => t.long_header,
      Self::FrameLabel(t) => t.long_header,
      Self::DoInitAction(t) => t.long_header,
      Self::DefineVideoStream(t) => t.long_header,
      Self::ScriptLimits(t) => t.long_header,
      Self::FileAttributes(t) => t.long_header,
      Self::Metadata(t) => t.long_header,
      Self::DefineBinaryData(t) => t.long_header,
    }
  }

  /// Identifier of a definition tag.
  #[must_use]
  pub fn identifier(&self) -> Option<u16> {
    match self {
      Self::DefineShape(t) => Some(t.id),
      Self::DefineSound(t) => Some(t.id),
      Self::DefineSprite(t) => Some(t.id),
      Self::DefineVideoStream(t) => Some(t.id),
      Self::DefineBinaryData(t) => Some(t.id),
      _ => None,
    }
  }

  fn body(&self) -> Option<&dyn TagBody> {
    match self {
      Self::ShowFrame | Self::Opaque(_) => None,
      Self::DefineShape(t) => Some(t),
      Self::SetBackgroundColor(t) => Some(t),
      Self::DoAction(t) => Some(t),
      Self::DefineSound(t) => Some(t),
      Self::PlaceObject2(t) => Some(t),
      Self::RemoveObject2(t) => Some(t),
      Self::DefineSprite(t) => Some(t),
      Self::FrameLabel(t) => Some(t),
      Self::DoInitAction(t) => Some(t),
      Self::DefineVideoStream(t) => Some(t),
      Self::ScriptLimits(t) => Some(t),
      Self::FileAttributes(t) => Some(t),
      Self::Metadata(t) => Some(t),
      Self::DefineBinaryData(t) => Some(t),
    }
  }

  fn read_show_frame(r: &mut BitReader<'_>, ctx: &Context<'_>) -> Result<Self, TypeError> {
    read_framed_with(r, ctx, |header, _, _, _| {
      if header.is_long_by_choice() {
        return Ok(Self::Opaque(OpaqueTag {
          code: header.code,
          long: true,
          body: Vec::new(),
        }));
      }
      Ok(Self::ShowFrame)
    })
  }

  fn read_opaque(r: &mut BitReader<'_>, ctx: &Context<'_>) -> Result<Self, TypeError> {
    read_framed_with(r, ctx, |header, span, r, _| {
      Ok(Self::Opaque(OpaqueTag {
        code: header.code,
        long: header.long,
        body: r.read_to_end_of(span)?.to_vec(),
      }))
    })
  }
}

impl Family for Tag {
  const FAMILY: &'static str = "tag";

  fn scan_code(r: &mut BitReader<'_>) -> Result<u16, TypeError> {
    Ok(TagHeader::scan_code(r)?)
  }

  fn fallback(_code: u16, r: &mut BitReader<'_>, ctx: &Context<'_>) -> Result<Self, TypeError> {
    Self::read_opaque(r, ctx)
  }

  fn registry(registries: &Registries) -> &Registry<Self> {
    &registries.tags
  }
}

impl Record for Tag {
  type Plan = TagPlan;

  fn decode(r: &mut BitReader<'_>, ctx: &Context<'_>) -> Result<Self, TypeError> {
    Self::decode_next(r, ctx)
  }

  fn prepare(&self, ctx: &Context<'_>) -> Result<Prepared<TagPlan>, TypeError> {
    let (code, (len, body)) = match self {
      Self::ShowFrame => (TagCode::ShowFrame.wire_id(), (0, BodyPlan::Unit)),
      Self::Opaque(t) => {
        check_range("opaque tag code", i64::from(t.code), 1, i64::from(MAX_TAG_CODE))?;
        (t.code, (t.body.len(), BodyPlan::Unit))
      }
      other => match other.body() {
        Some(b) => (b.tag_code().wire_id(), b.plan(ctx)?),
        None => return Err(TypeError::PlanMismatch { code: 0 }),
      },
    };
    check_count("tag body bytes", len, u32::MAX as usize)?;
    let header = TagHeader::with_form(code, len as u32, self.long_header());
    Ok(Prepared::new(header.encoded_len() + len, TagPlan { header, body }))
  }

  fn encode(&self, prepared: &Prepared<TagPlan>, w: &mut BitWriter, ctx: &Context<'_>) -> Result<(), TypeError> {
    let header = &prepared.plan.header;
    if header.code != self.code() {
      return Err(TypeError::PlanMismatch { code: self.code() });
    }
    let mark = w.mark();
    header.write_to(w)?;
    let span = w.span(Self::FAMILY, header.code, mark, header.length);
    match self {
      Self::ShowFrame => {}
      Self::Opaque(t) => w.write_bytes(&t.body),
      other => {
        if let Some(b) = other.body() {
          b.write_body(&prepared.plan.body, w, ctx)?;
        }
      }
    }
    w.finish(&span)?;
    Ok(())
  }

  fn code(&self) -> u16 {
    self.tag_code().wire_id()
  }
}

pub(crate) fn register_standard(registry: &mut Registry<Tag>) {
  registry.register(TagCode::ShowFrame.wire_id(), Tag::read_show_frame);
  for code in [TagCode::DefineShape, TagCode::DefineShape2, TagCode::DefineShape3] {
    registry.register(code.wire_id(), |r, ctx| read_framed(r, ctx).map(Tag::DefineShape));
  }
  registry.register(TagCode::SetBackgroundColor.wire_id(), |r, ctx| {
    read_framed(r, ctx).map(Tag::SetBackgroundColor)
  });
  registry.register(TagCode::DoAction.wire_id(), |r, ctx| read_framed(r, ctx).map(Tag::DoAction));
  registry.register(TagCode::DefineSound.wire_id(), |r, ctx| read_framed(r, ctx).map(Tag::DefineSound));
  registry.register(TagCode::PlaceObject2.wire_id(), |r, ctx| read_framed(r, ctx).map(Tag::PlaceObject2));
  registry.register(TagCode::RemoveObject2.wire_id(), |r, ctx| {
    read_framed(r, ctx).map(Tag::RemoveObject2)
  });
  registry.register(TagCode::DefineSprite.wire_id(), |r, ctx| read_framed(r, ctx).map(Tag::DefineSprite));
  registry.register(TagCode::FrameLabel.wire_id(), |r, ctx| read_framed(r, ctx).map(Tag::FrameLabel));
  registry.register(TagCode::DoInitAction.wire_id(), |r, ctx| read_framed(r, ctx).map(Tag::DoInitAction));
  registry.register(TagCode::DefineVideoStream.wire_id(), |r, ctx| {
    read_framed(r, ctx).map(Tag::DefineVideoStream)
  });
  registry.register(TagCode::ScriptLimits.wire_id(), |r, ctx| read_framed(r, ctx).map(Tag::ScriptLimits));
  registry.register(TagCode::FileAttributes.wire_id(), |r, ctx| {
    read_framed(r, ctx).map(Tag::FileAttributes)
  });
  registry.register(TagCode::Metadata.wire_id(), |r, ctx| read_framed(r, ctx).map(Tag::Metadata));
  registry.register(TagCode::DefineBinaryData.wire_id(), |r, ctx| {
    read_framed(r, ctx).map(Tag::DefineBinaryData)
  });
}

#[cfg(test)]
mod tests {
  use swf_wire::WireError;

  use super::*;
  use crate::geometry::Color;
  use crate::record::write_record;

  fn encode(tag: &Tag) -> Vec<u8> {
    let registries = Registries::standard();
    let ctx = Context::new(&registries, 10);
    let mut w = BitWriter::swf();
    write_record(tag, &mut w, &ctx).unwrap();
    w.into_bytes()
  }

  #[test]
  fn background_color_scenario() {
    let tag = Tag::SetBackgroundColor(SetBackgroundColor {
      color: Color::rgb(255, 0, 0),
      long_header: false,
    });
    assert_eq!(encode(&tag), vec![0x43, 0x02, 0xFF, 0x00, 0x00]);
  }

  #[test]
  fn show_frame_is_a_bare_header() {
    assert_eq!(encode(&Tag::ShowFrame), vec![0x40, 0x00]);
  }

  #[test]
  fn long_bodies_use_long_headers() {
    let tag = Tag::Opaque(OpaqueTag::new(700, vec![0xAB; 63]));
    let bytes = encode(&tag);
    assert_eq!(bytes.len(), 6 + 63);
    assert_eq!(&bytes[..6], &[0x3F, 0xAF, 63, 0, 0, 0]);
  }

  #[test]
  fn opaque_tag_cannot_use_the_end_code() {
    let registries = Registries::standard();
    let ctx = Context::new(&registries, 10);
    let tag = Tag::Opaque(OpaqueTag::new(0, vec![1, 2, 3]));
    let mut w = BitWriter::swf();
    assert!(matches!(
      write_record(&tag, &mut w, &ctx),
      Err(TypeError::OutOfRange { field: "opaque tag code", .. })
    ));
    assert!(w.as_bytes().is_empty());
  }

  #[test]
  fn long_form_headers_survive_on_short_bodies() {
    let registries = Registries::standard();
    let ctx = Context::new(&registries, 10);
    let background = [0x7F, 0x02, 3, 0, 0, 0, 0xFF, 0x00, 0x00];
    let tag = Tag::decode(&mut BitReader::swf(&background), &ctx).unwrap();
    assert!(tag.long_header());
    assert_eq!(encode(&tag), background);

    // long-form ShowFrame has no typed place for the flag
    let show_frame = [0x7F, 0x00, 0, 0, 0, 0];
    let tag = Tag::decode(&mut BitReader::swf(&show_frame), &ctx).unwrap();
    assert_eq!(tag.tag_code(), TagCode::ShowFrame);
    assert!(matches!(&tag, Tag::Opaque(t) if t.code == 1 && t.long));
    assert_eq!(encode(&tag), show_frame);
  }

  #[test]
  fn declared_length_too_long_is_a_coding_mismatch() {
    let registries = Registries::standard();
    let ctx = Context::new(&registries, 10);
    // SetBackgroundColor declaring 5 bytes; the color uses 3
    let bytes = [0x45, 0x02, 0xFF, 0x00, 0x00, 0x00, 0x00];
    let err = Tag::decode(&mut BitReader::swf(&bytes), &ctx).unwrap_err();
    match err {
      TypeError::Wire(WireError::CodingMismatch(m)) => {
        assert_eq!(m.family, "tag");
        assert_eq!(m.code, 9);
        assert_eq!(m.start, 0);
        assert_eq!(m.declared, 5);
        assert_eq!(m.delta, -2);
      }
      other => panic!("expected coding mismatch, got {other:?}"),
    }
  }

  #[test]
  fn identifiers_only_on_definitions() {
    let sprite = Tag::DefineSprite(DefineSprite {
      id: 4,
      tags: vec![Tag::ShowFrame],
      long_header: false,
    });
    assert_eq!(sprite.identifier(), Some(4));
    assert_eq!(Tag::ShowFrame.identifier(), None);
  }

  #[test]
  fn plan_from_another_tag_is_rejected() {
    let registries = Registries::standard();
    let ctx = Context::new(&registries, 10);
    let plan = Tag::ShowFrame.prepare(&ctx).unwrap();
    let other = Tag::RemoveObject2(RemoveObject2 {
      depth: 1,
      long_header: false,
    });
    let mut w = BitWriter::swf();
    assert!(matches!(
      other.encode(&plan, &mut w, &ctx),
      Err(TypeError::PlanMismatch { code: 28 })
    ));
  }
}
