use swf_wire::record_header::TagHeader;
use swf_wire::{BitReader, BitWriter, RecordSpan};

use crate::context::Context;
use crate::error::TypeError;
use crate::tag::{BodyPlan, TagBody};
use crate::tag_code::TagCode;

/// Movie-wide attribute bits carried by `FileAttributes`.
///
/// ```text
/// ┌──────┬─────────────────┐
/// │ Bit  │ Meaning         │
/// ├──────┼─────────────────┤
/// │ 0x01 │ USE_NETWORK     │
/// │ 0x08 │ ACTIONSCRIPT3   │
/// │ 0x10 │ HAS_METADATA    │
/// │ 0x20 │ USE_GPU         │
/// │ 0x40 │ USE_DIRECT_BLIT │
/// └──────┴─────────────────┘
/// ```
///
/// Unlisted bits are reserved but kept, so they survive a round trip.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AttributeFlags(u32);

impl AttributeFlags {
  pub const NONE: Self = Self(0);
  pub const USE_NETWORK: Self = Self(0x01);
  pub const ACTIONSCRIPT3: Self = Self(0x08);
  pub const HAS_METADATA: Self = Self(0x10);
  pub const USE_GPU: Self = Self(0x20);
  pub const USE_DIRECT_BLIT: Self = Self(0x40);

  #[must_use]
  pub fn from_raw(raw: u32) -> Self {
    Self(raw)
  }

  #[must_use]
  pub fn raw(self) -> u32 {
    self.0
  }

  #[must_use]
  pub fn contains(self, other: Self) -> bool {
    self.0 & other.0 == other.0
  }

  #[must_use]
  pub fn with(self, other: Self) -> Self {
    Self(self.0 | other.0)
  }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FileAttributes {
  pub flags: AttributeFlags,
  /// Whether a short body was framed with a long header.
  pub long_header: bool,
}

impl TagBody for FileAttributes {
  fn tag_code(&self) -> TagCode {
    TagCode::FileAttributes
  }

  fn plan(&self, _ctx: &Context<'_>) -> Result<(usize, BodyPlan), TypeError> {
    Ok((4, BodyPlan::Unit))
  }

  fn write_body(&self, _plan: &BodyPlan, w: &mut BitWriter, _ctx: &Context<'_>) -> Result<(), TypeError> {
    Ok(w.write_u32(self.flags.raw())?)
  }

  fn read_body(
    header: &TagHeader,
    _span: &RecordSpan,
    r: &mut BitReader<'_>,
    _ctx: &Context<'_>,
  ) -> Result<Self, TypeError> {
    Ok(Self {
      flags: AttributeFlags::from_raw(r.read_u32()?),
      long_header: header.is_long_by_choice(),
    })
  }
}

/// XML metadata describing the movie, stored as one null-terminated
/// string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Metadata {
  pub xml: String,
  /// Whether a short body was framed with a long header.
  pub long_header: bool,
}

impl TagBody for Metadata {
  fn tag_code(&self) -> TagCode {
    TagCode::Metadata
  }

  fn plan(&self, ctx: &Context<'_>) -> Result<(usize, BodyPlan), TypeError> {
    Ok((BitWriter::string_len(ctx.text_encoding(), &self.xml)?, BodyPlan::Unit))
  }

  fn write_body(&self, _plan: &BodyPlan, w: &mut BitWriter, _ctx: &Context<'_>) -> Result<(), TypeError> {
    Ok(w.write_string(&self.xml)?)
  }

  fn read_body(
    header: &TagHeader,
    _span: &RecordSpan,
    r: &mut BitReader<'_>,
    _ctx: &Context<'_>,
  ) -> Result<Self, TypeError> {
    Ok(Self {
      xml: r.read_string()?,
      long_header: header.is_long_by_choice(),
    })
  }
}
