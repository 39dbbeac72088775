use swf_wire::WireError;

/// Errors raised while building, sizing, encoding or decoding typed records.
///
/// These sit above [`WireError`]: they concern the meaning of fields rather
/// than the mechanics of moving bits. Low-level failures inside a record
/// body (truncation, a coding mismatch) surface wrapped in `Wire`.
///
/// ```text
/// ┌─────────────────────────────────────────────────────────┐
/// │ TypeError (this crate)                                  │
/// │   ├── OutOfRange / TooMany   rejected by constructors   │
/// │   ├── UnknownCode            no decoder, no fallback    │
/// │   ├── ZeroBitWidth           degenerate width prefix    │
/// │   ├── NestingTooDeep         sprite inside a sprite     │
/// │   ├── SizeMismatch           prepare vs encode disagree │
/// │   ├── PlanMismatch           plan built for another tag │
/// │   └── Wire                   wraps WireError            │
/// └─────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, thiserror::Error)]
pub enum TypeError {
  /// A field value lies outside the range its encoding can hold.
  #[error("{field} = {value} is outside {min}..={max}")]
  OutOfRange {
    field: &'static str,
    value: i64,
    min: i64,
    max: i64,
  },

  /// A family without a fallback met a code nobody registered.
  #[error("unknown {family} code {code:#04X}")]
  UnknownCode { family: &'static str, code: u16 },

  /// A 5-bit (or 4-bit) width prefix decoded as zero.
  ///
  /// The encoder never writes a zero width, so such a field could not be
  /// reproduced byte for byte.
  #[error("{field} declares a zero bit width")]
  ZeroBitWidth { field: &'static str },

  /// A sprite was found nested deeper than a context allows.
  #[error("sprites nest deeper than {max} level(s)")]
  NestingTooDeep { max: u8 },

  /// A collection exceeds the count its length prefix can express.
  #[error("{field} holds {count} entries, at most {max} allowed")]
  TooMany {
    field: &'static str,
    count: usize,
    max: usize,
  },

  /// `encode` wrote a different number of bytes than `prepare` promised.
  #[error("{family} {code}: prepared {prepared} bytes but wrote {written}")]
  SizeMismatch {
    family: &'static str,
    code: u16,
    prepared: usize,
    written: usize,
  },

  /// A record was handed a plan prepared for a different record shape.
  #[error("encoding plan does not belong to record {code}")]
  PlanMismatch { code: u16 },

  #[error(transparent)]
  Wire(#[from] WireError),
}

impl TypeError {
  pub(crate) fn out_of_range(field: &'static str, value: i64, min: i64, max: i64) -> Self {
    Self::OutOfRange {
      field,
      value,
      min,
      max,
    }
  }
}

/// Check `value` against an inclusive range.
pub(crate) fn check_range(
  field: &'static str,
  value: i64,
  min: i64,
  max: i64,
) -> Result<(), TypeError> {
  if value < min || value > max {
    return Err(TypeError::out_of_range(field, value, min, max));
  }
  Ok(())
}

/// Check that `count` entries fit a prefix that holds at most `max`.
pub(crate) fn check_count(field: &'static str, count: usize, max: usize) -> Result<(), TypeError> {
  if count > max {
    return Err(TypeError::TooMany { field, count, max });
  }
  Ok(())
}
