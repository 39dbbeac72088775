use std::fmt;

/// Errors raised by the bit coder and the fixed-layout headers.
///
/// Every variant that concerns a position carries it, so a failure deep
/// inside a nested record still points at the exact spot in the stream.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// A read needed more bits than the buffer holds.
    #[error("read of {needed} bits at bit offset {offset} runs past the end ({available} bits)")]
    OutOfBounds {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Bit fields are limited to 32 bits.
    #[error("bit field of {width} bits exceeds the 32-bit limit")]
    FieldTooWide { width: u32 },

    /// Word access is limited to 1-8 bytes.
    #[error("word of {bytes} bytes is not supported")]
    WordTooWide { bytes: usize },

    /// `set_pointer` / `adjust_pointer` moved the cursor outside the buffer.
    #[error("pointer {target} is outside the buffer (0..={limit} bits)")]
    PointerOutOfRange { target: i64, limit: usize },

    /// A null-terminated string ran to the end of the buffer.
    #[error("unterminated string starting at byte {offset}")]
    UnterminatedString { offset: usize },

    /// String bytes were not valid in the active text encoding.
    #[error("invalid text at byte {offset}: {reason}")]
    InvalidText { offset: usize, reason: String },

    /// The cursor did not land on the end a record declared for itself.
    #[error(transparent)]
    CodingMismatch(#[from] CodingMismatch),

    /// A type code or length does not fit its header field.
    #[error("{field} {value} does not fit in {bits} bits")]
    HeaderFieldOverflow {
        field: &'static str,
        value: u64,
        bits: u32,
    },

    /// A record header carried the stream-end code outside the sentinel.
    #[error("{family} code 0 is reserved for the end sentinel")]
    MisplacedEndCode { family: &'static str },

    /// Invalid container signature.
    #[error("invalid signature {found:02X?}")]
    InvalidSignature { found: [u8; 3] },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Diagnostic for a record whose declared length disagrees with the
/// number of bytes its fields actually occupy.
///
/// ```text
/// ┌──────────┬────────────────────────────────────────────────┐
/// │ Field    │ Meaning                                        │
/// ├──────────┼────────────────────────────────────────────────┤
/// │ family   │ record family ("tag", "action", "flv tag", …)  │
/// │ code     │ type code of the record                        │
/// │ start    │ byte offset of the record header               │
/// │ declared │ body length from the header, in bytes          │
/// │ delta    │ actual end − expected end, in bytes (signed)   │
/// └──────────┴────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodingMismatch {
    pub family: &'static str,
    pub code: u16,
    pub start: usize,
    pub declared: u32,
    pub delta: i64,
}

impl fmt::Display for CodingMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} at byte {}: declared {} bytes, cursor off by {:+} bytes",
            self.family, self.code, self.start, self.declared, self.delta
        )
    }
}

impl std::error::Error for CodingMismatch {}
