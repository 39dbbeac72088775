use swf_types::TypeError;
use swf_wire::WireError;

/// Errors that can occur while decoding a movie or an FLV file.
///
/// Container-level problems are reported as their own variants; a record
/// that fails to decode surfaces as `Type` (or `Wire`) and aborts the
/// whole decode.
///
/// ```text
///   DecodeError
///   ├── InvalidSignature        ← not "FWS"/"CWS" (or "FLV")
///   ├── Truncated               ← shorter than the fixed header
///   ├── InflateFailed           ← zlib stream is corrupt or cut short
///   ├── DecompressionBomb       ← inflated size exceeds the ceiling
///   ├── LengthMismatch          ← actual length differs from the declared one
///   ├── MissingEndSentinel      ← tag stream ran out without a 0 code
///   ├── TrailingData            ← bytes after the sentinel
///   ├── InvalidFlvHeaderLength  ← FLV header length is not 9
///   ├── PreviousTagSize         ← FLV size word disagrees with the tag
///   ├── Type(TypeError)         ← from record decoding
///   ├── Wire(WireError)         ← from the fixed headers
///   └── Io(std::io::Error)
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid signature {found:02X?}")]
    InvalidSignature { found: [u8; 3] },

    #[error("input of {available} bytes is shorter than the {needed}-byte header")]
    Truncated { needed: usize, available: usize },

    #[error("zlib inflate failed: {0}")]
    InflateFailed(String),

    /// The inflated body would exceed the configured ceiling.
    #[error("inflated size {actual} exceeds limit {limit}")]
    DecompressionBomb { actual: usize, limit: usize },

    #[error("declared length {declared} but the movie holds {actual} bytes")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("tag stream does not end with the end sentinel")]
    MissingEndSentinel,

    #[error("unexpected data after the end sentinel ({extra_bytes} bytes)")]
    TrailingData { extra_bytes: usize },

    #[error("flv header length {found}, expected 9")]
    InvalidFlvHeaderLength { found: u32 },

    #[error("previous tag size at byte {offset} is {found}, expected {expected}")]
    PreviousTagSize {
        offset: usize,
        expected: u32,
        found: u32,
    },

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DecodeError {
    /// Lift signature failures out of the wire layer.
    pub(crate) fn from_header(err: WireError) -> Self {
        match err {
            WireError::InvalidSignature { found } => Self::InvalidSignature { found },
            other => Self::Wire(other),
        }
    }
}
