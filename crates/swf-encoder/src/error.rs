use swf_types::TypeError;
use swf_wire::WireError;

/// Errors that can occur while encoding a movie or an FLV file.
///
/// ```text
///   EncodeError
///   ├── MovieTooLarge            ← total length does not fit the u32 field
///   ├── InvalidCompressionLevel  ← zlib level outside 0..=9
///   ├── Type(TypeError)          ← field validation, size or plan mismatch
///   ├── Wire(WireError)          ← header overflow, coding mismatch
///   └── Io(std::io::Error)       ← from the deflate stream
/// ```
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("movie of {size} bytes exceeds the {limit}-byte length field")]
    MovieTooLarge { size: usize, limit: usize },

    #[error("compression level {level} is outside 0..=9")]
    InvalidCompressionLevel { level: u32 },

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
