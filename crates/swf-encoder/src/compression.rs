use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;

use crate::error::EncodeError;

/// Default zlib level for compressed ("CWS") movies.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Highest level zlib accepts.
const MAX_COMPRESSION_LEVEL: u32 = 9;

/// Compress `data` into a zlib stream.
///
/// # Errors
///
/// - [`EncodeError::InvalidCompressionLevel`] if `level > 9`.
/// - [`EncodeError::Io`] if the deflate stream fails.
pub(crate) fn deflate(data: &[u8], level: u32) -> Result<Vec<u8>, EncodeError> {
    if level > MAX_COMPRESSION_LEVEL {
        return Err(EncodeError::InvalidCompressionLevel { level });
    }
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2), Compression::new(level));
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use flate2::read::ZlibDecoder;

    use super::*;

    #[test]
    fn deflate_inflate_roundtrip() {
        let data = b"ShowFrame ShowFrame ShowFrame ".repeat(40);
        let compressed = deflate(&data, DEFAULT_COMPRESSION_LEVEL).unwrap();
        assert!(compressed.len() < data.len());
        let mut inflated = Vec::new();
        ZlibDecoder::new(compressed.as_slice())
            .read_to_end(&mut inflated)
            .unwrap();
        assert_eq!(inflated, data);
    }

    #[test]
    fn level_zero_still_produces_zlib() {
        let compressed = deflate(b"abc", 0).unwrap();
        assert_eq!(compressed[0], 0x78);
    }

    #[test]
    fn rejects_level_ten() {
        assert!(matches!(
            deflate(b"abc", 10),
            Err(EncodeError::InvalidCompressionLevel { level: 10 })
        ));
    }
}
