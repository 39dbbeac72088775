use std::io::Read;

use flate2::read::ZlibDecoder;

use crate::error::DecodeError;

/// Default ceiling on the inflated body of a compressed movie (256 MiB).
pub const DEFAULT_MAX_INFLATED_SIZE: usize = 256 * 1024 * 1024;

/// Inflate a zlib stream, reading at most `limit` bytes of output.
///
/// # Errors
///
/// - [`DecodeError::InflateFailed`] if the stream is corrupt or truncated.
/// - [`DecodeError::DecompressionBomb`] if the output exceeds `limit`.
pub(crate) fn inflate(data: &[u8], expected: usize, limit: usize) -> Result<Vec<u8>, DecodeError> {
    let mut out = Vec::with_capacity(expected.min(limit));
    ZlibDecoder::new(data)
        .take(limit as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|e| DecodeError::InflateFailed(e.to_string()))?;
    if out.len() > limit {
        return Err(DecodeError::DecompressionBomb {
            actual: out.len(),
            limit,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::ZlibEncoder;

    use super::*;

    fn zlib(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn inflates_within_limit() {
        let data = vec![7u8; 1000];
        assert_eq!(inflate(&zlib(&data), 1000, 1000).unwrap(), data);
    }

    #[test]
    fn rejects_bomb() {
        let data = vec![0u8; 10_000];
        assert!(matches!(
            inflate(&zlib(&data), 10_000, 100),
            Err(DecodeError::DecompressionBomb { limit: 100, .. })
        ));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            inflate(b"definitely not zlib", 10, 100),
            Err(DecodeError::InflateFailed(_))
        ));
    }

    #[test]
    fn truncated_stream_never_yields_the_full_body() {
        let data: Vec<u8> = (0..2000u32).map(|i| (i * 7 % 251) as u8).collect();
        let stream = zlib(&data);
        let result = inflate(&stream[..stream.len() / 2], data.len(), 4000);
        assert!(result.map_or(true, |out| out.len() < data.len()));
    }
}
