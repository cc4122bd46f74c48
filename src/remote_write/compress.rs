//! Snappy block compression for remote-write bodies.
//!
//! Remote write uses the raw (unframed) snappy format, announced with
//! `Content-Encoding: snappy`.

use crate::core::Result;

/// Compress a serialized write request.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = snap::raw::Encoder::new();
    Ok(encoder.compress_vec(data)?)
}

/// Decompress a remote-write body.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = snap::raw::Decoder::new();
    Ok(decoder.decompress_vec(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PushError;

    #[test]
    fn test_roundtrip() {
        let data = b"__name__custom_counter__name__custom_counter__name__custom_gauge".repeat(16);

        let compressed = compress(&data).unwrap();

        assert!(compressed.len() < data.len());
        assert_eq!(decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn test_raw_format_has_no_stream_header() {
        let compressed = compress(b"abc").unwrap();
        // Raw blocks start with the varint-encoded uncompressed length.
        assert_eq!(compressed[0], 3);
    }

    #[test]
    fn test_empty_input_rejected() {
        let err = decompress(&[]).unwrap_err();
        assert!(matches!(err, PushError::Compression(_)));
    }
}
