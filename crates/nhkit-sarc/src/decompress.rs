//! Zstandard support for `.zs` archives.

use std::io::Read;

use crate::{Error, Result};

/// Zstandard frame magic, little-endian `0xFD2FB528`.
pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Whether `data` starts with a Zstandard frame.
#[inline]
pub fn is_zstd(data: &[u8]) -> bool {
    data.starts_with(&ZSTD_MAGIC)
}

/// Decompress a complete Zstandard stream.
pub fn decompress_zstd(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = zstd::Decoder::new(data).map_err(|e| Error::Decompression(e.to_string()))?;

    let mut output = Vec::with_capacity(data.len().saturating_mul(4));
    decoder
        .read_to_end(&mut output)
        .map_err(|e| Error::Decompression(e.to_string()))?;

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zstd_roundtrip() {
        let original = b"SARC payload compressed the way the game ships it.";
        let compressed = zstd::encode_all(&original[..], 3).unwrap();

        assert!(is_zstd(&compressed));
        assert_eq!(decompress_zstd(&compressed).unwrap(), original);
    }

    #[test]
    fn test_garbage_rejected() {
        let result = decompress_zstd(b"definitely not zstd");
        assert!(matches!(result, Err(Error::Decompression(_))));
        assert!(!is_zstd(b"SARC"));
    }
}
