//! BYAML file header.

use nhkit_common::{BinaryReader, Endian};

use crate::{Error, Result};

/// The fixed 16-byte header at the start of every BYAML document.
///
/// ```text
/// [0x00] Magic "YB" (little-endian) or "BY" (big-endian)
/// [0x02] Version (u16, 1..=4)
/// [0x04] Hash key table offset (u32, 0 = absent)
/// [0x08] String table offset (u32, 0 = absent)
/// [0x0C] Root node offset (u32)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByamlHeader {
    /// Document version.
    pub version: u16,
    /// Offset of the hash key table, if present.
    pub hash_key_table_offset: Option<u32>,
    /// Offset of the string value table, if present.
    pub string_table_offset: Option<u32>,
    /// Offset of the root node.
    pub root_offset: u32,
}

impl ByamlHeader {
    /// Little-endian magic.
    pub const MAGIC_LE: &'static [u8; 2] = b"YB";

    /// Big-endian magic.
    pub const MAGIC_BE: &'static [u8; 2] = b"BY";

    /// Size of the fixed header.
    pub const SIZE: usize = 0x10;

    /// Location of the root node's inline slot.
    pub const ROOT_SLOT: usize = 0x0C;

    /// Supported version range.
    pub const VERSIONS: std::ops::RangeInclusive<u16> = 1..=4;

    /// Validate the magic and version and read the table offsets.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(Error::BufferTooSmall(data.len()));
        }

        let magic = [data[0], data[1]];
        let endian = match &magic {
            m if m == Self::MAGIC_LE => Endian::Little,
            m if m == Self::MAGIC_BE => return Err(Error::UnsupportedEndianness),
            _ => return Err(Error::InvalidMagic { actual: magic }),
        };

        let reader = BinaryReader::with_endian(data, endian);
        let version = reader.u16_at(0x2)?;
        if !Self::VERSIONS.contains(&version) {
            return Err(Error::InvalidVersion(version));
        }

        let non_zero = |offset: u32| (offset != 0).then_some(offset);

        Ok(Self {
            version,
            hash_key_table_offset: non_zero(reader.u32_at(0x4)?),
            string_table_offset: non_zero(reader.u32_at(0x8)?),
            root_offset: reader.u32_at(Self::ROOT_SLOT)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(magic: &[u8; 2], version: u16) -> Vec<u8> {
        let mut data = magic.to_vec();
        data.extend_from_slice(&version.to_le_bytes());
        data.extend_from_slice(&0x20u32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&0x10u32.to_le_bytes());
        data
    }

    #[test]
    fn test_parse_header() {
        let parsed = ByamlHeader::parse(&header(b"YB", 3)).unwrap();
        assert_eq!(parsed.version, 3);
        assert_eq!(parsed.hash_key_table_offset, Some(0x20));
        assert_eq!(parsed.string_table_offset, None);
        assert_eq!(parsed.root_offset, 0x10);
    }

    #[test]
    fn test_big_endian_rejected() {
        let result = ByamlHeader::parse(&header(b"BY", 3));
        assert!(matches!(result, Err(Error::UnsupportedEndianness)));
    }

    #[test]
    fn test_invalid_magic() {
        let result = ByamlHeader::parse(&header(b"XX", 3));
        assert!(matches!(result, Err(Error::InvalidMagic { actual }) if &actual == b"XX"));
    }

    #[test]
    fn test_version_bounds() {
        for version in [0u16, 5, 0xFFFF] {
            let result = ByamlHeader::parse(&header(b"YB", version));
            assert!(matches!(result, Err(Error::InvalidVersion(v)) if v == version));
        }
        for version in 1u16..=4 {
            assert!(ByamlHeader::parse(&header(b"YB", version)).is_ok());
        }
    }

    #[test]
    fn test_short_buffer() {
        assert!(matches!(ByamlHeader::parse(b"YB\x01\x00"), Err(Error::BufferTooSmall(4))));
    }
}
