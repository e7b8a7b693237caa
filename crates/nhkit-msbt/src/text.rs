//! Message text decoding and control-tag removal.
//!
//! Inline control tags carry formatting, ruby text and item-name variants:
//!
//! ```text
//! 0x0E, group, type, param size (bytes), params...   opening tag
//! 0x0F, group, type                                   closing tag
//! ```
//!
//! Every field is one code unit wide except the params, which are counted
//! in bytes.

use nhkit_common::Endian;

/// Character encoding of an MSBT file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Utf16,
}

impl Encoding {
    /// Map the header's encoding byte.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Encoding::Utf8),
            1 => Some(Encoding::Utf16),
            _ => None,
        }
    }

    /// Size of one code unit in bytes.
    #[inline]
    pub const fn unit_size(self) -> usize {
        match self {
            Encoding::Utf8 => 1,
            Encoding::Utf16 => 2,
        }
    }
}

const TAG_OPEN: u16 = 0x0E;
const TAG_CLOSE: u16 = 0x0F;

/// Raw text split into code units.
struct Units<'a> {
    raw: &'a [u8],
    encoding: Encoding,
    endian: Endian,
}

impl Units<'_> {
    fn len(&self) -> usize {
        self.raw.len() / self.encoding.unit_size()
    }

    fn get(&self, index: usize) -> Option<u16> {
        match self.encoding {
            Encoding::Utf8 => self.raw.get(index).map(|&b| b as u16),
            Encoding::Utf16 => {
                let bytes = self.raw.get(index * 2..index * 2 + 2)?;
                Some(match self.endian {
                    Endian::Little => u16::from_le_bytes([bytes[0], bytes[1]]),
                    Endian::Big => u16::from_be_bytes([bytes[0], bytes[1]]),
                })
            }
        }
    }
}

/// Decode raw message bytes, dropping trailing NULs.
pub fn decode(raw: &[u8], encoding: Encoding, endian: Endian) -> String {
    let text = match encoding {
        Encoding::Utf8 => String::from_utf8_lossy(raw).into_owned(),
        Encoding::Utf16 => {
            let units = Units { raw, encoding, endian };
            let iter = (0..units.len()).filter_map(|i| units.get(i));
            char::decode_utf16(iter)
                .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect()
        }
    };
    text.trim_end_matches('\0').to_string()
}

/// Remove inline control tags from raw message bytes.
pub fn strip_tags(raw: &[u8], encoding: Encoding, endian: Endian) -> Vec<u8> {
    let units = Units { raw, encoding, endian };
    let unit = encoding.unit_size();
    let mut out = Vec::with_capacity(raw.len());

    let mut i = 0;
    while i < units.len() {
        match units.get(i) {
            Some(TAG_OPEN) => {
                let params = units.get(i + 3).unwrap_or(0) as usize;
                i += 4 + params.div_ceil(unit);
            }
            Some(TAG_CLOSE) => i += 3,
            Some(_) => {
                out.extend_from_slice(&raw[i * unit..(i + 1) * unit]);
                i += 1;
            }
            None => break,
        }
    }
    out
}
