//! Typed BCSV field values.
//!
//! BCSV stores no column types. The type of a field is inferred from its
//! width in the row, and 4-byte fields are further split into floats and
//! integers by looking at the bit pattern.

use std::fmt;

/// A single decoded field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// 1-byte field.
    UInt8(u8),
    /// 2-byte field.
    UInt16(u16),
    /// 4-byte field that does not look like a float.
    UInt32(u32),
    /// 4-byte field whose bits form a positive normal float.
    Float(f32),
    /// Any other width: bytes up to the first NUL in the slot.
    String(String),
}

/// Whether a 4-byte field should be read as a float.
///
/// Zero reads as an integer. Anything else is a float when its value is a
/// finite number in the positive normal range.
pub fn looks_like_float(bits: u32) -> bool {
    if bits == 0 {
        return false;
    }
    let value = f32::from_bits(bits);
    (f32::MIN_POSITIVE..=f32::MAX).contains(&value)
}

impl FieldValue {
    /// Decode a field from its slot within a row.
    pub(crate) fn decode(slot: &[u8]) -> Self {
        match *slot {
            [b] => FieldValue::UInt8(b),
            [a, b] => FieldValue::UInt16(u16::from_le_bytes([a, b])),
            [a, b, c, d] => {
                let bits = u32::from_le_bytes([a, b, c, d]);
                if looks_like_float(bits) {
                    FieldValue::Float(f32::from_bits(bits))
                } else {
                    FieldValue::UInt32(bits)
                }
            }
            _ => {
                let end = memchr::memchr(0, slot).unwrap_or(slot.len());
                FieldValue::String(String::from_utf8_lossy(&slot[..end]).into_owned())
            }
        }
    }

    /// Try to get this value as a u32.
    #[inline]
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            FieldValue::UInt8(v) => Some(*v as u32),
            FieldValue::UInt16(v) => Some(*v as u32),
            FieldValue::UInt32(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get this value as an f32.
    #[inline]
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            FieldValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get this value as a string.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::UInt8(_) => "UInt8",
            FieldValue::UInt16(_) => "UInt16",
            FieldValue::UInt32(_) => "UInt32",
            FieldValue::Float(_) => "Float",
            FieldValue::String(_) => "String",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::UInt8(v) => write!(f, "{v}"),
            FieldValue::UInt16(v) => write!(f, "{v}"),
            FieldValue::UInt32(v) => write!(f, "{v}"),
            FieldValue::Float(v) => write!(f, "{v:.6}"),
            FieldValue::String(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_heuristic() {
        assert!(!looks_like_float(0));
        assert!(looks_like_float(1.0f32.to_bits()));
        assert!(looks_like_float(f32::MAX.to_bits()));
        assert!(!looks_like_float((-1.0f32).to_bits()));
        assert!(!looks_like_float(f32::INFINITY.to_bits()));
        assert!(!looks_like_float(f32::NAN.to_bits()));
        // Small integers are subnormal floats.
        assert!(!looks_like_float(1234));
    }

    #[test]
    fn test_decode_by_width() {
        assert_eq!(FieldValue::decode(&[7]), FieldValue::UInt8(7));
        assert_eq!(FieldValue::decode(&[0x34, 0x12]), FieldValue::UInt16(0x1234));
        assert_eq!(FieldValue::decode(&100u32.to_le_bytes()), FieldValue::UInt32(100));
        assert_eq!(FieldValue::decode(&2.5f32.to_le_bytes()), FieldValue::Float(2.5));
        assert_eq!(
            FieldValue::decode(b"Apple\0\0\0"),
            FieldValue::String("Apple".into())
        );
        assert_eq!(FieldValue::decode(b"FullSlot"), FieldValue::String("FullSlot".into()));
    }

    #[test]
    fn test_display() {
        assert_eq!(FieldValue::Float(0.5).to_string(), "0.500000");
        assert_eq!(FieldValue::UInt16(9).to_string(), "9");
        assert_eq!(FieldValue::String("x".into()).to_string(), "x");
    }
}
