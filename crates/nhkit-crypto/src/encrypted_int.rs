//! Obfuscated integers stored in save data.
//!
//! Bells, loan amounts and Nook Miles are kept as a packed 64-bit value:
//!
//! ```text
//! bits  0..32  encrypted amount
//! bits 32..48  adjust
//! bits 48..56  shift (0..=26)
//! bits 56..64  checksum of the amount
//! ```

use nhkit_common::Random;

use crate::{Error, Result};

const ENCRYPT_CONSTANT: u32 = 0x80E3_2B11;
const SHIFT_BASE: u32 = 3;
const MAX_SHIFT: u8 = 26;

/// Checksum byte for an encrypted amount.
#[inline]
pub fn checksum(amount: u32) -> u8 {
    let sum = amount
        .wrapping_add(amount >> 8)
        .wrapping_add(amount >> 16)
        .wrapping_add(amount >> 24);
    (sum as u8).wrapping_sub(0x2D)
}

/// A packed encrypted integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EncryptedInt(u64);

impl EncryptedInt {
    /// Wrap a packed value read from a save.
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The packed 64-bit value.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn amount(self) -> u32 {
        self.0 as u32
    }

    #[inline]
    pub const fn adjust(self) -> u16 {
        (self.0 >> 32) as u16
    }

    #[inline]
    pub const fn shift(self) -> u8 {
        (self.0 >> 48) as u8
    }

    #[inline]
    pub const fn checksum(self) -> u8 {
        (self.0 >> 56) as u8
    }

    /// Encrypt `value` with a freshly seeded generator.
    pub fn encrypt(value: u32) -> Self {
        Self::encrypt_with(value, &mut Random::from_entropy())
    }

    /// Encrypt `value`, drawing the adjust and shift from `rng`.
    pub fn encrypt_with(value: u32, rng: &mut Random) -> Self {
        let adjust = (rng.next_u32() >> 16) as u16;
        let shift = ((u64::from(rng.next_u32()) * 0x1B) >> 32) as u8;

        let base = value.wrapping_add(u32::from(adjust)).wrapping_sub(ENCRYPT_CONSTANT);
        let spread = u64::from(base) << (u32::from(shift) + SHIFT_BASE);
        let amount = ((spread >> 32) as u32).wrapping_add(spread as u32);

        Self(
            u64::from(amount)
                | u64::from(adjust) << 32
                | u64::from(shift) << 48
                | u64::from(checksum(amount)) << 56,
        )
    }

    /// Recover the plain value.
    ///
    /// An all-zero packed value decrypts to zero, as in a fresh save.
    pub fn decrypt(self) -> Result<u32> {
        if self.0 == 0 {
            return Ok(0);
        }

        let expected = checksum(self.amount());
        if expected != self.checksum() {
            return Err(Error::ChecksumMismatch {
                expected,
                actual: self.checksum(),
            });
        }
        if self.shift() > MAX_SHIFT {
            return Err(Error::InvalidShift(self.shift()));
        }

        let spread = u64::from(self.amount()) << (32 - SHIFT_BASE - u32::from(self.shift()));
        Ok(ENCRYPT_CONSTANT
            .wrapping_sub(u32::from(self.adjust()))
            .wrapping_add(spread as u32)
            .wrapping_add((spread >> 32) as u32))
    }
}

impl From<u64> for EncryptedInt {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        let mut rng = Random::new(0);

        let zero = EncryptedInt::encrypt_with(0, &mut rng);
        assert_eq!(zero.raw(), 0xC602_4807_E3A3_9ECF);
        assert_eq!(zero.adjust(), 18439);
        assert_eq!(zero.shift(), 2);

        let one = EncryptedInt::encrypt_with(1, &mut rng);
        assert_eq!(one.raw(), 0x3608_3F2C_E8A0_E3F8);

        assert_eq!(zero.decrypt().unwrap(), 0);
        assert_eq!(one.decrypt().unwrap(), 1);
    }

    #[test]
    fn test_roundtrip_across_shifts() {
        let mut rng = Random::new(42);
        for value in [0, 1, 99_999, 1_000_000, u32::MAX] {
            for _ in 0..16 {
                let packed = EncryptedInt::encrypt_with(value, &mut rng);
                assert!(packed.shift() <= MAX_SHIFT);
                assert_eq!(packed.decrypt().unwrap(), value);
            }
        }
    }

    #[test]
    fn test_entropy_roundtrip() {
        assert_eq!(EncryptedInt::encrypt(12_345).decrypt().unwrap(), 12_345);
    }

    #[test]
    fn test_zero_decrypts_to_zero() {
        assert_eq!(EncryptedInt::from_raw(0).decrypt().unwrap(), 0);
        assert_eq!(checksum(0), 0xD3);
    }

    #[test]
    fn test_checksum_mismatch() {
        let packed = EncryptedInt::from_raw(0xC602_4807_E3A3_9ECF ^ (1 << 56));
        assert!(matches!(
            packed.decrypt(),
            Err(Error::ChecksumMismatch { expected: 0xC6, actual: 0xC7 })
        ));
    }

    #[test]
    fn test_invalid_shift() {
        let amount = 0x1234_5678u32;
        let raw = u64::from(amount) | 27u64 << 48 | u64::from(checksum(amount)) << 56;
        assert!(matches!(
            EncryptedInt::from_raw(raw).decrypt(),
            Err(Error::InvalidShift(27))
        ));
    }
}
