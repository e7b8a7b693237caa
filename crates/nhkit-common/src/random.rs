//! `sead::Random`, the xorshift128 generator used by the game.
//!
//! The seeding and 64-bit stepping are specific to Nintendo's sead library
//! and must be reproduced exactly: the save cipher derives its AES key and
//! counter from this generator.

use std::time::{SystemTime, UNIX_EPOCH};

const SEED_MULTIPLIER: u32 = 0x6C07_8965;

/// sead's four-word xorshift generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Random {
    context: [u32; 4],
}

impl Random {
    /// Seed the generator from a single word.
    pub fn new(seed: u32) -> Self {
        let mut context = [0u32; 4];
        let mut seed = seed;
        for (i, word) in context.iter_mut().enumerate() {
            *word = SEED_MULTIPLIER
                .wrapping_mul(seed ^ (seed >> 30))
                .wrapping_add(i as u32 + 1);
            seed = *word;
        }
        Self { context }
    }

    /// Set up the generator state directly.
    ///
    /// An all-zero state would be stuck at zero, so it is replaced by the
    /// state of `Random::new(0)`.
    pub fn from_context(c0: u32, c1: u32, c2: u32, c3: u32) -> Self {
        if (c0 | c1 | c2 | c3) == 0 {
            return Self::new(0);
        }
        Self {
            context: [c0, c1, c2, c3],
        }
    }

    /// Seed the generator from the low word of the system clock.
    pub fn from_entropy() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u32)
            .unwrap_or(0);
        Self::new(nanos)
    }

    #[inline]
    fn mix(x: u32) -> u32 {
        let t = x ^ (x << 11);
        t ^ (t >> 8)
    }

    /// Advance the generator and return the next 32-bit value.
    pub fn next_u32(&mut self) -> u32 {
        let [c0, c1, c2, c3] = self.context;
        let next = Self::mix(c0) ^ c3 ^ (c3 >> 19);
        self.context = [c1, c2, c3, next];
        next
    }

    /// Advance the generator by two words and return them as one value.
    pub fn next_u64(&mut self) -> u64 {
        let [c0, c1, c2, c3] = self.context;
        let s0 = Self::mix(c0) ^ c3;
        let s1 = Self::mix(c1) ^ s0 ^ (c3 >> 19);
        let hi = s0 ^ (c3 >> 19);
        let lo = s1 ^ (s0 >> 19);
        self.context = [c2, c3, hi, lo];
        (u64::from(hi) << 32) | u64::from(lo)
    }

    /// The current generator state.
    #[inline]
    pub fn context(&self) -> [u32; 4] {
        self.context
    }
}

impl Default for Random {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_zero_context() {
        let rng = Random::new(0);
        assert_eq!(rng.context(), [1, 0x6C07_8967, 0x714A_CB41, 0x4807_7044]);
    }

    #[test]
    fn test_zero_context_falls_back_to_seed_zero() {
        assert_eq!(Random::from_context(0, 0, 0, 0), Random::new(0));
        assert_eq!(Random::from_context(1, 2, 3, 4).context(), [1, 2, 3, 4]);
    }

    #[test]
    fn test_seeded_context() {
        let rng = Random::new(0x1234_5678);
        assert_eq!(
            rng.context(),
            [0x2E34_5559, 0x1DC1_4D1F, 0x5F62_043E, 0xC7AA_63DF]
        );
    }

    #[test]
    fn test_u32_sequence() {
        let mut rng = Random::new(0);
        let values: Vec<u32> = (0..4).map(|_| rng.next_u32()).collect();
        assert_eq!(values, [0x4807_714D, 0x181B_859B, 0x3F2C_551A, 0x4CDA_87EB]);
    }

    #[test]
    fn test_u64_sequence() {
        let mut rng = Random::new(0);
        assert_eq!(rng.next_u64(), 0x4807_714D_181B_859B);
        assert_eq!(rng.next_u64(), 0x3F2C_551A_4CDA_87EB);
    }

    #[test]
    fn test_state_after_draws() {
        let mut rng = Random::new(42);
        let values: Vec<u32> = (0..3).map(|_| rng.next_u32()).collect();
        assert_eq!(values, [0xE991_C14B, 0x92CA_00B2, 0xACF4_55FD]);
        assert_eq!(
            rng.context(),
            [0xB4A4_AD5E, 0xE991_C14B, 0x92CA_00B2, 0xACF4_55FD]
        );
    }
}
