//! Save file header and the AES-128-CTR save cipher.
//!
//! ```text
//! [0x000] SaveVersion        game version of the last write
//! [0x010] reserved           0x30 bytes
//! [0x040] SaveVersion        game version at creation
//! [0x050] reserved           0xB0 bytes
//! [0x100] key words          128 x u32
//! ```
//!
//! The AES key and initial counter are derived from the key words, which
//! the game reseeds on every save.

use std::path::Path;

use aes::Aes128;
use cipher::generic_array::GenericArray;
use cipher::{BlockEncrypt, KeyInit};
use nhkit_common::{BinaryReader, Random};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::{Error, Result};

/// Size of the save header in bytes.
pub const SAVE_HEADER_SIZE: usize = 0x300;

/// Number of u32 key words in the header.
pub const KEY_WORD_COUNT: usize = 0x80;

const BLOCK_SIZE: usize = 16;

/// A game version stamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct SaveVersion {
    pub major: u32,
    pub minor: u32,
    pub header_version: u32,
    pub crypto_version: u16,
    pub rom_release: u16,
}

/// The 0x300-byte header stored next to each encrypted save file.
#[derive(Debug, Clone, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct SaveHeader {
    /// Version that last wrote the save.
    pub version: SaveVersion,
    reserved: [u8; 0x30],
    /// Version that created the save.
    pub created: SaveVersion,
    padding: [u8; 0xB0],
    /// Words the key and counter are derived from.
    pub key_words: [u32; KEY_WORD_COUNT],
}

impl SaveHeader {
    /// Read a header file from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::parse(&data)
    }

    /// Parse a header from the start of a buffer.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < SAVE_HEADER_SIZE {
            return Err(Error::HeaderTooSmall {
                expected: SAVE_HEADER_SIZE,
                actual: data.len(),
            });
        }
        let header: SaveHeader = BinaryReader::new(data).read_struct()?;
        tracing::debug!(
            major = header.version.major,
            minor = header.version.minor,
            crypto = header.version.crypto_version,
            "parsed save header"
        );
        Ok(header)
    }

    /// Serialize the header back to its on-disk form.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    /// Replace the key words with a fresh sequence from `seed`.
    pub fn regenerate(&mut self, seed: u32) {
        let mut rng = Random::new(seed);
        for word in &mut self.key_words {
            *word = rng.next_u32();
        }
    }

    /// The AES-128 key.
    pub fn key(&self) -> [u8; BLOCK_SIZE] {
        derive_param(&self.key_words, 0)
    }

    /// The initial CTR counter block.
    pub fn counter(&self) -> [u8; BLOCK_SIZE] {
        derive_param(&self.key_words, 2)
    }

    /// Encrypt or decrypt a save body in place.
    pub fn crypt(&self, data: &mut [u8]) {
        tracing::debug!(len = data.len(), "applying save cipher");
        aes_ctr(&self.key(), &self.counter(), data);
    }
}

/// Derive a 16-byte parameter from two selector words.
fn derive_param(words: &[u32; KEY_WORD_COUNT], index: usize) -> [u8; BLOCK_SIZE] {
    let pick = |i: usize| words[(words[i] & 0x7F) as usize];

    let mut rng = Random::new(pick(index));
    let rolls = (pick(index + 1) & 0xF) + 1;
    for _ in 0..rolls {
        rng.next_u64();
    }

    let mut out = [0u8; BLOCK_SIZE];
    for byte in &mut out {
        *byte = (rng.next_u32() >> 24) as u8;
    }
    out
}

/// AES-128-CTR keystream XOR with a 128-bit big-endian counter.
pub fn aes_ctr(key: &[u8; BLOCK_SIZE], counter: &[u8; BLOCK_SIZE], data: &mut [u8]) {
    let cipher = Aes128::new(GenericArray::from_slice(key));
    let mut counter = u128::from_be_bytes(*counter);

    for chunk in data.chunks_mut(BLOCK_SIZE) {
        let mut block = GenericArray::from(counter.to_be_bytes());
        cipher.encrypt_block(&mut block);
        for (b, k) in chunk.iter_mut().zip(block.iter()) {
            *b ^= k;
        }
        counter = counter.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank() -> SaveHeader {
        SaveHeader::parse(&[0u8; SAVE_HEADER_SIZE]).unwrap()
    }

    fn bytes16(s: &str) -> [u8; 16] {
        hex::decode(s).unwrap().try_into().unwrap()
    }

    #[test]
    fn test_layout() {
        assert_eq!(std::mem::size_of::<SaveVersion>(), 0x10);
        assert_eq!(std::mem::size_of::<SaveHeader>(), SAVE_HEADER_SIZE);

        let mut data = vec![0u8; SAVE_HEADER_SIZE];
        data[0x00..0x04].copy_from_slice(&2u32.to_le_bytes());
        data[0x0E..0x10].copy_from_slice(&0x1Bu16.to_le_bytes());
        data[0x40..0x44].copy_from_slice(&1u32.to_le_bytes());
        data[0x100..0x104].copy_from_slice(&0xDEADBEEFu32.to_le_bytes());
        data[0x2FC..0x300].copy_from_slice(&7u32.to_le_bytes());

        let header = SaveHeader::parse(&data).unwrap();
        assert_eq!(header.version.major, 2);
        assert_eq!(header.version.rom_release, 0x1B);
        assert_eq!(header.created.major, 1);
        assert_eq!(header.key_words[0], 0xDEADBEEF);
        assert_eq!(header.key_words[KEY_WORD_COUNT - 1], 7);
        assert_eq!(header.to_bytes(), data);
    }

    #[test]
    fn test_too_small() {
        assert!(matches!(
            SaveHeader::parse(&[0u8; 0x2FF]),
            Err(Error::HeaderTooSmall { expected: 0x300, actual: 0x2FF })
        ));
    }

    #[test]
    fn test_regenerated_params() {
        let mut header = blank();
        header.regenerate(0x1234);
        assert_eq!(
            header.key_words[..4],
            [0x8AC2F1E2, 0x1301A8BE, 0xD67C5DDD, 0x1A2F51B4]
        );
        assert_eq!(header.key(), bytes16("9cd233af3c110c7e045bcbba818a8b57"));
        assert_eq!(header.counter(), bytes16("70b3a8dfd94538fc06ba7c924b3b3488"));

        let mut data: Vec<u8> = (0..40).collect();
        header.crypt(&mut data);
        assert_eq!(
            hex::encode(&data),
            "264729e8bea79ce7ff980c2486709fa1caa926b4d4065ad4c7f267d1dfcd08dda9e557f73a972c3a"
        );

        header.crypt(&mut data);
        assert_eq!(data, (0..40).collect::<Vec<u8>>());
    }

    #[test]
    fn test_ctr_known_answer() {
        let key = bytes16("2b7e151628aed2a6abf7158809cf4f3c");
        let counter = bytes16("f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff");
        let mut data = hex::decode(
            "6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e51",
        )
        .unwrap();
        aes_ctr(&key, &counter, &mut data);
        assert_eq!(
            hex::encode(&data),
            "874d6191b620e3261bef6864990db6ce9806f66b7970fdff8617187bb9fffdff"
        );
    }

    #[test]
    fn test_counter_wraps() {
        let key = bytes16("2b7e151628aed2a6abf7158809cf4f3c");
        let mut data = [0u8; 32];
        aes_ctr(&key, &[0xFF; 16], &mut data);
        assert_eq!(
            hex::encode(data),
            "8af2860142f786f409307c1a3f7eaaac7df76b0c1ab899b33e42f047b91b546f"
        );
    }

    #[test]
    fn test_open() {
        let mut header = blank();
        header.regenerate(1);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mainHeader.dat");
        std::fs::write(&path, header.to_bytes()).unwrap();

        let loaded = SaveHeader::open(&path).unwrap();
        assert_eq!(loaded.key_words, header.key_words);
        assert_eq!(loaded.key(), header.key());
    }
}
