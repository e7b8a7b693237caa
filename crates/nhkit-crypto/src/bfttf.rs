//! BFTTF/BFOTF font obfuscation.
//!
//! ```text
//! [0x0] platform magic (u32 LE)
//! [0x4] font size ^ key (u32 BE)
//! [0x8] font words ^ key (u32 BE each)
//! ```

use std::fmt;

use crate::{Error, Result};

const HEADER_SIZE: usize = 8;

/// Platform a font file was built for. Each uses its own XOR key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    Switch,
    WiiU,
}

impl Platform {
    /// Magic at the start of the file.
    pub const fn magic(self) -> u32 {
        match self {
            Platform::Windows => 0x1A87_9BD9,
            Platform::Switch => 0x1E1A_F836,
            Platform::WiiU => 0xC1DE_68F3,
        }
    }

    /// XOR key for size and payload words.
    pub const fn key(self) -> u32 {
        match self {
            Platform::Windows => 0xA601_8502,
            Platform::Switch => 0x4962_1806,
            Platform::WiiU => 0x8CF2_DCD9,
        }
    }

    pub fn from_magic(magic: u32) -> Option<Self> {
        [Platform::Windows, Platform::Switch, Platform::WiiU]
            .into_iter()
            .find(|p| p.magic() == magic)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Platform::Windows => "Windows",
            Platform::Switch => "Switch",
            Platform::WiiU => "Wii U",
        })
    }
}

/// Identify the platform of an obfuscated font.
pub fn detect(data: &[u8]) -> Result<Platform> {
    let magic = data
        .first_chunk::<4>()
        .map(|b| u32::from_le_bytes(*b))
        .ok_or(nhkit_common::Error::UnexpectedEof {
            offset: 0,
            needed: 4,
            available: data.len(),
        })?;
    Platform::from_magic(magic).ok_or(Error::UnknownPlatform(magic))
}

fn xor_words(data: &mut [u8], key: u32) {
    let key = key.to_be_bytes();
    for chunk in data.chunks_mut(4) {
        for (b, k) in chunk.iter_mut().zip(key) {
            *b ^= k;
        }
    }
}

/// Recover the plain font from an obfuscated file.
pub fn decrypt(data: &[u8]) -> Result<Vec<u8>> {
    let platform = detect(data)?;
    let key = platform.key();

    let raw_size = data
        .get(4..HEADER_SIZE)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or(nhkit_common::Error::UnexpectedEof {
            offset: 4,
            needed: 4,
            available: data.len().saturating_sub(4),
        })?;
    let size = raw_size ^ key;
    if size == 0 || size as usize > data.len() {
        return Err(Error::InvalidSize {
            size,
            file_size: data.len(),
        });
    }

    let payload = &data[HEADER_SIZE..];
    let mut font = payload[..payload.len().min(size as usize)].to_vec();
    xor_words(&mut font, key);

    tracing::debug!(%platform, size, "decrypted font");
    Ok(font)
}

/// Obfuscate a plain font for `platform`. The payload is zero-padded to
/// a whole number of words.
pub fn encrypt(font: &[u8], platform: Platform) -> Vec<u8> {
    let key = platform.key();
    let mut out = Vec::with_capacity(HEADER_SIZE + font.len().next_multiple_of(4));
    out.extend_from_slice(&platform.magic().to_le_bytes());
    out.extend_from_slice(&((font.len() as u32) ^ key).to_be_bytes());

    let start = out.len();
    out.extend_from_slice(font);
    out.resize(start + font.len().next_multiple_of(4), 0);
    xor_words(&mut out[start..], key);
    out
}
