//! Error types for the crypto crate.

use thiserror::Error;

/// Errors that can occur when encrypting or decrypting game data.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] nhkit_common::Error),

    /// Encrypted integer whose checksum byte does not match its amount.
    #[error("encrypted integer checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    /// Encrypted integer with a shift the game never produces.
    #[error("encrypted integer shift {0} out of range (max 26)")]
    InvalidShift(u8),

    /// Save header shorter than 0x300 bytes.
    #[error("save header too small: expected {expected:#x} bytes, got {actual:#x}")]
    HeaderTooSmall { expected: usize, actual: usize },

    /// Font file with an unrecognized platform magic.
    #[error("unknown BFTTF platform magic: {0:#010x}")]
    UnknownPlatform(u32),

    /// Decoded font size is zero or larger than the file.
    #[error("invalid BFTTF font size {size:#x} for a file of {file_size:#x} bytes")]
    InvalidSize { size: u32, file_size: usize },
}

/// Result type for crypto operations.
pub type Result<T> = std::result::Result<T, Error>;
