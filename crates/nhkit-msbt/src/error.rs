//! Error types for MSBT parsing.

use thiserror::Error;

/// Errors that can occur when working with MSBT files.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] nhkit_common::Error),

    /// Byte order mark is neither little- nor big-endian.
    #[error("invalid byte order mark: {0:02X?}")]
    InvalidBom([u8; 2]),

    /// Encoding byte other than UTF-8 (0) or UTF-16 (1).
    #[error("unsupported MSBT encoding: {0}")]
    UnsupportedEncoding(u8),

    /// The header declares no sections.
    #[error("MSBT file has no sections")]
    NoSections,

    /// A text or label lies outside its section.
    #[error("failed to parse MSBT: {0}")]
    ParseFailed(String),
}

/// Result type for MSBT operations.
pub type Result<T> = std::result::Result<T, Error>;
