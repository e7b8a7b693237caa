//! Error types for BYAML parsing and querying.

use thiserror::Error;

use crate::NodeType;

/// Errors that can occur when parsing or querying BYAML documents.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error while reading the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The buffer cannot even hold the fixed header.
    #[error("buffer too small for a BYAML header: {0} bytes")]
    BufferTooSmall(usize),

    /// Neither `YB` nor `BY` at the start of the buffer.
    #[error("invalid BYAML magic: expected 'YB', got {actual:?}")]
    InvalidMagic { actual: [u8; 2] },

    /// A big-endian (`BY`) document.
    #[error("big-endian BYAML documents are not supported")]
    UnsupportedEndianness,

    /// Version outside the supported 1..=4 range.
    #[error("unsupported BYAML version {0} (expected 1 to 4)")]
    InvalidVersion(u16),

    /// The root node is not an array or hash.
    #[error("root node must be an array or hash, got tag {0:#04x}")]
    InvalidRootType(u8),

    /// Structural failure anywhere in the document body.
    #[error("failed to parse BYAML: {0}")]
    ParseFailed(String),

    /// An accessor was used on a node of another kind.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: NodeType, actual: NodeType },

    /// JSON serialization failed.
    #[cfg(feature = "json-export")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<nhkit_common::Error> for Error {
    fn from(err: nhkit_common::Error) -> Self {
        match err {
            nhkit_common::Error::Io(e) => Error::Io(e),
            other => Error::ParseFailed(other.to_string()),
        }
    }
}

/// Result type for BYAML operations.
pub type Result<T> = std::result::Result<T, Error>;
