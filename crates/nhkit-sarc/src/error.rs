//! Error types for the SARC crate.

use thiserror::Error;

/// Errors that can occur when working with SARC archives.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error (short reads, bad section magic).
    #[error("{0}")]
    Common(#[from] nhkit_common::Error),

    /// Byte order mark is neither little- nor big-endian.
    #[error("invalid byte order mark: {0:02X?}")]
    InvalidBom([u8; 2]),

    /// Big-endian archive.
    #[error("big-endian SARC archives are not supported")]
    UnsupportedEndianness,

    /// A section header declares an unexpected size.
    #[error("invalid {section} header size: expected {expected:#x}, got {actual:#x}")]
    InvalidHeaderSize {
        section: &'static str,
        expected: u16,
        actual: u16,
    },

    /// Unsupported archive version.
    #[error("unsupported SARC version: {0:#06x}")]
    UnsupportedVersion(u16),

    /// Node count does not fit in 14 bits.
    #[error("too many files in archive: {0}")]
    TooManyFiles(u16),

    /// The name table starts after the data region.
    #[error("name table at {name_table:#x} starts after data offset {data_offset:#x}")]
    DataBeforeNameTable { name_table: usize, data_offset: usize },

    /// Structural failure in the node table.
    #[error("failed to parse SARC: {0}")]
    ParseFailed(String),

    /// Decompression error.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// Entry not found.
    #[error("entry not found: {0}")]
    EntryNotFound(String),
}

/// Result type for SARC operations.
pub type Result<T> = std::result::Result<T, Error>;
