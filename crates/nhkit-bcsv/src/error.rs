//! Error types for BCSV parsing.

use thiserror::Error;

/// Errors that can occur when working with BCSV tables.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] nhkit_common::Error),

    /// Row count, row size or column count is zero.
    #[error("invalid BCSV header: {rows} rows of {row_size} bytes, {columns} columns")]
    InvalidHeader { rows: u32, row_size: u32, columns: u16 },

    /// Version 1 table without the `VSCB` magic.
    #[error("invalid BCSV magic: expected 'VSCB', got {0:?}")]
    InvalidMagic([u8; 4]),

    /// Unsupported table version.
    #[error("unsupported BCSV version: {0} (expected 0 or 1)")]
    InvalidVersion(u8),

    /// A column offset lies outside the row or before the previous column.
    #[error("invalid offset {offset:#x} for column {index} (row size {row_size:#x})")]
    InvalidColumn {
        index: usize,
        offset: u32,
        row_size: u32,
    },
}

/// Result type for BCSV operations.
pub type Result<T> = std::result::Result<T, Error>;
