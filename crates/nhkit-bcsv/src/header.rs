//! Fixed-layout BCSV records.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// The 12-byte table header.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct BcsvHeader {
    /// Number of rows.
    pub row_count: u32,
    /// Size of one row in bytes.
    pub row_size: u32,
    /// Number of columns.
    pub column_count: u16,
    /// Table version (0 or 1).
    pub version: u8,
    /// Zero when enum columns hold Japanese names.
    pub flag: u8,
}

impl BcsvHeader {
    /// Magic that follows the header in version 1 tables.
    pub const MAGIC_V1: &'static [u8; 4] = b"VSCB";

    /// Offset of the column table for a given version.
    pub const fn column_table_offset(version: u8) -> Option<usize> {
        match version {
            0 => Some(0x0C),
            1 => Some(0x1C),
            _ => None,
        }
    }
}

/// One column definition: a hash of the column name and the field's
/// byte offset within each row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct BcsvColumn {
    /// Hash of the column name.
    pub hash: u32,
    /// Byte offset within the row.
    pub offset: u32,
}
