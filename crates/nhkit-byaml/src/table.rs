//! String tables referenced from the BYAML header.

use nhkit_common::BinaryReader;

use crate::{Error, NodeType, Result};

/// An index-addressed list of strings decoded from a table block.
///
/// The document has two of these: one for hash keys and one for string
/// values. Both are built before any node is decoded.
///
/// ```text
/// [0x00] Tag (0xC2)
/// [0x01] Count (u24)
/// [0x04] Count x u32 offsets, relative to the table start
///        each pointing at a null-terminated string
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringTable {
    strings: Vec<String>,
}

impl StringTable {
    /// Decode the table block at `offset`.
    pub fn parse(reader: &BinaryReader<'_>, offset: usize) -> Result<Self> {
        let tag = reader.u8_at(offset)?;
        if tag != NodeType::StringTable.tag() {
            return Err(Error::ParseFailed(format!(
                "expected string table tag at {offset:#x}, got {tag:#04x}"
            )));
        }

        let count = reader.u24_at(offset + 1)? as usize;
        // Make sure the offset array is really there before allocating for it.
        reader.bytes_at(offset + 4, count * 4)?;

        let mut strings = Vec::with_capacity(count);
        for i in 0..count {
            let relative = reader.u32_at(offset + 4 + i * 4)? as usize;
            let bytes = reader.cbytes_at(offset + relative)?;
            strings.push(String::from_utf8_lossy(bytes).into_owned());
        }

        tracing::trace!(offset, count, "decoded string table");

        Ok(Self { strings })
    }

    /// Look up a string by index.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(String::as_str)
    }

    /// Look up a string by index, failing the parse if it is out of range.
    pub(crate) fn resolve(&self, index: usize, what: &str) -> Result<&str> {
        self.get(index).ok_or_else(|| {
            Error::ParseFailed(format!(
                "{what} index {index} out of range (table has {} entries)",
                self.strings.len()
            ))
        })
    }

    /// Number of strings in the table.
    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Whether the table is empty or absent.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Iterate over the strings in index order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(String::as_str)
    }
}
