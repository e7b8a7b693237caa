//! SARC archive entry.

use std::ops::Range;

/// A named file inside a SARC archive.
///
/// Holds metadata only. Use [`Sarc::read`](crate::Sarc::read) or
/// [`Sarc::get`](crate::Sarc::get) for the contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SarcEntry {
    /// Path of the file within the archive.
    name: String,
    /// Name hash stored in the SFAT node.
    name_hash: u32,
    /// Absolute byte range of the contents within the archive buffer.
    range: Range<usize>,
}

impl SarcEntry {
    pub(crate) fn new(name: String, name_hash: u32, range: Range<usize>) -> Self {
        Self {
            name,
            name_hash,
            range,
        }
    }

    /// Get the file name/path.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the name hash recorded by the archive.
    #[inline]
    pub fn name_hash(&self) -> u32 {
        self.name_hash
    }

    /// Get the size of the contents in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.range.len()
    }

    /// Get the absolute byte range of the contents.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Get the file extension, if any.
    pub fn extension(&self) -> Option<&str> {
        let file_name = self.name.rsplit('/').next().unwrap_or(&self.name);
        file_name.rsplit_once('.').map(|(_, ext)| ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_accessors() {
        let entry = SarcEntry::new("Layout/Main.byml".into(), 0x1234, 0x40..0x50);
        assert_eq!(entry.name(), "Layout/Main.byml");
        assert_eq!(entry.name_hash(), 0x1234);
        assert_eq!(entry.size(), 0x10);
        assert_eq!(entry.extension(), Some("byml"));

        let bare = SarcEntry::new("dir.v2/README".into(), 0, 0..0);
        assert_eq!(bare.extension(), None);
    }
}
