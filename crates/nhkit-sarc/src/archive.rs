//! SARC archive reader.
//!
//! ```text
//! [0x00] "SARC", u16 header size (0x14), u16 BOM,
//!        u32 file size, u32 data offset, u16 version (0x0100), u16 pad
//! [0x14] "SFAT", u16 header size (0x0C), u16 node count, u32 hash multiplier
//! [0x20] node count x { u32 name hash, u32 name attributes,
//!                       u32 data begin, u32 data end }
//!        "SFNT", u16 header size (0x08), u16 pad
//!        name table (null-terminated, 4-byte aligned)
//! [data offset] file contents
//! ```

use std::fs::{self, File};
use std::ops::Deref;
use std::path::{Component, Path, PathBuf};

use memmap2::Mmap;
use nhkit_common::BinaryReader;

use crate::decompress;
use crate::{Error, Result, SarcEntry};

const SARC_HEADER_SIZE: u16 = 0x14;
const SFAT_HEADER_SIZE: u16 = 0x0C;
const SFNT_HEADER_SIZE: u16 = 0x08;
const SFAT_NODE_SIZE: usize = 0x10;
const VERSION: u16 = 0x0100;

/// Backing bytes of an archive.
enum Storage {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl Deref for Storage {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Storage::Owned(data) => data.as_slice(),
            Storage::Mapped(mmap) => &mmap[..],
        }
    }
}

/// Compute the SFAT hash of an entry name.
///
/// Bytes are sign-extended before being added, as the game does.
pub fn name_hash(name: &str, multiplier: u32) -> u32 {
    name.bytes()
        .fold(0u32, |hash, b| hash.wrapping_mul(multiplier).wrapping_add(b as i8 as u32))
}

/// A parsed SARC archive.
pub struct Sarc {
    data: Storage,
    name: String,
    hash_multiplier: u32,
    entries: Vec<SarcEntry>,
}

impl Sarc {
    /// Open a SARC archive from disk.
    ///
    /// The file is memory-mapped. Zstandard-compressed archives (`.zs`) are
    /// detected by their frame magic and decompressed into memory.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        // SAFETY: the map is read-only and archives are not modified while open.
        let mmap = unsafe { Mmap::map(&file)? };

        let data = if decompress::is_zstd(&mmap) {
            tracing::debug!(path = %path.display(), "decompressing Zstandard archive");
            Storage::Owned(decompress::decompress_zstd(&mmap)?)
        } else {
            Storage::Mapped(mmap)
        };

        Self::from_storage(data, archive_name(path))
    }

    /// Open a Zstandard-compressed SARC archive from disk.
    pub fn open_compressed<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let compressed = fs::read(path)?;
        let data = decompress::decompress_zstd(&compressed)?;
        Self::from_storage(Storage::Owned(data), archive_name(path))
    }

    /// Parse an archive held in memory.
    pub fn from_vec(data: Vec<u8>) -> Result<Self> {
        Self::from_storage(Storage::Owned(data), "memory".to_string())
    }

    fn from_storage(data: Storage, name: String) -> Result<Self> {
        let (hash_multiplier, entries) = parse_entries(&data)?;
        tracing::debug!(archive = %name, entries = entries.len(), "parsed SARC archive");

        Ok(Self {
            data,
            name,
            hash_multiplier,
            entries,
        })
    }

    /// Get the archive name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of named entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the archive has no named entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All named entries in node-table order.
    #[inline]
    pub fn entries(&self) -> &[SarcEntry] {
        &self.entries
    }

    /// Iterate over entries together with their contents.
    pub fn iter(&self) -> impl Iterator<Item = (&SarcEntry, &[u8])> + '_ {
        self.entries.iter().map(move |e| (e, self.read(e)))
    }

    /// The hash multiplier from the SFAT header.
    #[inline]
    pub fn hash_multiplier(&self) -> u32 {
        self.hash_multiplier
    }

    /// Hash a name with this archive's multiplier.
    #[inline]
    pub fn hash_name(&self, name: &str) -> u32 {
        name_hash(name, self.hash_multiplier)
    }

    /// Find an entry by exact name.
    pub fn find(&self, name: &str) -> Option<&SarcEntry> {
        self.entries.iter().find(|e| e.name() == name)
    }

    /// Whether an entry with this name exists.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Borrow the contents of an entry by name.
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.find(name).map(|e| self.read(e))
    }

    /// Borrow the contents of an entry.
    ///
    /// Entry ranges are validated against the buffer during parsing.
    #[inline]
    pub fn read(&self, entry: &SarcEntry) -> &[u8] {
        &self.data[entry.range()]
    }

    /// Write one entry to `out_path`, creating parent directories.
    pub fn extract<P: AsRef<Path>>(&self, name: &str, out_path: P) -> Result<()> {
        let entry = self
            .find(name)
            .ok_or_else(|| Error::EntryNotFound(name.to_string()))?;
        write_file(out_path.as_ref(), self.read(entry))
    }

    /// Write every entry below `out_dir`, keeping archive paths.
    ///
    /// Returns the number of files written.
    pub fn extract_all<P: AsRef<Path>>(&self, out_dir: P) -> Result<usize> {
        let out_dir = out_dir.as_ref();

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            self.entries
                .par_iter()
                .try_for_each(|e| write_file(&output_path(out_dir, e.name()), self.read(e)))?;
        }

        #[cfg(not(feature = "parallel"))]
        for entry in &self.entries {
            write_file(&output_path(out_dir, entry.name()), self.read(entry))?;
        }

        Ok(self.entries.len())
    }
}

impl std::fmt::Debug for Sarc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sarc")
            .field("name", &self.name)
            .field("size", &self.data.len())
            .field("hash_multiplier", &self.hash_multiplier)
            .field("entries", &self.entries.len())
            .finish()
    }
}

fn archive_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string()
}

/// Join an archive path below `dir`, dropping any component that could
/// escape it.
pub fn output_path(dir: &Path, name: &str) -> PathBuf {
    let mut path = dir.to_path_buf();
    for component in Path::new(name).components() {
        if let Component::Normal(part) = component {
            path.push(part);
        }
    }
    path
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

fn parse_entries(data: &[u8]) -> Result<(u32, Vec<SarcEntry>)> {
    let mut reader = BinaryReader::new(data);
    reader.expect_magic(b"SARC")?;

    match [reader.u8_at(0x6)?, reader.u8_at(0x7)?] {
        [0xFF, 0xFE] => {}
        [0xFE, 0xFF] => return Err(Error::UnsupportedEndianness),
        other => return Err(Error::InvalidBom(other)),
    }

    check_header_size("SARC", reader.u16_at(0x4)?, SARC_HEADER_SIZE)?;
    let file_size = reader.u32_at(0x8)? as usize;
    let data_offset = reader.u32_at(0xC)? as usize;

    let version = reader.u16_at(0x10)?;
    if version != VERSION {
        return Err(Error::UnsupportedVersion(version));
    }

    if file_size != data.len() {
        tracing::trace!(file_size, actual = data.len(), "SARC header size differs from buffer");
    }

    let sfat = SARC_HEADER_SIZE as usize;
    reader.seek(sfat);
    reader.expect_magic(b"SFAT")?;
    check_header_size("SFAT", reader.u16_at(sfat + 4)?, SFAT_HEADER_SIZE)?;

    let node_count = reader.u16_at(sfat + 6)?;
    if node_count >> 14 != 0 {
        return Err(Error::TooManyFiles(node_count));
    }
    let hash_multiplier = reader.u32_at(sfat + 8)?;

    let nodes = sfat + SFAT_HEADER_SIZE as usize;
    let sfnt = nodes + SFAT_NODE_SIZE * node_count as usize;
    reader.seek(sfnt);
    reader.expect_magic(b"SFNT")?;
    check_header_size("SFNT", reader.u16_at(sfnt + 4)?, SFNT_HEADER_SIZE)?;

    let name_table = sfnt + SFNT_HEADER_SIZE as usize;
    if name_table > data_offset {
        return Err(Error::DataBeforeNameTable {
            name_table,
            data_offset,
        });
    }

    let mut entries = Vec::with_capacity(node_count as usize);
    for i in 0..node_count as usize {
        let node = nodes + i * SFAT_NODE_SIZE;
        let hash = reader.u32_at(node)?;
        let attributes = reader.u32_at(node + 0x4)?;
        if attributes == 0 {
            tracing::trace!(index = i, "skipping unnamed SARC entry");
            continue;
        }

        let name_offset = name_table + 4 * (attributes & 0x00FF_FFFF) as usize;
        if name_offset > data_offset {
            tracing::warn!(index = i, name_offset, "SARC entry name lies past the data region");
            continue;
        }
        let name = String::from_utf8_lossy(reader.cbytes_at(name_offset)?).into_owned();

        let begin = reader.u32_at(node + 0x8)? as usize;
        let end = reader.u32_at(node + 0xC)? as usize;
        let range = (data_offset + begin)..(data_offset + end);
        if begin > end || range.end > data.len() {
            return Err(Error::ParseFailed(format!(
                "entry {name:?} data {begin:#x}..{end:#x} lies outside the archive"
            )));
        }

        entries.push(SarcEntry::new(name, hash, range));
    }

    Ok((hash_multiplier, entries))
}

fn check_header_size(section: &'static str, actual: u16, expected: u16) -> Result<()> {
    if actual != expected {
        return Err(Error::InvalidHeaderSize {
            section,
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MULTIPLIER: u32 = 0x65;

    /// Build a little-endian archive. A `None` name produces an unnamed node.
    fn build(files: &[(Option<&str>, &[u8])]) -> Vec<u8> {
        let count = files.len();
        let name_table = 0x20 + SFAT_NODE_SIZE * count + 8;

        let mut names = Vec::new();
        let mut name_offsets = Vec::new();
        for (name, _) in files {
            name_offsets.push(names.len());
            if let Some(name) = name {
                names.extend_from_slice(name.as_bytes());
                names.push(0);
                while names.len() % 4 != 0 {
                    names.push(0);
                }
            }
        }

        let data_offset = (name_table + names.len() + 0xF) & !0xF;
        let mut blobs = Vec::new();
        let mut ranges = Vec::new();
        for (_, contents) in files {
            let begin = blobs.len();
            blobs.extend_from_slice(contents);
            ranges.push((begin, blobs.len()));
            while blobs.len() % 4 != 0 {
                blobs.push(0);
            }
        }

        let total = data_offset + blobs.len();
        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(b"SARC");
        out.extend_from_slice(&0x14u16.to_le_bytes());
        out.extend_from_slice(&[0xFF, 0xFE]);
        out.extend_from_slice(&(total as u32).to_le_bytes());
        out.extend_from_slice(&(data_offset as u32).to_le_bytes());
        out.extend_from_slice(&0x0100u16.to_le_bytes());
        out.extend_from_slice(&[0, 0]);

        out.extend_from_slice(b"SFAT");
        out.extend_from_slice(&0x0Cu16.to_le_bytes());
        out.extend_from_slice(&(count as u16).to_le_bytes());
        out.extend_from_slice(&MULTIPLIER.to_le_bytes());

        for (i, (name, _)) in files.iter().enumerate() {
            let (hash, attributes) = match name {
                Some(name) => (
                    name_hash(name, MULTIPLIER),
                    0x0100_0000 | (name_offsets[i] / 4) as u32,
                ),
                None => (0, 0),
            };
            out.extend_from_slice(&hash.to_le_bytes());
            out.extend_from_slice(&attributes.to_le_bytes());
            out.extend_from_slice(&(ranges[i].0 as u32).to_le_bytes());
            out.extend_from_slice(&(ranges[i].1 as u32).to_le_bytes());
        }

        out.extend_from_slice(b"SFNT");
        out.extend_from_slice(&0x08u16.to_le_bytes());
        out.extend_from_slice(&[0, 0]);
        out.extend_from_slice(&names);
        out.resize(data_offset, 0);
        out.extend_from_slice(&blobs);
        out
    }

    #[test]
    fn test_parse_entries() {
        let data = build(&[
            (Some("Layout/Main.byml"), b"YB\x02\x00"),
            (Some("Message/Item.msbt"), b"MsgStdBn"),
        ]);
        let sarc = Sarc::from_vec(data).unwrap();

        assert_eq!(sarc.len(), 2);
        assert_eq!(sarc.hash_multiplier(), MULTIPLIER);
        assert_eq!(sarc.entries()[0].name(), "Layout/Main.byml");
        assert_eq!(sarc.get("Layout/Main.byml"), Some(&b"YB\x02\x00"[..]));
        assert_eq!(sarc.get("Message/Item.msbt"), Some(&b"MsgStdBn"[..]));
        assert!(sarc.contains("Message/Item.msbt"));
        assert!(!sarc.contains("message/item.msbt"));

        for entry in sarc.entries() {
            assert_eq!(entry.name_hash(), sarc.hash_name(entry.name()));
        }
    }

    #[test]
    fn test_unnamed_entries_skipped() {
        let data = build(&[(None, b"hidden"), (Some("a.bin"), b"abc")]);
        let sarc = Sarc::from_vec(data).unwrap();

        assert_eq!(sarc.len(), 1);
        assert_eq!(sarc.iter().next(), Some((&sarc.entries()[0], &b"abc"[..])));
    }

    #[test]
    fn test_empty_archive() {
        let sarc = Sarc::from_vec(build(&[])).unwrap();
        assert!(sarc.is_empty());
        assert!(sarc.get("anything").is_none());
    }

    #[test]
    fn test_name_hash_sign_extends() {
        assert_eq!(name_hash("", MULTIPLIER), 0);
        assert_eq!(name_hash("a", MULTIPLIER), 0x61);
        assert_eq!(name_hash("ab", MULTIPLIER), 0x61 * 0x65 + 0x62);
        // 0xC3 sign-extends to 0xFFFFFFC3.
        assert_eq!(name_hash("\u{e9}", 1), 0xFFFF_FFC3u32.wrapping_add(0xFFFF_FFA9));
    }

    #[test]
    fn test_header_errors() {
        let good = build(&[(Some("a"), b"1")]);

        let mut data = good.clone();
        data[6..8].copy_from_slice(&[0xFE, 0xFF]);
        assert!(matches!(Sarc::from_vec(data), Err(Error::UnsupportedEndianness)));

        let mut data = good.clone();
        data[6..8].copy_from_slice(&[0x12, 0x34]);
        assert!(matches!(Sarc::from_vec(data), Err(Error::InvalidBom([0x12, 0x34]))));

        let mut data = good.clone();
        data[0] = b'Z';
        assert!(matches!(Sarc::from_vec(data), Err(Error::Common(_))));

        let mut data = good.clone();
        data[0x10] = 0x02;
        assert!(matches!(Sarc::from_vec(data), Err(Error::UnsupportedVersion(_))));

        let mut data = good.clone();
        data[0x18] = 0x10;
        assert!(matches!(
            Sarc::from_vec(data),
            Err(Error::InvalidHeaderSize { section: "SFAT", .. })
        ));

        let mut data = good;
        data[0x1A..0x1C].copy_from_slice(&0x4000u16.to_le_bytes());
        assert!(matches!(Sarc::from_vec(data), Err(Error::TooManyFiles(0x4000))));
    }

    #[test]
    fn test_data_offset_before_names() {
        let mut data = build(&[(Some("a"), b"1")]);
        data[0xC..0x10].copy_from_slice(&0x20u32.to_le_bytes());
        assert!(matches!(
            Sarc::from_vec(data),
            Err(Error::DataBeforeNameTable { .. })
        ));
    }

    #[test]
    fn test_data_range_outside_buffer() {
        let mut data = build(&[(Some("a"), b"1234")]);
        // Data end of the first node.
        data[0x2C..0x30].copy_from_slice(&0x1000u32.to_le_bytes());
        assert!(matches!(Sarc::from_vec(data), Err(Error::ParseFailed(_))));
    }

    #[test]
    fn test_open_plain_and_compressed() {
        let data = build(&[(Some("x/y.bin"), b"payload")]);
        let dir = tempfile::tempdir().unwrap();

        let plain = dir.path().join("Bundle.sarc");
        fs::write(&plain, &data).unwrap();
        let sarc = Sarc::open(&plain).unwrap();
        assert_eq!(sarc.name(), "Bundle.sarc");
        assert_eq!(sarc.get("x/y.bin"), Some(&b"payload"[..]));

        let packed = dir.path().join("Bundle.sarc.zs");
        fs::write(&packed, zstd::encode_all(&data[..], 3).unwrap()).unwrap();
        assert_eq!(Sarc::open(&packed).unwrap().get("x/y.bin"), Some(&b"payload"[..]));
        assert_eq!(
            Sarc::open_compressed(&packed).unwrap().entries(),
            sarc.entries()
        );
    }

    #[test]
    fn test_extract() {
        let data = build(&[(Some("x/y.bin"), b"payload"), (Some("../evil.bin"), b"no")]);
        let sarc = Sarc::from_vec(data).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let out = dir.path().join("single/y.bin");
        sarc.extract("x/y.bin", &out).unwrap();
        assert_eq!(fs::read(&out).unwrap(), b"payload");

        let missing = sarc.extract("nope", dir.path().join("nope"));
        assert!(matches!(missing, Err(Error::EntryNotFound(_))));

        let all = dir.path().join("all");
        assert_eq!(sarc.extract_all(&all).unwrap(), 2);
        assert_eq!(fs::read(all.join("x/y.bin")).unwrap(), b"payload");
        assert_eq!(fs::read(all.join("evil.bin")).unwrap(), b"no");
    }
}
