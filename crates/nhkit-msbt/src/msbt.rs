//! MSBT file parser.
//!
//! ```text
//! [0x00] "MsgStdBn", u16 BOM, u16 pad, u8 encoding, u8 version,
//!        u16 section count, ... (0x20 bytes)
//! [0x20] sections, each { magic[4], u32 size, 8 pad bytes, data }
//!        padded to 16 bytes
//! ```

use std::path::Path;

use hashbrown::HashMap;
use nhkit_common::{align_up, BinaryReader, Endian};

use crate::text::{self, Encoding};
use crate::{Error, Result};

const SECTIONS_START: usize = 0x20;
const SECTION_HEADER_SIZE: usize = 0x10;

/// One message: its label, text and tag-free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Position of the text in the `TXT2` section.
    pub index: u32,
    /// Label from `LBL1`, absent for unlabeled texts.
    pub label: Option<String>,
    /// Decoded text including control tags.
    pub text: String,
    /// Decoded text with control tags removed.
    pub plain: String,
}

/// A decoded MSBT message table.
#[derive(Debug, Clone)]
pub struct Msbt {
    endian: Endian,
    encoding: Encoding,
    messages: Vec<Message>,
    by_label: HashMap<String, usize>,
}

impl Msbt {
    /// Read and parse an MSBT file from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::parse(&data)
    }

    /// Parse an MSBT file from a buffer.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = BinaryReader::new(data);
        reader.expect_magic(b"MsgStdBn")?;

        let bom = [reader.u8_at(0x8)?, reader.u8_at(0x9)?];
        let endian = Endian::from_bom(bom).ok_or(Error::InvalidBom(bom))?;
        reader.set_endian(endian);

        let encoding_byte = reader.u8_at(0xC)?;
        let encoding =
            Encoding::from_byte(encoding_byte).ok_or(Error::UnsupportedEncoding(encoding_byte))?;

        let section_count = reader.u16_at(0xE)?;
        if section_count == 0 {
            return Err(Error::NoSections);
        }

        let mut texts: Vec<&[u8]> = Vec::new();
        let mut labels: Vec<(String, u32)> = Vec::new();

        let mut pos = SECTIONS_START;
        for _ in 0..section_count {
            let magic = reader.bytes_at(pos, 4)?;
            let size = reader.u32_at(pos + 4)? as usize;
            let start = pos + SECTION_HEADER_SIZE;
            let section = reader.bytes_at(start, size)?;

            match magic {
                b"TXT2" => texts = parse_txt2(&reader, start, section.len())?,
                b"LBL1" => labels = parse_lbl1(&reader, start)?,
                other => tracing::trace!(
                    section = %String::from_utf8_lossy(other),
                    size,
                    "skipping MSBT section"
                ),
            }

            pos = align_up(start + size, 16);
        }

        labels.sort_by_key(|&(_, index)| index);

        let mut messages = Vec::with_capacity(texts.len());
        let mut label_iter = labels.into_iter().peekable();
        for (index, raw) in texts.iter().enumerate() {
            let mut label = None;
            while let Some((name, _)) = label_iter.next_if(|&(_, i)| i as usize <= index) {
                if label.is_some() {
                    tracing::warn!(index, label = %name, "duplicate label for MSBT text");
                    continue;
                }
                label = Some(name);
            }

            messages.push(Message {
                index: index as u32,
                label,
                text: text::decode(raw, encoding, endian),
                plain: text::decode(&text::strip_tags(raw, encoding, endian), encoding, endian),
            });
        }
        for (name, index) in label_iter {
            tracing::warn!(label = %name, index, "MSBT label points past the last text");
        }

        let by_label = messages
            .iter()
            .enumerate()
            .filter_map(|(i, m)| m.label.clone().map(|l| (l, i)))
            .collect();

        tracing::debug!(
            ?encoding,
            ?endian,
            messages = messages.len(),
            "parsed MSBT file"
        );

        Ok(Self {
            endian,
            encoding,
            messages,
            by_label,
        })
    }

    /// Byte order of the file.
    #[inline]
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Text encoding of the file.
    #[inline]
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Number of texts.
    #[inline]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the file holds no texts.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Look up a message by label.
    pub fn message(&self, label: &str) -> Option<&Message> {
        self.by_label.get(label).map(|&i| &self.messages[i])
    }

    /// Text for a label, control tags included.
    pub fn get(&self, label: &str) -> Option<&str> {
        self.message(label).map(|m| m.text.as_str())
    }

    /// Text for a label with control tags removed.
    pub fn plain_text(&self, label: &str) -> Option<&str> {
        self.message(label).map(|m| m.plain.as_str())
    }

    /// Messages in text order, which is also label order.
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }
}

/// Split the `TXT2` section into raw texts.
fn parse_txt2<'a>(reader: &BinaryReader<'a>, start: usize, size: usize) -> Result<Vec<&'a [u8]>> {
    let count = reader.u32_at(start)? as usize;
    reader.bytes_at(start + 4, count.saturating_mul(4))?;

    let mut texts = Vec::with_capacity(count);
    for i in 0..count {
        let begin = reader.u32_at(start + 4 + i * 4)? as usize;
        let end = if i + 1 < count {
            reader.u32_at(start + 8 + i * 4)? as usize
        } else {
            size
        };
        if begin > end || end > size {
            return Err(Error::ParseFailed(format!(
                "text {i} spans {begin:#x}..{end:#x} in a section of {size:#x} bytes"
            )));
        }
        texts.push(reader.bytes_at(start + begin, end - begin)?);
    }
    Ok(texts)
}

/// Collect `(label, text index)` pairs from the `LBL1` section.
fn parse_lbl1(reader: &BinaryReader<'_>, start: usize) -> Result<Vec<(String, u32)>> {
    let slots = reader.u32_at(start)? as usize;
    reader.bytes_at(start + 4, slots.saturating_mul(8))?;

    let mut labels = Vec::new();
    for slot in 0..slots {
        let count = reader.u32_at(start + 4 + slot * 8)?;
        let mut pos = start + reader.u32_at(start + 8 + slot * 8)? as usize;

        for _ in 0..count {
            let len = reader.u8_at(pos)? as usize;
            let name = String::from_utf8_lossy(reader.bytes_at(pos + 1, len)?).into_owned();
            let index = reader.u32_at(pos + 1 + len)?;
            labels.push((name, index));
            pos += 1 + len + 4;
        }
    }
    Ok(labels)
}
