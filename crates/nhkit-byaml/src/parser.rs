//! BYAML document parser.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use nhkit_common::{align_up, BinaryReader, Endian};

use crate::{ByamlHeader, Error, Node, NodeType, Result, StringTable};

/// Maximum container nesting accepted by the decoder.
///
/// Real documents stay far below this; corrupt offsets that point a
/// container back at one of its ancestors hit it quickly.
pub const MAX_DEPTH: usize = 256;

/// A fully decoded BYAML document.
///
/// Decoding is eager: once a `Byaml` exists, the whole tree has been read
/// and validated, and it no longer refers to the input buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Byaml {
    version: u16,
    hash_keys: StringTable,
    strings: StringTable,
    root: Node,
}

impl Byaml {
    /// Check if data starts with a BYAML magic of either byte order.
    pub fn is_byaml(data: &[u8]) -> bool {
        data.len() >= 2
            && (&data[..2] == ByamlHeader::MAGIC_LE || &data[..2] == ByamlHeader::MAGIC_BE)
    }

    /// Read and parse a BYAML file from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        tracing::debug!(path = %path.display(), size = data.len(), "read BYAML file");
        Self::parse(&data)
    }

    /// Parse a BYAML document from a buffer that takes ownership of the
    /// bytes. The buffer is released once decoding finishes.
    pub fn from_vec(data: Vec<u8>) -> Result<Self> {
        Self::parse(&data)
    }

    /// Parse a BYAML document from a borrowed buffer.
    ///
    /// # Arguments
    ///
    /// * `data` - The raw bytes of the BYAML document
    ///
    /// # Returns
    ///
    /// A decoded `Byaml` document, or an error if any part of it is
    /// malformed.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let header = ByamlHeader::parse(data)?;
        let reader = BinaryReader::with_endian(data, Endian::Little);

        let hash_keys = match header.hash_key_table_offset {
            Some(offset) => StringTable::parse(&reader, offset as usize)?,
            None => StringTable::default(),
        };
        let strings = match header.string_table_offset {
            Some(offset) => StringTable::parse(&reader, offset as usize)?,
            None => StringTable::default(),
        };

        let root_tag = reader.u8_at(header.root_offset as usize)?;
        if !NodeType::from_tag(root_tag).is_some_and(NodeType::is_container) {
            return Err(Error::InvalidRootType(root_tag));
        }

        let decoder = Decoder {
            reader,
            hash_keys: &hash_keys,
            strings: &strings,
            budget: Cell::new(data.len()),
        };
        let root = decoder.node(root_tag, ByamlHeader::ROOT_SLOT, 0)?;
        if root.is_null() {
            return Err(Error::ParseFailed("root node decoded as null".into()));
        }

        tracing::debug!(
            version = header.version,
            hash_keys = hash_keys.len(),
            strings = strings.len(),
            root = %root.kind(),
            "parsed BYAML document"
        );

        Ok(Self {
            version: header.version,
            hash_keys,
            strings,
            root,
        })
    }

    /// Document version (1 to 4).
    #[inline]
    pub fn version(&self) -> u16 {
        self.version
    }

    /// The root node, always an array or hash.
    #[inline]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// The hash key table.
    #[inline]
    pub fn hash_keys(&self) -> &StringTable {
        &self.hash_keys
    }

    /// The string value table.
    #[inline]
    pub fn strings(&self) -> &StringTable {
        &self.strings
    }

    /// Consume the document, keeping only its tree.
    pub fn into_root(self) -> Node {
        self.root
    }
}

/// Recursive node decoder over a validated buffer.
///
/// Slots hold absolute offsets, so one container can be reached from many
/// slots. `budget` caps the number of decoded nodes at one per input byte;
/// every node of a well-formed tree has its own slot of at least 4 bytes.
struct Decoder<'a> {
    reader: BinaryReader<'a>,
    hash_keys: &'a StringTable,
    strings: &'a StringTable,
    budget: Cell<usize>,
}

impl Decoder<'_> {
    /// Decode the node tagged `tag` whose inline slot is at `slot`.
    fn node(&self, tag: u8, slot: usize, depth: usize) -> Result<Node> {
        let remaining = self.budget.get();
        if remaining == 0 {
            return Err(Error::ParseFailed(format!(
                "node at slot {slot:#x} exceeds the decode budget"
            )));
        }
        self.budget.set(remaining - 1);

        let Some(kind) = NodeType::from_tag(tag) else {
            tracing::trace!(tag, slot, "unknown node tag, decoding as null");
            return Ok(Node::Null);
        };

        let node = match kind {
            NodeType::String => {
                let index = self.reader.u32_at(slot)? as usize;
                Node::String(self.strings.resolve(index, "string")?.to_owned())
            }
            NodeType::Binary => self.binary(self.pointer(slot)?)?,
            NodeType::Array => self.array(self.pointer(slot)?, depth + 1)?,
            NodeType::Hash => self.hash(self.pointer(slot)?, depth + 1)?,
            NodeType::Bool => Node::Bool(self.reader.u32_at(slot)? != 0),
            NodeType::Int => Node::Int(self.reader.i32_at(slot)?),
            NodeType::Float => Node::Float(self.reader.f32_at(slot)?),
            NodeType::UInt => Node::UInt(self.reader.u32_at(slot)?),
            NodeType::Int64 => Node::Int64(self.reader.i64_at(self.pointer(slot)?)?),
            NodeType::UInt64 => Node::UInt64(self.reader.u64_at(self.pointer(slot)?)?),
            NodeType::Double => Node::Double(self.reader.f64_at(self.pointer(slot)?)?),
            NodeType::Null | NodeType::StringTable | NodeType::BinaryTable => Node::Null,
        };

        Ok(node)
    }

    /// Follow an inline slot holding an absolute offset.
    #[inline]
    fn pointer(&self, slot: usize) -> Result<usize> {
        Ok(self.reader.u32_at(slot)? as usize)
    }

    fn enter(&self, kind: NodeType, offset: usize, depth: usize) -> Result<usize> {
        if depth > MAX_DEPTH {
            return Err(Error::ParseFailed(format!(
                "containers nested deeper than {MAX_DEPTH} at {offset:#x}"
            )));
        }

        let tag = self.reader.u8_at(offset)?;
        if tag != kind.tag() {
            return Err(Error::ParseFailed(format!(
                "expected {kind} header at {offset:#x}, got tag {tag:#04x}"
            )));
        }

        Ok(self.reader.u24_at(offset + 1)? as usize)
    }

    fn binary(&self, offset: usize) -> Result<Node> {
        let len = self.reader.u32_at(offset)? as usize;
        let bytes = self.reader.bytes_at(offset + 4, len)?;
        Ok(Node::Binary(bytes.to_vec()))
    }

    fn array(&self, offset: usize, depth: usize) -> Result<Node> {
        let count = self.enter(NodeType::Array, offset, depth)?;

        // Value slots start after the tag bytes, padded by aligning the
        // element count itself to 4.
        let tags = self.reader.bytes_at(offset + 4, count)?;
        let values = offset + align_up(count, 4) + 4;
        self.reader.bytes_at(values, count * 4)?;

        let mut items = Vec::with_capacity(count);
        for (i, &tag) in tags.iter().enumerate() {
            items.push(self.node(tag, values + i * 4, depth)?);
        }

        Ok(Node::Array(items))
    }

    fn hash(&self, offset: usize, depth: usize) -> Result<Node> {
        let count = self.enter(NodeType::Hash, offset, depth)?;
        self.reader.bytes_at(offset + 4, count * 8)?;

        let mut entries = BTreeMap::new();
        for i in 0..count {
            let entry = offset + 4 + i * 8;
            let key_index = self.reader.u24_at(entry)? as usize;
            let key = self.hash_keys.resolve(key_index, "hash key")?;
            let tag = self.reader.u8_at(entry + 3)?;

            let value = self.node(tag, entry + 4, depth)?;
            // Repeated keys keep the value decoded last. Entries are keyed by
            // text, so distinct key indices with equal strings also merge.
            entries.insert(key.to_owned(), value);
        }

        Ok(Node::Hash(entries))
    }
}
