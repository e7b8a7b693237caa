//! BYAML node types.

use std::collections::BTreeMap;
use std::fmt;

use crate::{Error, Result};

/// The one-byte type tag that precedes every BYAML value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NodeType {
    String = 0xA0,
    Binary = 0xA1,
    Array = 0xC0,
    Hash = 0xC1,
    /// Marks a string table block; never a decoded node.
    StringTable = 0xC2,
    /// Marks a binary table block; never a decoded node.
    BinaryTable = 0xC3,
    Bool = 0xD0,
    Int = 0xD1,
    Float = 0xD2,
    UInt = 0xD3,
    Int64 = 0xD4,
    UInt64 = 0xD5,
    Double = 0xD6,
    Null = 0xFF,
}

impl NodeType {
    /// Map a raw tag byte to its type.
    pub fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            0xA0 => Self::String,
            0xA1 => Self::Binary,
            0xC0 => Self::Array,
            0xC1 => Self::Hash,
            0xC2 => Self::StringTable,
            0xC3 => Self::BinaryTable,
            0xD0 => Self::Bool,
            0xD1 => Self::Int,
            0xD2 => Self::Float,
            0xD3 => Self::UInt,
            0xD4 => Self::Int64,
            0xD5 => Self::UInt64,
            0xD6 => Self::Double,
            0xFF => Self::Null,
            _ => return None,
        })
    }

    /// The raw tag byte.
    #[inline]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Whether nodes of this type own children.
    #[inline]
    pub const fn is_container(self) -> bool {
        matches!(self, Self::Array | Self::Hash)
    }

    /// Human-readable name, as used by the tree renderer.
    pub const fn name(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Binary => "Binary",
            Self::Array => "Array",
            Self::Hash => "Hash",
            Self::StringTable => "StringTable",
            Self::BinaryTable => "BinaryTable",
            Self::Bool => "Bool",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::UInt => "UInt",
            Self::Int64 => "Int64",
            Self::UInt64 => "UInt64",
            Self::Double => "Double",
            Self::Null => "Null",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One decoded value of a BYAML document.
///
/// Containers own their children. Strings and binary blobs are copied out
/// of the source buffer during decoding, so a tree stays valid after the
/// buffer it came from is gone.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// String resolved from the document's string table.
    String(String),
    /// Length-prefixed raw bytes.
    Binary(Vec<u8>),
    /// Ordered children.
    Array(Vec<Node>),
    /// Children keyed by names from the hash key table, in key order.
    /// Keys with equal text share one entry holding the last decoded value.
    Hash(BTreeMap<String, Node>),
    Bool(bool),
    Int(i32),
    UInt(u32),
    Int64(i64),
    UInt64(u64),
    Float(f32),
    Double(f64),
    /// Explicit null, also produced for unrecognized tags.
    Null,
}

macro_rules! accessor {
    ($(#[$doc:meta])* $name:ident, $variant:ident, $ty:ty) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&self) -> Result<$ty> {
            match self {
                Node::$variant(v) => Ok(*v),
                other => Err(other.mismatch(NodeType::$variant)),
            }
        }
    };
}

impl Node {
    /// The type of this node.
    pub fn kind(&self) -> NodeType {
        match self {
            Node::String(_) => NodeType::String,
            Node::Binary(_) => NodeType::Binary,
            Node::Array(_) => NodeType::Array,
            Node::Hash(_) => NodeType::Hash,
            Node::Bool(_) => NodeType::Bool,
            Node::Int(_) => NodeType::Int,
            Node::UInt(_) => NodeType::UInt,
            Node::Int64(_) => NodeType::Int64,
            Node::UInt64(_) => NodeType::UInt64,
            Node::Float(_) => NodeType::Float,
            Node::Double(_) => NodeType::Double,
            Node::Null => NodeType::Null,
        }
    }

    /// Byte length for strings and binaries, child count for containers,
    /// zero for scalars.
    pub fn size(&self) -> usize {
        match self {
            Node::String(s) => s.len(),
            Node::Binary(b) => b.len(),
            Node::Array(items) => items.len(),
            Node::Hash(entries) => entries.len(),
            _ => 0,
        }
    }

    /// Whether this node is an array or hash.
    #[inline]
    pub fn is_container(&self) -> bool {
        self.kind().is_container()
    }

    /// Whether this node is null.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    fn mismatch(&self, expected: NodeType) -> Error {
        Error::TypeMismatch {
            expected,
            actual: self.kind(),
        }
    }

    /// Borrow the string value.
    pub fn as_str(&self) -> Result<&str> {
        match self {
            Node::String(s) => Ok(s),
            other => Err(other.mismatch(NodeType::String)),
        }
    }

    /// Borrow the binary payload.
    pub fn as_bytes(&self) -> Result<&[u8]> {
        match self {
            Node::Binary(b) => Ok(b),
            other => Err(other.mismatch(NodeType::Binary)),
        }
    }

    /// Borrow the array children.
    pub fn as_array(&self) -> Result<&[Node]> {
        match self {
            Node::Array(items) => Ok(items),
            other => Err(other.mismatch(NodeType::Array)),
        }
    }

    /// Borrow the hash entries.
    pub fn as_hash(&self) -> Result<&BTreeMap<String, Node>> {
        match self {
            Node::Hash(entries) => Ok(entries),
            other => Err(other.mismatch(NodeType::Hash)),
        }
    }

    accessor!(
        /// The boolean value.
        as_bool, Bool, bool
    );
    accessor!(
        /// The signed 32-bit value.
        as_int, Int, i32
    );
    accessor!(
        /// The unsigned 32-bit value.
        as_uint, UInt, u32
    );
    accessor!(
        /// The signed 64-bit value.
        as_int64, Int64, i64
    );
    accessor!(
        /// The unsigned 64-bit value.
        as_uint64, UInt64, u64
    );
    accessor!(
        /// The 32-bit float value.
        as_float, Float, f32
    );
    accessor!(
        /// The 64-bit float value.
        as_double, Double, f64
    );

    /// Look up a direct child of a hash node.
    ///
    /// Returns `None` for missing keys and for non-hash nodes.
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Hash(entries) => entries.get(key),
            _ => None,
        }
    }

    /// Look up a direct child of an array node.
    pub fn at(&self, index: usize) -> Option<&Node> {
        match self {
            Node::Array(items) => items.get(index),
            _ => None,
        }
    }
}
