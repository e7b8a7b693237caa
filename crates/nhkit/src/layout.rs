//! Save-layout navigator.
//!
//! The game ships BYAML documents that describe the in-memory layout of its
//! save structures. The root is an array of type descriptors:
//!
//! ```text
//! Array
//! └─ Hash                    one per type
//!    ├─ TypeName: UInt        hash of the type name
//!    └─ Members: Array
//!       └─ Hash              one per field
//!          ├─ Name: UInt      hash of the field name
//!          ├─ TypeName: UInt  hash of the field's type
//!          ├─ Offset: Int64   byte offset within the parent type
//!          └─ Size: Int64     size in bytes
//! ```
//!
//! Hash keys are stored as the lowercase hex MurmurHash3 of the key name,
//! and type and field names are identified by their MurmurHash3 as well.
//! Use [`nhkit_common::murmur::hash_str`] to turn a name into an id.

use std::hash::BuildHasherDefault;

use hashbrown::HashMap as FastHashMap;
use nhkit_byaml::{Byaml, Node};
use rustc_hash::FxHasher;

use crate::{Error, Result};

type FxHashMap<K, V> = FastHashMap<K, V, BuildHasherDefault<FxHasher>>;

const KEY_TYPE_NAME: &str = "5c65d8b5";
const KEY_MEMBERS: &str = "a2fb4a94";
const KEY_NAME: &str = "25efa387";
const KEY_OFFSET: &str = "a7bb2e42";
const KEY_SIZE: &str = "b4a58247";

/// One resolved field of a save type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Member<'a> {
    /// Hash of the field name.
    pub name: u32,
    /// Hash of the field's own type, used to descend further.
    pub type_name: u32,
    /// Byte offset within the enclosing type.
    pub offset: i64,
    /// Size in bytes.
    pub size: i64,
    /// The member's descriptor hash.
    pub node: &'a Node,
}

impl<'a> Member<'a> {
    /// Read a member descriptor. Entries without a `Name` are not members.
    fn from_node(node: &'a Node) -> Option<Self> {
        let name = node.get(KEY_NAME)?.as_uint().ok()?;
        Some(Self {
            name,
            type_name: node
                .get(KEY_TYPE_NAME)
                .and_then(|n| n.as_uint().ok())
                .unwrap_or(0),
            offset: int64_field(node, KEY_OFFSET),
            size: int64_field(node, KEY_SIZE),
            node,
        })
    }
}

fn unsigned(type_name: u32, member: &Member<'_>, what: &'static str, value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| Error::InvalidMember {
        type_name,
        field: member.name,
        what,
        value,
    })
}

fn int64_field(node: &Node, key: &str) -> i64 {
    node.get(key).and_then(|n| n.as_int64().ok()).unwrap_or(0)
}

/// Index over a layout document's type descriptors.
#[derive(Debug, Clone)]
pub struct Layout<'a> {
    types: FxHashMap<u32, &'a [Node]>,
}

impl<'a> Layout<'a> {
    /// Index a decoded layout document.
    pub fn new(doc: &'a Byaml) -> Result<Self> {
        Self::from_root(doc.root())
    }

    /// Index a layout tree from its root node.
    pub fn from_root(root: &'a Node) -> Result<Self> {
        let Node::Array(descriptors) = root else {
            return Err(Error::InvalidLayout(root.kind()));
        };

        let mut types = FxHashMap::default();
        for descriptor in descriptors {
            let type_name = descriptor.get(KEY_TYPE_NAME).and_then(|n| n.as_uint().ok());
            let members = descriptor.get(KEY_MEMBERS).and_then(|n| n.as_array().ok());
            match (type_name, members) {
                (Some(type_name), Some(members)) => {
                    types.entry(type_name).or_insert(members);
                }
                _ => tracing::trace!(kind = %descriptor.kind(), "skipping non-type descriptor"),
            }
        }

        tracing::debug!(types = types.len(), "indexed save layout");
        Ok(Self { types })
    }

    /// Number of described types.
    #[inline]
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Whether a type is described.
    #[inline]
    pub fn contains_type(&self, type_name: u32) -> bool {
        self.types.contains_key(&type_name)
    }

    /// Resolve one field of a type.
    pub fn member(&self, type_name: u32, field: u32) -> Result<Member<'a>> {
        self.types
            .get(&type_name)
            .and_then(|members| {
                members
                    .iter()
                    .filter_map(Member::from_node)
                    .find(|m| m.name == field)
            })
            .ok_or(Error::MemberNotFound { type_name, field })
    }

    /// Walk a field path, returning the summed offset, the type declaring
    /// the last field, and that field.
    fn walk(&self, type_name: u32, path: &[u32]) -> Result<(u64, u32, Member<'a>)> {
        let (&first, rest) = path.split_first().ok_or(Error::EmptyPath)?;

        let mut parent = type_name;
        let mut member = self.member(parent, first)?;
        let mut offset = unsigned(parent, &member, "offset", member.offset)?;
        for &field in rest {
            parent = member.type_name;
            member = self.member(parent, field)?;
            let step = unsigned(parent, &member, "offset", member.offset)?;
            offset = offset.checked_add(step).ok_or(Error::InvalidMember {
                type_name: parent,
                field,
                what: "offset",
                value: member.offset,
            })?;
        }
        Ok((offset, parent, member))
    }

    /// Byte offset of a nested field from the start of `type_name`.
    pub fn offset_of(&self, type_name: u32, path: &[u32]) -> Result<u64> {
        self.walk(type_name, path).map(|(offset, _, _)| offset)
    }

    /// Size of the last field in a path.
    pub fn size_of(&self, type_name: u32, path: &[u32]) -> Result<u64> {
        let (_, parent, member) = self.walk(type_name, path)?;
        unsigned(parent, &member, "size", member.size)
    }

    /// Descriptor hash of the last field in a path.
    pub fn node_of(&self, type_name: u32, path: &[u32]) -> Result<&'a Node> {
        self.walk(type_name, path).map(|(_, _, m)| m.node)
    }
}
