//! JSON export of decoded trees.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::{Byaml, Node, Result};

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Node::String(s) => serializer.serialize_str(s),
            // Binary blobs become uppercase hex, matching the text renderer.
            Node::Binary(bytes) => serializer.serialize_str(&hex::encode_upper(bytes)),
            Node::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Node::Hash(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Node::Bool(v) => serializer.serialize_bool(*v),
            Node::Int(v) => serializer.serialize_i32(*v),
            Node::UInt(v) => serializer.serialize_u32(*v),
            Node::Int64(v) => serializer.serialize_i64(*v),
            Node::UInt64(v) => serializer.serialize_u64(*v),
            Node::Float(v) => serializer.serialize_f32(*v),
            Node::Double(v) => serializer.serialize_f64(*v),
            Node::Null => serializer.serialize_unit(),
        }
    }
}

impl Byaml {
    /// Serialize the document tree as JSON.
    pub fn to_json_string(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self.root())?
        } else {
            serde_json::to_string(self.root())?
        };
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn test_node_to_json() {
        let mut entries = BTreeMap::new();
        entries.insert("a".to_string(), Node::Array(vec![Node::Int(-1), Node::Null]));
        entries.insert("b".to_string(), Node::Binary(vec![0xAB, 0x01]));
        entries.insert("c".to_string(), Node::Bool(true));
        let tree = Node::Hash(entries);

        let json = serde_json::to_string(&tree).unwrap();
        assert_eq!(json, r#"{"a":[-1,null],"b":"AB01","c":true}"#);
    }

    #[test]
    fn test_wide_integers() {
        let tree = Node::Array(vec![Node::UInt64(u64::MAX), Node::Double(0.5)]);
        let json = serde_json::to_string(&tree).unwrap();
        assert_eq!(json, "[18446744073709551615,0.5]");
    }
}
