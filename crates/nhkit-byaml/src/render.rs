//! Indented text dump of a decoded tree.

use std::fmt;

use crate::{Byaml, Node, NodeType};

/// Display adapter that renders a node and its subtree.
///
/// Every line starts with `├─`, then one `──` per nesting level and a
/// label for the node type:
///
/// ```text
/// ├─ Hash: Items
/// ├─── Array:
/// ├───── Int: 7
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Tree<'a> {
    node: &'a Node,
}

impl Node {
    /// Render this node as an indented tree.
    pub fn tree(&self) -> Tree<'_> {
        Tree { node: self }
    }
}

impl Byaml {
    /// Render the whole document as an indented tree.
    pub fn to_text(&self) -> String {
        self.root().tree().to_string()
    }
}

impl fmt::Display for Tree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(f, self.node, 0)
    }
}

fn prefix(f: &mut fmt::Formatter<'_>, indent: usize, kind: NodeType) -> fmt::Result {
    f.write_str("├─")?;
    for _ in 0..indent {
        f.write_str("──")?;
    }
    match kind {
        NodeType::Array => f.write_str(" Array:\n"),
        NodeType::Null => f.write_str(" "),
        other => write!(f, " {}: ", other.name()),
    }
}

fn write_node(f: &mut fmt::Formatter<'_>, node: &Node, indent: usize) -> fmt::Result {
    match node {
        Node::String(s) => {
            prefix(f, indent, NodeType::String)?;
            writeln!(f, "{s}")
        }
        Node::Binary(bytes) => {
            if bytes.is_empty() {
                return Ok(());
            }
            prefix(f, indent, NodeType::Binary)?;
            writeln!(f, "{}", hex::encode_upper(bytes))
        }
        Node::Array(items) => {
            for item in items {
                prefix(f, indent, NodeType::Array)?;
                write_node(f, item, indent + 1)?;
            }
            Ok(())
        }
        Node::Hash(entries) => {
            for (key, child) in entries {
                prefix(f, indent, NodeType::Hash)?;
                writeln!(f, "{key}")?;
                write_node(f, child, indent + 1)?;
            }
            Ok(())
        }
        Node::Bool(v) => {
            prefix(f, indent, NodeType::Bool)?;
            writeln!(f, "{v}")
        }
        Node::Int(v) => {
            prefix(f, indent, NodeType::Int)?;
            writeln!(f, "{v}")
        }
        Node::UInt(v) => {
            prefix(f, indent, NodeType::UInt)?;
            writeln!(f, "{v}")
        }
        Node::Int64(v) => {
            prefix(f, indent, NodeType::Int64)?;
            writeln!(f, "{v}")
        }
        Node::UInt64(v) => {
            prefix(f, indent, NodeType::UInt64)?;
            writeln!(f, "{v}")
        }
        Node::Float(v) => {
            prefix(f, indent, NodeType::Float)?;
            writeln!(f, "{v:.6}")
        }
        Node::Double(v) => {
            prefix(f, indent, NodeType::Double)?;
            writeln!(f, "{v:.6}")
        }
        Node::Null => {
            prefix(f, indent, NodeType::Null)?;
            f.write_str("NULL\n")
        }
    }
}
