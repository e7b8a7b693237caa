//! Key search over decoded trees.

use crate::{Byaml, Node};

impl Node {
    /// Collect every leaf reachable through a hash entry named `key`.
    ///
    /// A matching entry arms the search for its value's subtree. Arrays
    /// pass the armed state on to their elements, while each nested hash
    /// re-checks its own keys, so only leaves whose closest enclosing hash
    /// entry is `key` are collected. Containers are never part of the
    /// result. Arrays are walked by index and hashes in key order.
    pub fn find<'a>(&'a self, key: &str) -> Vec<&'a Node> {
        let mut results = Vec::new();
        self.collect(key, false, &mut results);
        results
    }

    fn collect<'a>(&'a self, key: &str, armed: bool, results: &mut Vec<&'a Node>) {
        match self {
            Node::Hash(entries) => {
                for (name, child) in entries {
                    child.collect(key, name == key, results);
                }
            }
            Node::Array(items) => {
                for item in items {
                    item.collect(key, armed, results);
                }
            }
            leaf if armed => results.push(leaf),
            _ => {}
        }
    }
}

impl Byaml {
    /// Search the whole document for leaves under entries named `key`.
    ///
    /// See [`Node::find`].
    pub fn find(&self, key: &str) -> Vec<&Node> {
        self.root().find(key)
    }
}
