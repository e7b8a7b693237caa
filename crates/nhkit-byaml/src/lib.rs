//! BYAML binary document parser for Animal Crossing: New Horizons files.
//!
//! BYAML is the game's schemaless binary tree format: nested arrays and
//! hashes of strings, blobs and scalars, addressed by offsets and backed by
//! two string tables. Most of the game's parameter and layout files use it,
//! usually packed inside SARC archives.
//!
//! Only little-endian (`YB`) documents of versions 1 to 4 are accepted.
//! Decoding is eager and fully bounds-checked: a malformed document fails
//! with an error instead of producing a partial tree.
//!
//! # Example
//!
//! ```no_run
//! use nhkit_byaml::Byaml;
//!
//! let doc = Byaml::open("Layout.byml")?;
//!
//! for leaf in doc.find("TypeName") {
//!     println!("{}", leaf.as_uint()?);
//! }
//!
//! print!("{}", doc.to_text());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod header;
mod node;
mod parser;
mod query;
mod render;
mod table;

#[cfg(feature = "json-export")]
mod json;

#[cfg(test)]
mod fixture;

pub use error::{Error, Result};
pub use header::ByamlHeader;
pub use node::{Node, NodeType};
pub use parser::{Byaml, MAX_DEPTH};
pub use render::Tree;
pub use table::StringTable;
