//! nhkit - Animal Crossing: New Horizons asset and save file library.
//!
//! This crate provides a unified interface to the nhkit library ecosystem.
//!
//! # Crates
//!
//! - [`nhkit_common`] - Common utilities (binary reading, MurmurHash3, sead random)
//! - [`nhkit_byaml`] - BYAML document parsing, search and rendering
//! - [`nhkit_sarc`] - SARC archive reading (plain and Zstandard-wrapped)
//! - [`nhkit_bcsv`] - BCSV table parsing
//! - [`nhkit_msbt`] - MSBT message table parsing
//! - [`nhkit_crypto`] - Save cipher, encrypted integers and font cipher
//!
//! The [`layout`] module resolves field offsets from the game's save-layout
//! documents.
//!
//! # Example
//!
//! ```no_run
//! use nhkit::prelude::*;
//!
//! // Open a compressed archive
//! let archive = Sarc::open("Bootup.Nin_NX_NVN.pack.zs")?;
//!
//! // Parse a document stored inside it
//! if let Some(data) = archive.get("Layout/SaveLayout.byml") {
//!     let doc = Byaml::parse(data)?;
//!     let layout = Layout::new(&doc)?;
//!     println!("Types: {}", layout.type_count());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;

pub mod layout;

// Re-export all sub-crates
pub use nhkit_bcsv as bcsv;
pub use nhkit_byaml as byaml;
pub use nhkit_common as common;
pub use nhkit_crypto as crypto;
pub use nhkit_msbt as msbt;
pub use nhkit_sarc as sarc;

pub use error::{Error, Result};
pub use layout::{Layout, Member};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::layout::{Layout, Member};
    pub use nhkit_bcsv::{Bcsv, FieldValue};
    pub use nhkit_byaml::{Byaml, Node, NodeType};
    pub use nhkit_common::{murmur, BinaryReader, Random};
    pub use nhkit_crypto::{bfttf, EncryptedInt, Platform, SaveHeader};
    pub use nhkit_msbt::{Message, Msbt};
    pub use nhkit_sarc::{Sarc, SarcEntry};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
