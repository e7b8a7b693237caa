//! SARC archive reader for Animal Crossing: New Horizons files.
//!
//! SARC is the flat container the game packs most of its data into:
//! BYAML layouts and parameters, BCSV tables and MSBT message files. The
//! shipped archives are usually wrapped in Zstandard (`.sarc.zs`).
//!
//! - Memory-mapped opening of plain archives
//! - Transparent Zstandard decompression
//! - Zero-copy access to entry contents
//! - Parallel extraction with rayon (with `parallel` feature)
//!
//! # Example
//!
//! ```no_run
//! use nhkit_sarc::Sarc;
//!
//! let archive = Sarc::open("Bcsv.sarc.zs")?;
//!
//! for entry in archive.entries() {
//!     println!("{}: {} bytes", entry.name(), entry.size());
//! }
//!
//! if let Some(data) = archive.get("Bcsv/ItemParam.bcsv") {
//!     println!("{} bytes", data.len());
//! }
//! # Ok::<(), nhkit_sarc::Error>(())
//! ```

mod archive;
mod decompress;
mod entry;
mod error;

pub use archive::{name_hash, output_path, Sarc};
pub use decompress::{decompress_zstd, is_zstd};
pub use entry::SarcEntry;
pub use error::{Error, Result};
