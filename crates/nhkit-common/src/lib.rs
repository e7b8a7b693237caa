//! Common utilities for nhkit.
//!
//! This crate provides foundational types and utilities used across all nhkit crates:
//!
//! - [`BinaryReader`] - Bounds-checked, endian-aware reading from byte slices
//! - [`murmur`] - MurmurHash3 checksums and layout field keys
//! - [`Random`] - sead's xorshift128 generator

mod error;
mod reader;

pub mod murmur;
pub mod random;

pub use error::{Error, Result};
pub use random::Random;
pub use reader::{align_up, BinaryReader, Endian};

/// Re-export memchr for byte searching
pub use memchr;
