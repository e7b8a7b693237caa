//! Error types for the save-layout navigator.

use nhkit_byaml::NodeType;
use thiserror::Error;

/// Errors that can occur when resolving save-layout fields.
#[derive(Debug, Error)]
pub enum Error {
    /// BYAML decoding error.
    #[error("{0}")]
    Byaml(#[from] nhkit_byaml::Error),

    /// The layout document's root is not an array of type descriptors.
    #[error("invalid layout document: root is {0}, expected Array")]
    InvalidLayout(NodeType),

    /// No member with this name in the given type, or the type is unknown.
    #[error("member {field:08x} not found in type {type_name:08x}")]
    MemberNotFound { type_name: u32, field: u32 },

    /// A member whose offset or size cannot describe a location in memory.
    #[error("member {field:08x} of type {type_name:08x} has invalid {what}: {value}")]
    InvalidMember {
        type_name: u32,
        field: u32,
        what: &'static str,
        value: i64,
    },

    /// A field path with no components.
    #[error("empty field path")]
    EmptyPath,
}

/// Result type for layout operations.
pub type Result<T> = std::result::Result<T, Error>;
