//! Save and asset ciphers for Animal Crossing: New Horizons.
//!
//! - [`EncryptedInt`] - checksummed, obfuscated integers stored inside saves
//! - [`SaveHeader`] - save header and the AES-128-CTR save cipher
//! - [`bfttf`] - platform XOR cipher used on bundled fonts

mod error;

pub mod bfttf;
pub mod encrypted_int;
pub mod save;

pub use bfttf::Platform;
pub use encrypted_int::EncryptedInt;
pub use error::{Error, Result};
pub use save::{SaveHeader, SaveVersion, SAVE_HEADER_SIZE};
