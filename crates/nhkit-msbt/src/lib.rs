//! MSBT message table parser for Animal Crossing: New Horizons text files.
//!
//! MSBT files map labels to localized texts. Item names, dialogue and UI
//! strings all live in MSBT files inside the `Message` archives.
//!
//! # Example
//!
//! ```no_run
//! use nhkit_msbt::Msbt;
//!
//! let msbt = Msbt::open("STR_ItemName_00_Ftr.msbt")?;
//!
//! for message in msbt.iter() {
//!     if let Some(label) = &message.label {
//!         println!("{label}: {}", message.plain);
//!     }
//! }
//! # Ok::<(), nhkit_msbt::Error>(())
//! ```

mod error;
mod msbt;
mod text;

pub use error::{Error, Result};
pub use msbt::{Message, Msbt};
pub use text::{decode, strip_tags, Encoding};
