//! BCSV table parser for Animal Crossing: New Horizons game data.
//!
//! BCSV is a headerless columnar format: every row has the same size, and
//! columns are identified only by a name hash and a byte offset. Item,
//! villager and event parameters ship as BCSV files inside `Bcsv.sarc.zs`.
//!
//! # Example
//!
//! ```no_run
//! use nhkit_bcsv::Bcsv;
//!
//! let table = Bcsv::open("ItemParam.bcsv")?;
//! println!("{} rows, {} columns", table.row_count(), table.column_count());
//!
//! if let Some(values) = table.column(0x54706054) {
//!     for value in values {
//!         println!("{value}");
//!     }
//! }
//! # Ok::<(), nhkit_bcsv::Error>(())
//! ```

mod error;
mod header;
mod table;
mod value;

pub use error::{Error, Result};
pub use header::{BcsvColumn, BcsvHeader};
pub use table::Bcsv;
pub use value::{looks_like_float, FieldValue};
