//! `turni-shifts` — the static shift lookup table and pure date helpers.
//!
//! The table is loaded once at startup from a JSON file and is immutable
//! afterwards. A failed load is fatal: the process must not start serving
//! events without shift data.

pub mod dates;
pub mod error;
pub mod table;

pub use error::{Result, ShiftError};
pub use table::ShiftTable;
