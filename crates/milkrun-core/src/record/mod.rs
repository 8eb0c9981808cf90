//! Collection records.
//!
//! Records are created through [`NewRecord`] and only ever mutated by the
//! store when the server acknowledges them.

mod types;

pub use types::{NewRecord, StoredRecord};
