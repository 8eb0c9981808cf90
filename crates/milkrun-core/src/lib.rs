//! milkrun-core - Core types and traits for offline-first milk collection.
//!
//! Records are appended to a local [`RecordStore`] while offline and later
//! reconciled with the server through a [`SubmissionClient`]. This crate
//! holds the types both sides agree on; it performs no I/O.

pub mod error;
pub mod record;
pub mod submission;
pub mod traits;
pub mod types;

pub use error::Error;
pub use record::{NewRecord, StoredRecord};
pub use submission::{Acknowledgement, Rejection, SubmissionEntry, SubmissionResult};
pub use traits::{PassLease, RecordStore, SubmissionClient};
pub use types::{Farm, FarmId, LocalId, Operator, OperatorId, RemoteId, ServerUrl};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
