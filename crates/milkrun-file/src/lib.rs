//! milkrun-file - Filesystem-backed local record store.
//!
//! Every persisted key is one JSON file under the store root. Writes go
//! through a temporary file and a rename, so readers never observe a
//! partial write, and every read-modify-write holds an exclusive lock on
//! `store.lock` so concurrent processes cannot interleave.

mod records;
mod store;

pub use store::FileStore;
