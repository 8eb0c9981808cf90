//! Core traits for the local store and the remote submission client.

mod client;
mod store;

pub use client::SubmissionClient;
pub use store::{PassLease, RecordStore};
