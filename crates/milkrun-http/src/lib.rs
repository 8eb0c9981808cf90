//! milkrun-http - HTTP client for the collection server.
//!
//! [`HttpRemote`] implements [`SubmissionClient`](milkrun_core::SubmissionClient)
//! for batch reconciliation and also exposes the login, farm listing and
//! health endpoints the rest of the application needs.

mod client;
mod endpoints;
mod remote;

pub use client::{ApiClient, ClientConfig};
pub use remote::HttpRemote;
