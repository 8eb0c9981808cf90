//! milkrun-sync - Reconcile locally recorded collections with the server.
//!
//! The [`Synchronizer`] drains unsynced records from a
//! [`RecordStore`](milkrun_core::RecordStore), submits them in one batch
//! through a [`SubmissionClient`](milkrun_core::SubmissionClient), and marks
//! the acknowledged ones synced. At most one pass runs at a time.
//!
//! The [`Orchestrator`] decides when to run a pass: on reconnect, after a
//! record is appended while online, or on request. There is no internal
//! retry loop; records that fail stay unsynced and go out with the next
//! trigger.

mod guard;
mod orchestrator;
mod report;
mod synchronizer;

pub use orchestrator::{Notice, Orchestrator, Trigger};
pub use report::{SyncAttempt, SyncReport, SyncStatus};
pub use synchronizer::Synchronizer;
