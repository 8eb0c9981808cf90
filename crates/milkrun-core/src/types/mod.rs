//! Core milkrun types.
//!
//! These types enforce their invariants at construction time.

mod directory;
mod ids;
mod server_url;

pub use directory::{Farm, Operator};
pub use ids::{FarmId, LocalId, OperatorId, RemoteId};
pub use server_url::ServerUrl;
