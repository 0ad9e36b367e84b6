//! # Services
//!
//! The API client and the per-key sync queue built on top of it.

pub mod api;
pub mod sync_queue;

pub use api::ApiClient;
pub use sync_queue::{SyncKey, SyncOutcome, SyncQueue, SyncRequest, SyncSuccess};
