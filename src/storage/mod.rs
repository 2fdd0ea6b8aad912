//! Local persistence
//!
//! The only state issuesync keeps between runs is the last-sync watermark.

mod sync_state;

pub use sync_state::{to_iso8601, SyncState, SyncStateStore};
