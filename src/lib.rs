//! issuesync - Mirror GitHub issues and pull requests into Todoist
//!
//! A one-shot job meant to be run from a scheduler. Each run lists the open
//! issues and pull requests of an account's public repositories and creates a
//! Todoist task for every one that is new since the previous successful run,
//! grouped into sections by repository or topic.
//!
//! # Architecture
//!
//! - **config**: YAML configuration, token lookup and validation
//! - **storage**: The last-sync watermark file
//! - **integrations**: GitHub and Todoist REST adapters
//! - **sync**: Classification, section provisioning, publishing, and the driver

pub mod config;
pub mod error;
pub mod integrations;
pub mod logging;
pub mod storage;
pub mod sync;

// Re-exports
pub use error::{Result, SyncError};
