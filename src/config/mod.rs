//! Configuration system
//!
//! Loads ~/.config/issuesync/config.yaml with support for:
//! - The GitHub account and Todoist project to connect
//! - Static repository → section tables
//! - Tracked and ignored repository lists
//! - API base URLs and token environment variables

mod sync_config;
pub mod validation;

pub use sync_config::{GitHubSettings, SyncConfig, TodoistSettings, DEFAULT_MAX_SECTIONS};
pub use validation::{validate_config, validate_config_result, ValidationError};
