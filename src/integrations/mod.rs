//! External Integrations
//!
//! HTTP adapters for the two services a sync run talks to.
//!
//! # Built-in Integrations
//!
//! - **GitHub**: REST adapter, read-only (repositories, issues, pull requests)
//! - **Todoist**: REST v2 adapter, create-only (projects, sections, tasks)
//!
//! Every call returns an explicit [`Result`](crate::Result); deciding whether
//! a failure is fatal, repo-scoped or item-scoped is left to the
//! [`SyncDriver`](crate::sync::SyncDriver).

pub mod github;
mod http;
pub mod todoist;

// GitHub exports
pub use github::{GitHubAdapter, RepositoryRef, WorkItem, WorkKind};

// Todoist exports
pub use todoist::{
    CreateSectionRequest, CreateTaskRequest, TodoProject, TodoSection, TodoTask, TodoistAdapter,
};

/// Case-insensitive name equality for accounts, projects and sections
///
/// Compares full Unicode lowercase forms, so `Übersicht` matches `übersicht`.
pub fn same_name(a: &str, b: &str) -> bool {
    name_key(a) == name_key(b)
}

/// Key under which a name is stored in case-insensitive maps
pub fn name_key(name: &str) -> String {
    name.to_lowercase()
}
