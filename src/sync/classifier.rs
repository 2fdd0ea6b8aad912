//! Repository → section classification
//!
//! Todoist caps sections per project, so repositories are grouped instead of
//! getting one section each:
//!
//! 1. The static table wins (`ipo-gmp` and `ipo-gmp-backend` → `IPO GMP`).
//! 2. An unmapped repository on the tracked list gets a section named after itself.
//! 3. Everything else lands in the default bucket.

use crate::config::SyncConfig;
use crate::integrations::{same_name, WorkKind};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct Classifier {
    table: BTreeMap<String, String>,
    tracked: Vec<String>,
    default_section: String,
    pull_request_section: Option<String>,
}

impl Classifier {
    pub fn new(
        table: BTreeMap<String, String>,
        tracked: Vec<String>,
        default_section: impl Into<String>,
    ) -> Self {
        Self {
            table,
            tracked,
            default_section: default_section.into(),
            pull_request_section: None,
        }
    }

    /// Route every pull request to one dedicated section
    pub fn with_pull_request_section(mut self, name: Option<String>) -> Self {
        self.pull_request_section = name;
        self
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(
            config.sections.clone(),
            config.tracked_repos.clone(),
            config.default_section.clone(),
        )
        .with_pull_request_section(config.pull_request_section.clone())
    }

    /// Section for a repository's issues
    pub fn section_for(&self, repo: &str) -> &str {
        // Exact repository names; the table may map several repos to one section
        if let Some(section) = self.table.get(repo) {
            return section;
        }
        if let Some(tracked) = self.tracked.iter().find(|t| t.as_str() == repo) {
            return tracked;
        }
        &self.default_section
    }

    /// Section for an item of the given kind from a repository
    pub fn section_for_item(&self, repo: &str, kind: WorkKind) -> &str {
        match (kind, &self.pull_request_section) {
            (WorkKind::PullRequest, Some(section)) => section.as_str(),
            _ => self.section_for(repo),
        }
    }

    /// Every section name a run may need, de-duplicated, in provisioning order
    ///
    /// Table sections (in repository order), then tracked repositories without
    /// a table entry, then the pull request section, then the default bucket.
    pub fn section_plan(&self) -> Vec<String> {
        let mut plan: Vec<String> = Vec::new();
        let mut push = |name: &str| {
            if !plan.iter().any(|p| same_name(p, name)) {
                plan.push(name.to_string());
            }
        };

        for section in self.table.values() {
            push(section);
        }
        // A table entry already decided where a tracked repo goes
        for repo in &self.tracked {
            if !self.table.contains_key(repo) {
                push(repo);
            }
        }
        if let Some(ref section) = self.pull_request_section {
            push(section);
        }
        push(&self.default_section);

        plan
    }
}
