//! Section provisioning
//!
//! Sections are matched by case-insensitive name, never by id, so repeated
//! runs reuse what earlier runs created. The project's section list is fetched
//! once per run and handed in; sections created during the run are appended
//! to it so the capacity check stays accurate.

use crate::integrations::{name_key, same_name, TodoProject, TodoSection, TodoistAdapter};
use std::collections::HashMap;
use tracing::{info, warn};

/// What happened when a section name was resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionOutcome {
    /// An existing section matched by name
    Reused(String),
    /// A new section was created
    Created(String),
    /// No match and the project is full
    AtCapacity,
    /// Creation was attempted and failed
    Failed,
}

impl SectionOutcome {
    pub fn id(&self) -> Option<&str> {
        match self {
            SectionOutcome::Reused(id) | SectionOutcome::Created(id) => Some(id),
            SectionOutcome::AtCapacity | SectionOutcome::Failed => None,
        }
    }
}

/// Resolved section ids keyed by case-insensitive name
///
/// A name that resolved to nothing maps to `None`: items bound for it are
/// published without a section.
#[derive(Debug, Clone, Default)]
pub struct SectionMap {
    ids: HashMap<String, Option<String>>,
}

impl SectionMap {
    pub fn insert(&mut self, name: &str, id: Option<String>) {
        self.ids.insert(name_key(name), id);
    }

    /// Section id for a name, or `None` when it could not be resolved
    pub fn get(&self, name: &str) -> Option<&str> {
        self.ids.get(&name_key(name))?.as_deref()
    }
}

/// Counters for the final summary
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProvisionStats {
    pub reused: u32,
    pub created: u32,
    pub unavailable: u32,
}

pub struct SectionProvisioner<'a> {
    todoist: &'a TodoistAdapter,
    max_sections: usize,
}

impl<'a> SectionProvisioner<'a> {
    pub fn new(todoist: &'a TodoistAdapter, max_sections: usize) -> Self {
        Self {
            todoist,
            max_sections,
        }
    }

    /// Find or create the section called `name`
    ///
    /// `known` is the project's section list as fetched at the start of the
    /// run; a created section is appended to it. Creation is attempted once.
    pub async fn ensure_section(
        &self,
        project: &TodoProject,
        name: &str,
        known: &mut Vec<TodoSection>,
    ) -> SectionOutcome {
        // Check for an existing section first; names are the only shared key
        if let Some(existing) = known.iter().find(|s| same_name(&s.name, name)) {
            info!(section = %name, id = %existing.id, "Reusing section");
            return SectionOutcome::Reused(existing.id.clone());
        }

        // Sections created earlier in this run count towards the cap
        if known.len() >= self.max_sections {
            warn!(
                section = %name,
                max = self.max_sections,
                "Max section limit reached, skipping section"
            );
            return SectionOutcome::AtCapacity;
        }

        match self.todoist.create_section(&project.id, name).await {
            Ok(section) => {
                let id = section.id.clone();
                known.push(section);
                SectionOutcome::Created(id)
            }
            Err(e) => {
                warn!(section = %name, error = %e, "Failed to create section");
                SectionOutcome::Failed
            }
        }
    }

    /// Resolve every name of a section plan, in order
    pub async fn provision_all(
        &self,
        project: &TodoProject,
        plan: &[String],
        known: &mut Vec<TodoSection>,
    ) -> (SectionMap, ProvisionStats) {
        let mut map = SectionMap::default();
        let mut stats = ProvisionStats::default();

        for name in plan {
            let outcome = self.ensure_section(project, name, known).await;
            match outcome {
                SectionOutcome::Reused(_) => stats.reused += 1,
                SectionOutcome::Created(_) => stats.created += 1,
                SectionOutcome::AtCapacity | SectionOutcome::Failed => stats.unavailable += 1,
            }
            map.insert(name, outcome.id().map(str::to_string));
        }

        (map, stats)
    }
}
