//! Sync driver
//!
//! Runs one pass:
//!
//! `LoadState → ResolveProject → ListRepos → ProvisionSections →
//! {per repo: ListIssues → ListPullRequests → Publish} → CommitState → Done`
//!
//! Only an unresolvable project (or a state file that cannot be written)
//! fails the run. A failing repository or item is logged, counted and skipped.

use super::classifier::Classifier;
use super::provisioner::{SectionMap, SectionProvisioner};
use super::publisher::TaskPublisher;
use crate::config::SyncConfig;
use crate::integrations::{GitHubAdapter, RepositoryRef, TodoProject, TodoistAdapter, WorkItem};
use crate::storage::{to_iso8601, SyncStateStore};
use crate::Result;
use chrono::{DateTime, Utc};
use std::fmt;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    LoadState,
    ResolveProject,
    ListRepos,
    ProvisionSections,
    PerRepo,
    CommitState,
    Done,
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncPhase::LoadState => "load-state",
            SyncPhase::ResolveProject => "resolve-project",
            SyncPhase::ListRepos => "list-repos",
            SyncPhase::ProvisionSections => "provision-sections",
            SyncPhase::PerRepo => "per-repo",
            SyncPhase::CommitState => "commit-state",
            SyncPhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Repositories processed (after the ignore list)
    pub repositories: u32,
    /// Repositories whose issue or pull request listing failed
    pub repositories_failed: u32,
    pub issues_found: u32,
    pub pull_requests_found: u32,
    pub tasks_created: u32,
    pub tasks_failed: u32,
    /// Issues dropped by the title skip list
    pub skipped: u32,
    pub sections_created: u32,
    pub sections_reused: u32,
    pub sections_unavailable: u32,
    /// Watermark the run started from
    pub last_sync: Option<DateTime<Utc>>,
    /// Watermark written at the end, if any
    pub committed: Option<DateTime<Utc>>,
}

/// Orchestrates a single sync pass
pub struct SyncDriver {
    config: SyncConfig,
    github: GitHubAdapter,
    todoist: TodoistAdapter,
    store: SyncStateStore,
    classifier: Classifier,
}

impl SyncDriver {
    /// Build a driver from a configuration and explicit tokens
    pub fn new(
        config: SyncConfig,
        github_token: impl Into<String>,
        todoist_token: impl Into<String>,
    ) -> Result<Self> {
        let github = GitHubAdapter::new(&config.github, config.account.clone(), github_token)?;
        let todoist = TodoistAdapter::new(&config.todoist, todoist_token)?;
        let store = SyncStateStore::new(config.state_path());
        let classifier = Classifier::from_config(&config);

        Ok(Self {
            config,
            github,
            todoist,
            store,
            classifier,
        })
    }

    /// Build a driver reading both tokens from the configured environment variables
    pub fn from_env(config: SyncConfig) -> Result<Self> {
        let github_token = config.github_token()?;
        let todoist_token = config.todoist_token()?;
        Self::new(config, github_token, todoist_token)
    }

    pub fn state_store(&self) -> &SyncStateStore {
        &self.store
    }

    fn enter(phase: SyncPhase) {
        debug!(phase = %phase, "Entering sync phase");
    }

    /// Run one full pass
    pub async fn run(&self) -> Result<SyncReport> {
        info!("Starting sync process");
        let started_at = Utc::now();
        let mut report = SyncReport::default();

        // Watermark of the previous successful run, absent on the first
        Self::enter(SyncPhase::LoadState);
        report.last_sync = self.store.load();

        // Without a project there is nowhere to write; this is the only fatal lookup
        Self::enter(SyncPhase::ResolveProject);
        let project = match self.todoist.find_project(&self.config.project).await {
            Ok(project) => project,
            Err(e) => {
                error!(project = %self.config.project, error = %e, "Cannot resolve Todoist project");
                return Err(e);
            }
        };
        info!(project = %project.name, id = %project.id, "Resolved Todoist project");

        Self::enter(SyncPhase::ListRepos);
        let (repos, repos_listed) = match self.github.list_owned_public_repos().await {
            Ok(repos) => (repos, true),
            Err(e) => {
                error!(error = %e, "Failed to list repositories");
                (Vec::new(), false)
            }
        };
        // Drop ignored repositories before anything is provisioned for them
        let repos: Vec<RepositoryRef> = repos
            .into_iter()
            .filter(|r| {
                let ignored = self.config.is_ignored(&r.name);
                if ignored {
                    debug!(repo = %r.name, "Ignoring repository");
                }
                !ignored
            })
            .collect();

        Self::enter(SyncPhase::ProvisionSections);
        let sections = self.provision_sections(&project, &mut report).await;

        Self::enter(SyncPhase::PerRepo);
        let publisher = TaskPublisher::new(&self.todoist);
        for repo in &repos {
            self.sync_repo(repo, &project, &sections, &publisher, &mut report)
                .await;
        }

        // Commit only when repositories were actually examined
        Self::enter(SyncPhase::CommitState);
        if repos_listed {
            self.store.save(started_at)?;
            report.committed = Some(started_at);
        } else {
            warn!("Repository listing failed, keeping previous sync time");
        }

        Self::enter(SyncPhase::Done);
        info!(
            repositories = report.repositories,
            repositories_failed = report.repositories_failed,
            issues = report.issues_found,
            pull_requests = report.pull_requests_found,
            created = report.tasks_created,
            failed = report.tasks_failed,
            skipped = report.skipped,
            sections_created = report.sections_created,
            sections_reused = report.sections_reused,
            sections_unavailable = report.sections_unavailable,
            committed = ?report.committed.as_ref().map(to_iso8601),
            "Sync complete"
        );

        Ok(report)
    }

    async fn provision_sections(
        &self,
        project: &TodoProject,
        report: &mut SyncReport,
    ) -> SectionMap {
        // Fetched once; the provisioner appends what it creates
        let mut known = match self.todoist.list_sections(&project.id).await {
            Ok(sections) => sections,
            Err(e) => {
                warn!(error = %e, "Failed to list sections, assuming none exist");
                Vec::new()
            }
        };
        debug!(count = known.len(), "Fetched existing sections");

        let plan = self.classifier.section_plan();
        let provisioner = SectionProvisioner::new(&self.todoist, self.config.max_sections);
        let (map, stats) = provisioner.provision_all(project, &plan, &mut known).await;

        report.sections_created = stats.created;
        report.sections_reused = stats.reused;
        report.sections_unavailable = stats.unavailable;
        map
    }

    async fn sync_repo(
        &self,
        repo: &RepositoryRef,
        project: &TodoProject,
        sections: &SectionMap,
        publisher: &TaskPublisher<'_>,
        report: &mut SyncReport,
    ) {
        report.repositories += 1;
        info!(
            repo = %repo.name,
            section = %self.classifier.section_for(&repo.name),
            "Processing repository"
        );

        // A failed listing empties that stream only; the other still runs
        let mut failed = false;

        let issues = match self
            .github
            .list_issues(repo, report.last_sync.as_ref())
            .await
        {
            Ok(issues) => issues,
            Err(e) => {
                warn!(repo = %repo.name, error = %e, "Failed to list issues");
                failed = true;
                Vec::new()
            }
        };
        info!(repo = %repo.name, count = issues.len(), "Found issues");
        report.issues_found += issues.len() as u32;

        for issue in &issues {
            // Skipped titles are not failures
            if self.config.is_skipped_title(&issue.title) {
                info!(repo = %repo.name, title = %issue.title, "Skipping issue on skip list");
                report.skipped += 1;
                continue;
            }
            self.publish(issue, project, sections, publisher, report)
                .await;
        }

        let pulls = match self.github.list_open_pull_requests(repo).await {
            Ok(pulls) => pulls,
            Err(e) => {
                warn!(repo = %repo.name, error = %e, "Failed to list pull requests");
                failed = true;
                Vec::new()
            }
        };
        info!(repo = %repo.name, count = pulls.len(), "Found pull requests");
        report.pull_requests_found += pulls.len() as u32;

        for pull in &pulls {
            self.publish(pull, project, sections, publisher, report)
                .await;
        }

        if failed {
            report.repositories_failed += 1;
        }
    }

    async fn publish(
        &self,
        item: &WorkItem,
        project: &TodoProject,
        sections: &SectionMap,
        publisher: &TaskPublisher<'_>,
        report: &mut SyncReport,
    ) {
        let section_name = self
            .classifier
            .section_for_item(&item.source_repo.name, item.kind);
        let section_id = sections.get(section_name);
        if section_id.is_none() {
            debug!(section = %section_name, "No section available, publishing without one");
        }
        debug!(
            repo = %item.source_repo.name,
            title = %item.title,
            opened = %to_iso8601(&item.created_at),
            section = %section_name,
            "Publishing item"
        );

        if publisher.publish(item, project, section_id).await {
            report.tasks_created += 1;
        } else {
            report.tasks_failed += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_display() {
        assert_eq!(SyncPhase::ProvisionSections.to_string(), "provision-sections");
        assert_eq!(SyncPhase::Done.to_string(), "done");
    }

    #[test]
    fn test_driver_from_env_requires_tokens() {
        let mut config = SyncConfig::new("ainstarc", "GitHub");
        config.github.token_env = "ISSUESYNC_TEST_NO_GITHUB".to_string();
        assert!(SyncDriver::from_env(config).is_err());
    }

    #[test]
    fn test_driver_uses_configured_state_file() {
        let mut config = SyncConfig::new("ainstarc", "GitHub");
        config.state_file = Some("/tmp/issuesync-test/state.json".into());
        let driver = SyncDriver::new(config, "gh", "td").unwrap();
        assert_eq!(
            driver.state_store().path(),
            std::path::Path::new("/tmp/issuesync-test/state.json")
        );
    }
}
