//! issuesync configuration file handling
//!
//! Loads ~/.config/issuesync/config.yaml: the GitHub account to mirror, the
//! Todoist project to mirror into, and the static repo → section tables.

use crate::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Todoist caps the number of sections a project may hold
pub const DEFAULT_MAX_SECTIONS: usize = 20;

/// GitHub API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubSettings {
    /// REST API base URL
    #[serde(default = "default_github_api_url")]
    pub api_url: String,

    /// Environment variable holding the personal access token
    #[serde(default = "default_github_token_env")]
    pub token_env: String,
}

fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_github_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            api_url: default_github_api_url(),
            token_env: default_github_token_env(),
        }
    }
}

/// Todoist API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoistSettings {
    /// REST API base URL
    #[serde(default = "default_todoist_api_url")]
    pub api_url: String,

    /// Environment variable holding the API token
    #[serde(default = "default_todoist_token_env")]
    pub token_env: String,
}

fn default_todoist_api_url() -> String {
    "https://api.todoist.com/rest/v2".to_string()
}

fn default_todoist_token_env() -> String {
    "TODOIST_TOKEN".to_string()
}

impl Default for TodoistSettings {
    fn default() -> Self {
        Self {
            api_url: default_todoist_api_url(),
            token_env: default_todoist_token_env(),
        }
    }
}

/// issuesync configuration
///
/// Everything here is static for the duration of a run. The section tables
/// are handed to the [`Classifier`](crate::sync::Classifier) once and never
/// mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// GitHub login whose public repositories are mirrored
    pub account: String,

    /// Name of the Todoist project to mirror into (matched case-insensitively)
    pub project: String,

    #[serde(default)]
    pub github: GitHubSettings,

    #[serde(default)]
    pub todoist: TodoistSettings,

    /// Repository name → section name
    #[serde(default)]
    pub sections: BTreeMap<String, String>,

    /// Repositories that get a section named after themselves when unmapped
    #[serde(default)]
    pub tracked_repos: Vec<String>,

    /// Repositories that are never mirrored
    #[serde(default)]
    pub ignored_repos: Vec<String>,

    /// Bucket for every repository that is neither mapped nor tracked
    #[serde(default = "default_section")]
    pub default_section: String,

    /// Section that collects every pull request; unset means PRs follow their repository
    #[serde(default = "default_pull_request_section")]
    pub pull_request_section: Option<String>,

    /// Maximum number of sections the Todoist project may hold
    #[serde(default = "default_max_sections")]
    pub max_sections: usize,

    /// Issue titles (compared after trimming) that are never mirrored
    #[serde(default)]
    pub skip_titles: Vec<String>,

    /// Where the last-sync timestamp lives (default: ~/.config/issuesync/last-sync.json)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_file: Option<PathBuf>,
}

fn default_section() -> String {
    "Default".to_string()
}

fn default_pull_request_section() -> Option<String> {
    Some("Pull Requests".to_string())
}

fn default_max_sections() -> usize {
    DEFAULT_MAX_SECTIONS
}

impl SyncConfig {
    /// Create a configuration with default tables for an account and project
    pub fn new(account: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            project: project.into(),
            github: GitHubSettings::default(),
            todoist: TodoistSettings::default(),
            sections: BTreeMap::new(),
            tracked_repos: Vec::new(),
            ignored_repos: Vec::new(),
            default_section: default_section(),
            pull_request_section: default_pull_request_section(),
            max_sections: DEFAULT_MAX_SECTIONS,
            skip_titles: Vec::new(),
            state_file: None,
        }
    }

    /// Load configuration from the default path (~/.config/issuesync/config.yaml)
    pub fn load_default() -> Result<Self> {
        let path = Self::default_path();
        Self::load(&path)
    }

    /// Load configuration from a specific path
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SyncError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        tracing::debug!(path = %path.display(), "Loading issuesync configuration");

        let content = fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;

        tracing::debug!(
            account = %config.account,
            project = %config.project,
            mapped = config.sections.len(),
            tracked = config.tracked_repos.len(),
            ignored = config.ignored_repos.len(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;

        Ok(())
    }

    /// Get the default config directory (~/.config/issuesync)
    pub fn config_dir() -> PathBuf {
        // Always use ~/.config for consistency across platforms (macOS, Linux)
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".config");
        path.push("issuesync");
        path
    }

    /// Get the default config path (~/.config/issuesync/config.yaml)
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Path of the last-sync state file
    pub fn state_path(&self) -> PathBuf {
        self.state_file
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("last-sync.json"))
    }

    /// Whether a repository is on the ignore list (case-insensitive)
    pub fn is_ignored(&self, repo: &str) -> bool {
        self.ignored_repos
            .iter()
            .any(|r| r.eq_ignore_ascii_case(repo))
    }

    /// Whether an issue title is on the skip list
    pub fn is_skipped_title(&self, title: &str) -> bool {
        let title = title.trim();
        self.skip_titles.iter().any(|t| t.trim() == title)
    }

    /// Read the GitHub token from the configured environment variable
    pub fn github_token(&self) -> Result<String> {
        read_token(&self.github.token_env)
    }

    /// Read the Todoist token from the configured environment variable
    pub fn todoist_token(&self) -> Result<String> {
        read_token(&self.todoist.token_env)
    }
}

fn read_token(env_var: &str) -> Result<String> {
    match std::env::var(env_var) {
        Ok(token) if !token.trim().is_empty() => Ok(token),
        _ => Err(SyncError::Config(format!(
            "Environment variable {} is not set",
            env_var
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_defaults() {
        let config = SyncConfig::new("ainstarc", "GitHub");
        assert_eq!(config.default_section, "Default");
        assert_eq!(
            config.pull_request_section.as_deref(),
            Some("Pull Requests")
        );
        assert_eq!(config.max_sections, 20);
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.todoist.token_env, "TODOIST_TOKEN");
    }

    #[test]
    fn test_minimal_yaml() {
        let yaml = "account: ainstarc\nproject: GitHub\n";
        let config: SyncConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.account, "ainstarc");
        assert!(config.sections.is_empty());
        assert_eq!(config.default_section, "Default");
        assert_eq!(config.max_sections, DEFAULT_MAX_SECTIONS);
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
account: ainstarc
project: GitHub
github:
  api_url: http://localhost:9000
todoist:
  token_env: MY_TODOIST
sections:
  ipo-gmp: IPO GMP
  ipo-gmp-backend: IPO GMP
tracked_repos: [pixel-realm]
ignored_repos: [scratch]
pull_request_section: null
skip_titles:
  - "[Hygiene] Apply README"
"#;
        let config: SyncConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.github.api_url, "http://localhost:9000");
        assert_eq!(config.github.token_env, "GITHUB_TOKEN");
        assert_eq!(config.todoist.token_env, "MY_TODOIST");
        assert_eq!(config.sections.get("ipo-gmp-backend").unwrap(), "IPO GMP");
        assert!(config.pull_request_section.is_none());
        assert!(config.is_ignored("Scratch"));
        assert!(config.is_skipped_title("  [Hygiene] Apply README "));
        assert!(!config.is_skipped_title("Real bug"));
    }

    #[test]
    fn test_save_and_load() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        let mut config = SyncConfig::new("ainstarc", "GitHub");
        config
            .sections
            .insert("git-init".to_string(), "GitBot".to_string());
        config.save(path).unwrap();

        let loaded = SyncConfig::load(path).unwrap();
        assert_eq!(loaded.account, "ainstarc");
        assert_eq!(loaded.sections.get("git-init").unwrap(), "GitBot");
    }

    #[test]
    fn test_load_missing_file() {
        let result = SyncConfig::load("/nonexistent/config.yaml");
        assert!(matches!(result, Err(SyncError::Config(_))));
    }

    #[test]
    fn test_state_path() {
        let mut config = SyncConfig::new("a", "p");
        assert!(config.state_path().ends_with("issuesync/last-sync.json"));

        config.state_file = Some(PathBuf::from("/tmp/state.json"));
        assert_eq!(config.state_path(), PathBuf::from("/tmp/state.json"));
    }

    #[test]
    fn test_missing_token() {
        let mut config = SyncConfig::new("a", "p");
        config.github.token_env = "ISSUESYNC_TEST_UNSET_TOKEN".to_string();
        assert!(matches!(config.github_token(), Err(SyncError::Config(_))));
    }
}
