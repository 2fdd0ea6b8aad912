//! Configuration validation
//!
//! Validates issuesync configuration for correctness:
//! - Account and project are set
//! - API URLs are HTTP(S)
//! - Section names are not blank
//! - No repository is both tracked and ignored
//! - The section plan fits under the project's section cap

use super::sync_config::SyncConfig;
use crate::sync::Classifier;
use crate::SyncError;

/// Validation error details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
pub type ValidationResult = std::result::Result<(), Vec<ValidationError>>;

/// Validate an issuesync configuration, reporting every problem at once
pub fn validate_config(config: &SyncConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if config.account.trim().is_empty() {
        errors.push(ValidationError::new("account", "Account cannot be empty"));
    }

    if config.project.trim().is_empty() {
        errors.push(ValidationError::new("project", "Project cannot be empty"));
    }

    for (field, url) in [
        ("github.api_url", &config.github.api_url),
        ("todoist.api_url", &config.todoist.api_url),
    ] {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            errors.push(ValidationError::new(field, format!("Invalid URL: {}", url)));
        }
    }

    if config.max_sections == 0 {
        errors.push(ValidationError::new(
            "max_sections",
            "Must be greater than 0",
        ));
    }

    if config.default_section.trim().is_empty() {
        errors.push(ValidationError::new(
            "default_section",
            "Section name cannot be empty",
        ));
    }

    if let Some(ref name) = config.pull_request_section {
        if name.trim().is_empty() {
            errors.push(ValidationError::new(
                "pull_request_section",
                "Section name cannot be empty (omit the key to disable)",
            ));
        }
    }

    for (repo, section) in &config.sections {
        if section.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("sections.{}", repo),
                "Section name cannot be empty",
            ));
        }
    }

    for repo in &config.tracked_repos {
        if config.is_ignored(repo) {
            errors.push(ValidationError::new(
                "tracked_repos",
                format!("Repository '{}' is both tracked and ignored", repo),
            ));
        }
    }

    let plan = Classifier::from_config(config).section_plan();
    if config.max_sections > 0 && plan.len() > config.max_sections {
        errors.push(ValidationError::new(
            "sections",
            format!(
                "{} distinct sections required but the project allows {}",
                plan.len(),
                config.max_sections
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate configuration and return a Result
pub fn validate_config_result(config: &SyncConfig) -> crate::Result<()> {
    validate_config(config).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        SyncError::Config(format!(
            "Configuration validation failed:\n  - {}",
            messages.join("\n  - ")
        ))
    })
}
