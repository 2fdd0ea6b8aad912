//! Todoist REST v2 adapter
//!
//! Create-only: projects and sections are read, sections and tasks are
//! created. Nothing is ever updated or deleted.

use super::http::{read_json, send};
use super::same_name;
use crate::config::TodoistSettings;
use crate::{Result, SyncError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Per-request timeout for listing calls
const GET_TIMEOUT: Duration = Duration::from_secs(10);
/// Per-request timeout for create operations
const WRITE_TIMEOUT: Duration = Duration::from_secs(15);

/// Todoist API client
pub struct TodoistAdapter {
    client: Client,
    base_url: String,
    auth_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoProject {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoSection {
    pub id: String,
    pub name: String,
    pub project_id: String,
}

/// Created task; only the id is read back
#[derive(Debug, Clone, Deserialize)]
pub struct TodoTask {
    pub id: String,
}

/// Section creation request
#[derive(Debug, Clone, Serialize)]
pub struct CreateSectionRequest {
    pub name: String,
    pub project_id: String,
}

/// Task creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateTaskRequest {
    pub content: String,
    pub description: String,
    pub project_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
}

impl TodoistAdapter {
    /// Create a new Todoist adapter
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(settings: &TodoistSettings, token: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            base_url: settings.api_url.trim_end_matches('/').to_string(),
            auth_token: token.into(),
        })
    }

    /// List all projects
    pub async fn list_projects(&self) -> Result<Vec<TodoProject>> {
        let request = self
            .client
            .get(format!("{}/projects", self.base_url))
            .bearer_auth(&self.auth_token)
            .timeout(GET_TIMEOUT);
        let response = send(request, "Todoist", "list projects").await?;

        read_json(response, "Todoist", "list projects").await
    }

    /// Find a project by case-insensitive name
    pub async fn find_project(&self, name: &str) -> Result<TodoProject> {
        let projects = self.list_projects().await?;
        debug!(count = projects.len(), "Fetched Todoist projects");

        // Projects are matched by name only; ids differ per account
        projects
            .into_iter()
            .find(|p| same_name(&p.name, name))
            .ok_or_else(|| SyncError::ProjectNotFound(name.to_string()))
    }

    /// List the sections of a project
    pub async fn list_sections(&self, project_id: &str) -> Result<Vec<TodoSection>> {
        let request = self
            .client
            .get(format!("{}/sections", self.base_url))
            .query(&[("project_id", project_id)])
            .bearer_auth(&self.auth_token)
            .timeout(GET_TIMEOUT);
        let response = send(request, "Todoist", "list sections").await?;

        read_json(response, "Todoist", "list sections").await
    }

    /// Create a section in a project
    pub async fn create_section(&self, project_id: &str, name: &str) -> Result<TodoSection> {
        let request = CreateSectionRequest {
            name: name.to_string(),
            project_id: project_id.to_string(),
        };

        let builder = self
            .client
            .post(format!("{}/sections", self.base_url))
            .bearer_auth(&self.auth_token)
            .json(&request)
            .timeout(WRITE_TIMEOUT);
        let response = send(builder, "Todoist", "create section").await?;

        let section: TodoSection = read_json(response, "Todoist", "create section").await?;
        info!(section = %section.name, id = %section.id, "Created new section");
        Ok(section)
    }

    /// Create a task
    pub async fn create_task(&self, request: &CreateTaskRequest) -> Result<TodoTask> {
        let builder = self
            .client
            .post(format!("{}/tasks", self.base_url))
            .bearer_auth(&self.auth_token)
            .json(request)
            .timeout(WRITE_TIMEOUT);
        let response = send(builder, "Todoist", "create task").await?;

        read_json(response, "Todoist", "create task").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_request_omits_missing_section() {
        let request = CreateTaskRequest {
            content: "Fix it".to_string(),
            description: "GitHub: https://example.com\nRepo: alpha".to_string(),
            project_id: "42".to_string(),
            section_id: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["project_id"], "42");
        assert!(json.get("section_id").is_none());
    }

    #[test]
    fn test_task_request_includes_section() {
        let request = CreateTaskRequest {
            content: "Fix it".to_string(),
            description: String::new(),
            project_id: "42".to_string(),
            section_id: Some("7".to_string()),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["section_id"], "7");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let settings = TodoistSettings {
            api_url: "http://127.0.0.1:1".to_string(),
            token_env: "TODOIST_TOKEN".to_string(),
        };
        let adapter = TodoistAdapter::new(&settings, "t0ken").unwrap();

        let err = adapter.list_projects().await.unwrap_err();
        assert!(matches!(err, SyncError::Network(_)), "got {:?}", err);
    }

    #[test]
    fn test_created_task_ignores_extra_fields() {
        let json = r#"{"id": "2995104339", "content": "Fix it", "section_id": null, "priority": 1}"#;
        let task: TodoTask = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, "2995104339");
    }

    #[test]
    fn test_section_deserialization_ignores_extra_fields() {
        let json = r#"{"id": "7025", "project_id": "2203306141", "order": 1, "name": "Groceries"}"#;
        let section: TodoSection = serde_json::from_str(json).unwrap();
        assert_eq!(section.name, "Groceries");
        assert_eq!(section.project_id, "2203306141");
    }
}
