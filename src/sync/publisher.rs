//! Task publishing
//!
//! One Todoist task per work item. The description carries the GitHub link
//! and repository so a human can spot duplicates; nothing here deduplicates.

use crate::integrations::{CreateTaskRequest, TodoProject, TodoistAdapter, WorkItem, WorkKind};
use tracing::{debug, warn};

/// Build the task for a work item
pub fn build_task(
    item: &WorkItem,
    project: &TodoProject,
    section_id: Option<&str>,
) -> CreateTaskRequest {
    // Pull requests are marked in the title; the description is the same for both
    let content = match item.kind {
        WorkKind::Issue => item.title.clone(),
        WorkKind::PullRequest => format!("[PR] {}", item.title),
    };

    CreateTaskRequest {
        content,
        description: format!("GitHub: {}\nRepo: {}", item.url, item.source_repo.name),
        project_id: project.id.clone(),
        section_id: section_id.map(str::to_string),
    }
}

pub struct TaskPublisher<'a> {
    todoist: &'a TodoistAdapter,
}

impl<'a> TaskPublisher<'a> {
    pub fn new(todoist: &'a TodoistAdapter) -> Self {
        Self { todoist }
    }

    /// Create the task for `item`; failures are logged and reported as `false`
    pub async fn publish(
        &self,
        item: &WorkItem,
        project: &TodoProject,
        section_id: Option<&str>,
    ) -> bool {
        let request = build_task(item, project, section_id);

        // The caller counts the failure and moves on to the next item
        match self.todoist.create_task(&request).await {
            Ok(task) => {
                debug!(task = %task.id, title = %request.content, "Created task");
                true
            }
            Err(e) => {
                warn!(title = %request.content, error = %e, "Failed to create task");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::RepositoryRef;
    use chrono::Utc;

    fn item(kind: WorkKind) -> WorkItem {
        WorkItem {
            title: "Add dark mode".to_string(),
            url: "https://github.com/ainstarc/pixel-realm/issues/3".to_string(),
            created_at: Utc::now(),
            kind,
            source_repo: RepositoryRef::new("ainstarc", "pixel-realm"),
        }
    }

    fn project() -> TodoProject {
        TodoProject {
            id: "220".to_string(),
            name: "GitHub".to_string(),
        }
    }

    #[test]
    fn test_issue_task() {
        let task = build_task(&item(WorkKind::Issue), &project(), Some("9"));
        assert_eq!(task.content, "Add dark mode");
        assert_eq!(
            task.description,
            "GitHub: https://github.com/ainstarc/pixel-realm/issues/3\nRepo: pixel-realm"
        );
        assert_eq!(task.project_id, "220");
        assert_eq!(task.section_id.as_deref(), Some("9"));
    }

    #[test]
    fn test_pull_request_task_is_prefixed() {
        let task = build_task(&item(WorkKind::PullRequest), &project(), None);
        assert_eq!(task.content, "[PR] Add dark mode");
        assert!(task.section_id.is_none());
    }
}
