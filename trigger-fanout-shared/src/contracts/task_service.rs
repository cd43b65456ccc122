use async_trait::async_trait;
use thiserror::Error;

use crate::models::TaskData;

/// Errors a `TaskService::update_task` call can return.
///
/// The original ODIM source signals an in-flight cancellation by returning
/// an error whose `.Error()` string equals `"cancelling"`, then checks for
/// that string at every call site. Per the redesign notes this is replaced
/// by a dedicated variant so the compiler enforces the check instead of a
/// string compare.
#[derive(Debug, Error)]
pub enum TaskServiceError {
    #[error("task transitioned to cancelling")]
    Cancelling,

    #[error("task service error: {0}")]
    Other(String),
}

/// External task-tracking service. Out of scope to implement: the spec
/// treats parent tasks and child (sub-)tasks as two entity types managed by
/// this one collaborator.
#[async_trait]
pub trait TaskService: Send + Sync {
    /// Creates a parent task for `owner`, returning its resource URI.
    async fn create_task(&self, owner: &str) -> Result<String, TaskServiceError>;

    /// Creates a child task under `parent_task_id`, returning its resource
    /// URI.
    async fn create_child_task(
        &self,
        owner: &str,
        parent_task_id: &str,
    ) -> Result<String, TaskServiceError>;

    /// Persists an intermediate or final task state transition.
    async fn update_task(&self, data: TaskData) -> Result<(), TaskServiceError>;
}
