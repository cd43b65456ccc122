use serde::{Deserialize, Serialize};

/// Redfish `TaskState`. Both parent and child tasks use this enum; the spec
/// treats them as two entity types sharing one state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskState {
    New,
    Running,
    Completed,
    Warning,
    Cancelling,
    Cancelled,
    Exception,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Warning | TaskState::Cancelled | TaskState::Exception
        )
    }
}

/// Redfish `TaskStatus` (an http-style health rollup, not an HTTP status).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "OK")]
    Ok,
    Warning,
    Critical,
}

/// The mutable state handed to `TaskService::update_task` for either a
/// parent or a child task.
#[derive(Debug, Clone)]
pub struct TaskData {
    pub task_id: String,
    pub parent_id: Option<String>,
    pub owner: String,
    pub target_uri: String,
    pub http_method: String,
    pub request: Vec<u8>,
    pub response: Option<crate::response::RpcResponse>,
    pub state: TaskState,
    pub status: TaskStatus,
    pub percent_complete: u8,
}

/// Extracts the trailing task ID segment from a task URI, e.g.
/// `/redfish/v1/TaskService/Tasks/123/` or `/redfish/v1/TaskService/Tasks/123`
/// both yield `123`.
pub fn extract_task_id(uri: &str) -> &str {
    let trimmed = uri.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}
