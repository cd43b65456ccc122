use thiserror::Error;

use crate::contracts::task_service::TaskServiceError;

/// Error type shared by the core fan-out engine and the API crate.
///
/// Every variant maps to exactly one HTTP status / Redfish extended code pair
/// in `trigger-fanout-api::error`; this crate stays framework-agnostic and
/// only carries the classification.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("plugin transport error: {0}")]
    PluginTransport(String),

    #[error("plugin authentication failed: {0}")]
    PluginAuth(String),

    #[error("task service error: {0}")]
    TaskService(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("operation cancelled")]
    Cancelled,
}

impl From<TaskServiceError> for CoreError {
    fn from(err: TaskServiceError) -> Self {
        match err {
            TaskServiceError::Cancelling => CoreError::Cancelled,
            TaskServiceError::Other(msg) => CoreError::TaskService(msg),
        }
    }
}
