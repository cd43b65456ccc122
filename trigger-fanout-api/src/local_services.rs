/// Local stand-ins for the `SessionService` and `TaskService` contracts.
///
/// The real implementations are other ODIM microservices reached over RPC,
/// which is explicitly out of scope for this crate (see `SPEC_FULL.md` §1).
/// These implementations let the binary run standalone for local
/// development: every session is authorized as `admin`, and task updates are
/// only logged, never queried back. A deployment wires `AppState` to real
/// RPC clients instead.
use async_trait::async_trait;
use tracing::info;
use trigger_fanout_shared::contracts::{SessionService, TaskService, TaskServiceError};
use trigger_fanout_shared::models::TaskData;
use trigger_fanout_shared::response::RpcResponse;
use trigger_fanout_shared::CoreError;
use uuid::Uuid;

pub struct AllowAllSessionService;

#[async_trait]
impl SessionService for AllowAllSessionService {
    async fn authorize(&self, _session_token: &str, _privileges: &[&str], _oem_privileges: &[&str]) -> Result<(), RpcResponse> {
        Ok(())
    }

    async fn get_session_user_name(&self, _session_token: &str) -> Result<String, CoreError> {
        Ok("admin".to_string())
    }
}

pub struct LoggingTaskService;

#[async_trait]
impl TaskService for LoggingTaskService {
    async fn create_task(&self, owner: &str) -> Result<String, TaskServiceError> {
        let id = Uuid::new_v4();
        info!(owner = %owner, task_id = %id, "created parent task");
        Ok(format!("/redfish/v1/TaskService/Tasks/{id}"))
    }

    async fn create_child_task(&self, owner: &str, parent_task_id: &str) -> Result<String, TaskServiceError> {
        let id = Uuid::new_v4();
        info!(owner = %owner, parent_task_id = %parent_task_id, task_id = %id, "created child task");
        Ok(format!("/redfish/v1/TaskService/Tasks/{id}"))
    }

    async fn update_task(&self, data: TaskData) -> Result<(), TaskServiceError> {
        info!(
            task_id = %data.task_id,
            parent_id = ?data.parent_id,
            state = ?data.state,
            status = ?data.status,
            percent_complete = data.percent_complete,
            "task update"
        );
        Ok(())
    }
}
