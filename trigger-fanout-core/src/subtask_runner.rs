//! Runs a single plugin dispatch as a child task, grounded on the original
//! `sendRequest` function and on `axontask-worker::orchestrator::execute_task`'s
//! spawn-one-unit-of-work shape.

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use trigger_fanout_shared::contracts::{TaskService, TaskServiceError};
use trigger_fanout_shared::models::{Plugin, TaskData, TaskState, TaskStatus};

use crate::plugin_client::{DispatchError, PluginDispatch};

/// The per-plugin result the coordinator's aggregation loop consumes.
#[derive(Debug, Clone)]
pub struct SubtaskResult {
    pub plugin_id: String,
    pub status_code: u16,
}

impl SubtaskResult {
    fn new(plugin_id: &str, status_code: u16) -> Self {
        SubtaskResult {
            plugin_id: plugin_id.to_string(),
            status_code,
        }
    }
}

/// Dispatches a trigger update to one plugin and reports the outcome on
/// `results`. Spawned once per plugin by the `FanOutCoordinator`.
///
/// A failure to create the child task sends a 500 result and returns
/// without ever calling `dispatch`. A failure during dispatch itself
/// (auth or transport) sends the corresponding status but, matching the
/// original's asymmetry, does *not* finalize the child task -- it is left
/// for the `TaskService` implementation to reconcile out of band.
pub async fn run_subtask(
    plugin: Plugin,
    path: String,
    body: JsonValue,
    owner: String,
    parent_task_id: String,
    dispatcher: Arc<dyn PluginDispatch>,
    task_service: Arc<dyn TaskService>,
    results: mpsc::Sender<SubtaskResult>,
    cancel: CancellationToken,
) {
    let child_uri = match task_service.create_child_task(&owner, &parent_task_id).await {
        Ok(uri) => uri,
        Err(err) => {
            error!(plugin_id = %plugin.id, parent_task_id = %parent_task_id, error = %err, "failed to create child task");
            let _ = results.send(SubtaskResult::new(&plugin.id, 500)).await;
            return;
        }
    };
    let child_task_id = trigger_fanout_shared::models::extract_task_id(&child_uri).to_string();

    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            info!(plugin_id = %plugin.id, task_id = %child_task_id, "cancelling before plugin dispatch completed");
            let _ = results.send(SubtaskResult::new(&plugin.id, 0)).await;
            let _ = task_service
                .update_task(TaskData {
                    task_id: child_task_id,
                    parent_id: Some(parent_task_id),
                    owner,
                    target_uri: String::new(),
                    http_method: "PATCH".into(),
                    request: Vec::new(),
                    response: None,
                    state: TaskState::Cancelled,
                    status: TaskStatus::Critical,
                    percent_complete: 100,
                })
                .await;
            return;
        }
        result = dispatcher.dispatch(&plugin, &path, &body) => result,
    };

    match outcome {
        Ok(dispatch_outcome) => {
            let _ = results
                .send(SubtaskResult::new(&plugin.id, dispatch_outcome.status_code))
                .await;

            let update = task_service
                .update_task(TaskData {
                    task_id: child_task_id.clone(),
                    parent_id: Some(parent_task_id.clone()),
                    owner: owner.clone(),
                    target_uri: format!("{}{path}", plugin.base_url()),
                    http_method: "PATCH".into(),
                    request: body.to_string().into_bytes(),
                    response: None,
                    state: TaskState::Completed,
                    status: TaskStatus::Ok,
                    percent_complete: 100,
                })
                .await;

            if let Err(TaskServiceError::Cancelling) = update {
                info!(plugin_id = %plugin.id, task_id = %child_task_id, "task service reported cancellation after dispatch completed");
                cancel.cancel();
                let _ = task_service
                    .update_task(TaskData {
                        task_id: child_task_id,
                        parent_id: Some(parent_task_id),
                        owner,
                        target_uri: String::new(),
                        http_method: "PATCH".into(),
                        request: Vec::new(),
                        response: None,
                        state: TaskState::Cancelled,
                        status: TaskStatus::Critical,
                        percent_complete: 100,
                    })
                    .await;
            }
        }
        Err(err) => {
            let status_code = match &err {
                DispatchError::Auth { status_code } => *status_code,
                DispatchError::Transport(_) => 500,
            };
            warn!(plugin_id = %plugin.id, error = %err, "plugin dispatch failed");
            let _ = results.send(SubtaskResult::new(&plugin.id, status_code)).await;
            // Deliberately no `update_task` call here: a dispatch-time
            // failure leaves the child task as originally created, matching
            // the original implementation's behavior.
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use trigger_fanout_shared::models::PluginAuthType;

    struct FakeTaskService {
        updates: Mutex<Vec<TaskData>>,
        fail_create_child: bool,
    }

    impl FakeTaskService {
        fn new() -> Self {
            FakeTaskService {
                updates: Mutex::new(Vec::new()),
                fail_create_child: false,
            }
        }
    }

    #[async_trait]
    impl TaskService for FakeTaskService {
        async fn create_task(&self, _owner: &str) -> Result<String, TaskServiceError> {
            Ok("/redfish/v1/TaskService/Tasks/parent-1".into())
        }

        async fn create_child_task(&self, _owner: &str, _parent: &str) -> Result<String, TaskServiceError> {
            if self.fail_create_child {
                return Err(TaskServiceError::Other("store unavailable".into()));
            }
            Ok("/redfish/v1/TaskService/Tasks/child-1".into())
        }

        async fn update_task(&self, data: TaskData) -> Result<(), TaskServiceError> {
            self.updates.lock().unwrap().push(data);
            Ok(())
        }
    }

    struct FakeDispatcher {
        status_code: u16,
    }

    #[async_trait]
    impl PluginDispatch for FakeDispatcher {
        async fn dispatch(
            &self,
            _plugin: &Plugin,
            _path: &str,
            _body: &JsonValue,
        ) -> Result<crate::plugin_client::DispatchOutcome, DispatchError> {
            Ok(crate::plugin_client::DispatchOutcome {
                status_code: self.status_code,
                body: serde_json::json!({}),
            })
        }
    }

    fn sample_plugin() -> Plugin {
        Plugin {
            id: "p1".into(),
            address: "10.0.0.1".into(),
            port: 45001,
            username: "admin".into(),
            password: b"secret".to_vec(),
            preferred_auth_type: PluginAuthType::XAuthToken,
            plugin_type: "GenericPlugin".into(),
        }
    }

    #[tokio::test]
    async fn reports_500_and_creates_no_child_task_on_create_child_failure() {
        let task_service = Arc::new(FakeTaskService {
            updates: Mutex::new(Vec::new()),
            fail_create_child: true,
        });
        let dispatcher = Arc::new(FakeDispatcher { status_code: 200 });
        let (tx, mut rx) = mpsc::channel(1);

        run_subtask(
            sample_plugin(),
            "trigger-1".into(),
            serde_json::json!({"Name": "t1"}),
            "admin".into(),
            "parent-1".into(),
            dispatcher,
            task_service.clone(),
            tx,
            CancellationToken::new(),
        )
        .await;

        let result = rx.recv().await.unwrap();
        assert_eq!(result.status_code, 500);
        assert!(task_service.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn successful_dispatch_marks_child_task_completed() {
        let task_service = Arc::new(FakeTaskService::new());
        let dispatcher = Arc::new(FakeDispatcher { status_code: 200 });
        let (tx, mut rx) = mpsc::channel(1);

        run_subtask(
            sample_plugin(),
            "trigger-1".into(),
            serde_json::json!({"Name": "t1"}),
            "admin".into(),
            "parent-1".into(),
            dispatcher,
            task_service.clone(),
            tx,
            CancellationToken::new(),
        )
        .await;

        let result = rx.recv().await.unwrap();
        assert_eq!(result.status_code, 200);
        let updates = task_service.updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].state, TaskState::Completed);
    }
}
