//! Fans a trigger update out to every registered plugin and aggregates the
//! results into a parent task update. Grounded on the original `UpdateTrigger`
//! function and, for the spawn/aggregate shape, on
//! `axontask-worker::orchestrator::WorkerOrchestrator::run`.

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use trigger_fanout_shared::contracts::{TaskService, TaskServiceError};
use trigger_fanout_shared::models::{TaskData, TaskState, TaskStatus, TriggerRequest, KNOWN_TRIGGER_PROPERTIES};
use trigger_fanout_shared::response::{self, ExtendedCode, RpcResponse};
use trigger_fanout_shared::validation;

use crate::plugin_client::PluginDispatch;
use crate::plugin_registry::PluginRegistry;
use crate::subtask_runner::{run_subtask, SubtaskResult};

/// Runs one fan-out for one `PATCH Triggers` request. A new coordinator (or
/// at least a fresh `run` call) is used per request; it holds no mutable
/// request-scoped state between calls.
pub struct FanOutCoordinator {
    registry: PluginRegistry,
    dispatcher: Arc<dyn PluginDispatch>,
    task_service: Arc<dyn TaskService>,
}

impl FanOutCoordinator {
    pub fn new(
        registry: PluginRegistry,
        dispatcher: Arc<dyn PluginDispatch>,
        task_service: Arc<dyn TaskService>,
    ) -> Self {
        FanOutCoordinator {
            registry,
            dispatcher,
            task_service,
        }
    }

    /// Runs to completion, always ending with exactly one `update_task` call
    /// that leaves `parent_task_id` in a terminal state (`Completed`,
    /// `Cancelled`, or `Exception`). Intended to be `tokio::spawn`ed by the
    /// RPC handler, which has already returned 202 to its caller.
    pub async fn run(&self, request: TriggerRequest, owner: String, parent_task_id: String) {
        if validation::is_empty_request(&request.body) {
            self.finish(
                &parent_task_id,
                &owner,
                response::general_error(
                    400,
                    ExtendedCode::PropertyMissing,
                    "The request body must not be empty.",
                    vec!["Triggers".into()],
                ),
                TaskState::Exception,
                TaskStatus::Critical,
            )
            .await;
            return;
        }

        let trigger_body: JsonValue = match serde_json::from_slice(&request.body) {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "request body is not valid JSON");
                self.finish(
                    &parent_task_id,
                    &owner,
                    response::general_error(
                        400,
                        ExtendedCode::PropertyUnknown,
                        "The request body could not be parsed as a Triggers resource.",
                        vec!["Triggers".into()],
                    ),
                    TaskState::Exception,
                    TaskStatus::Critical,
                )
                .await;
                return;
            }
        };

        let offenders = match validation::validate_property_case(&trigger_body, KNOWN_TRIGGER_PROPERTIES) {
            Ok(offenders) => offenders,
            Err(err) => {
                self.finish(
                    &parent_task_id,
                    &owner,
                    response::general_error(500, ExtendedCode::InternalError, &err.to_string(), vec![]),
                    TaskState::Exception,
                    TaskStatus::Critical,
                )
                .await;
                return;
            }
        };
        if !offenders.is_empty() {
            self.finish(
                &parent_task_id,
                &owner,
                response::general_error(
                    400,
                    ExtendedCode::PropertyUnknown,
                    "One or more properties given in the request body are not valid, ensure properties are listed in uppercamelcase",
                    vec!["Triggers".into()],
                ),
                TaskState::Exception,
                TaskStatus::Critical,
            )
            .await;
            return;
        }

        let plugins = match self.registry.list().await {
            Ok(plugins) => plugins,
            Err(err) => {
                self.finish(
                    &parent_task_id,
                    &owner,
                    response::general_error(500, ExtendedCode::InternalError, &err.to_string(), vec![]),
                    TaskState::Exception,
                    TaskStatus::Critical,
                )
                .await;
                return;
            }
        };

        let plugin_count = plugins.len();
        if plugin_count == 0 {
            self.finish(
                &parent_task_id,
                &owner,
                response::success(202, "No plugins are registered; nothing to update."),
                TaskState::Completed,
                TaskStatus::Ok,
            )
            .await;
            return;
        }

        let (tx, mut rx) = mpsc::channel(plugin_count);
        let cancel = CancellationToken::new();

        for plugin in plugins {
            let plugin_id = plugin.id.clone();
            tokio::spawn(run_subtask(
                plugin,
                request.url.clone(),
                trigger_body.clone(),
                owner.clone(),
                parent_task_id.clone(),
                self.dispatcher.clone(),
                self.task_service.clone(),
                tx.clone(),
                cancel.clone(),
            ));
            info!(plugin_id = %plugin_id, task_id = %parent_task_id, "dispatched subtask");
        }
        drop(tx);

        let mut results: Vec<SubtaskResult> = Vec::with_capacity(plugin_count);
        let mut completed = 0usize;
        while let Some(result) = rx.recv().await {
            completed += 1;
            results.push(result);

            // Divide before multiplying: every intermediate update reports 0
            // until the final subtask reports in, matching the original's
            // integer-division artifact rather than a smooth percentage.
            let percent_complete = ((completed / plugin_count) * 100) as u8;
            let update = self
                .task_service
                .update_task(TaskData {
                    task_id: parent_task_id.clone(),
                    parent_id: None,
                    owner: owner.clone(),
                    target_uri: String::new(),
                    http_method: "PATCH".into(),
                    request: Vec::new(),
                    response: None,
                    state: TaskState::Running,
                    status: TaskStatus::Ok,
                    percent_complete,
                })
                .await;

            if let Err(TaskServiceError::Cancelling) = update {
                info!(task_id = %parent_task_id, "parent task cancelling mid fan-out");
                cancel.cancel();
                self.finish_with_percent(
                    &parent_task_id,
                    &owner,
                    response::general_error(
                        400,
                        ExtendedCode::PropertyUnknown,
                        "The operation was cancelled.",
                        vec![],
                    ),
                    TaskState::Cancelled,
                    TaskStatus::Ok,
                    percent_complete,
                )
                .await;
                return;
            }
        }

        let outcome = aggregate_status(&results);
        self.finish(&parent_task_id, &owner, outcome.response, outcome.state, outcome.status)
            .await;
    }

    /// Terminalizes the parent task at 100% complete -- true for every
    /// outcome except a mid-flight cancellation, which goes through
    /// `finish_with_percent` instead.
    async fn finish(
        &self,
        parent_task_id: &str,
        owner: &str,
        response: RpcResponse,
        state: TaskState,
        status: TaskStatus,
    ) {
        self.finish_with_percent(parent_task_id, owner, response, state, status, 100)
            .await;
    }

    async fn finish_with_percent(
        &self,
        parent_task_id: &str,
        owner: &str,
        response: RpcResponse,
        state: TaskState,
        status: TaskStatus,
        percent_complete: u8,
    ) {
        let _ = self
            .task_service
            .update_task(TaskData {
                task_id: parent_task_id.to_string(),
                parent_id: None,
                owner: owner.to_string(),
                target_uri: String::new(),
                http_method: "PATCH".into(),
                request: Vec::new(),
                response: Some(response),
                state,
                status,
                percent_complete,
            })
            .await;
    }
}

struct AggregateOutcome {
    response: RpcResponse,
    state: TaskState,
    status: TaskStatus,
}

/// Classifies the collected per-plugin status codes into one overall parent
/// task response. `aggregateStatus` is `max(200, max_i(subtask_i.statusCode))`
/// per §8's testable property, not a fixed priority order: a lone 404 among
/// otherwise-200 results outranks a lone 400, because 404 > 400. A result of
/// exactly 200 everywhere yields the generic success body; any other
/// aggregate value is resolved through the classification table in the
/// original `UpdateTrigger`'s switch on the worst status code observed.
fn aggregate_status(results: &[SubtaskResult]) -> AggregateOutcome {
    let plugin_ids: Vec<String> = results.iter().map(|r| r.plugin_id.clone()).collect();
    let aggregate_status_code = results
        .iter()
        .map(|r| r.status_code)
        .fold(200u16, std::cmp::max);

    if aggregate_status_code == 200 {
        return AggregateOutcome {
            response: response::success(200, "The trigger update completed successfully."),
            state: TaskState::Completed,
            status: TaskStatus::Ok,
        };
    }

    let response = match aggregate_status_code {
        202 => response::general_error(
            202,
            ExtendedCode::TaskStarted,
            "One or more plugins accepted the trigger update asynchronously.",
            plugin_ids,
        ),
        401 => response::general_error(
            401,
            ExtendedCode::ResourceAtUriUnauthorized,
            "One or more plugins rejected the provided credentials.",
            plugin_ids,
        ),
        404 => response::general_error(
            404,
            ExtendedCode::ResourceNotFound,
            "One or more plugins could not find the target resource.",
            vec!["option".into(), "Triggers".into()],
        ),
        400 => response::general_error(
            400,
            ExtendedCode::PropertyUnknown,
            "One or more plugins rejected the trigger update.",
            vec!["Triggers".into()],
        ),
        other => response::general_error(
            other,
            ExtendedCode::InternalError,
            "The trigger update failed on one or more plugins.",
            vec![],
        ),
    };

    // §4.6 step 8: any non-200 aggregate still terminalizes the parent task
    // as Completed/Warning, not Exception -- only the response body escalates.
    AggregateOutcome {
        response,
        state: TaskState::Completed,
        status: TaskStatus::Warning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use trigger_fanout_shared::contracts::{InMemoryResourceStore, ResourceStore};
    use trigger_fanout_shared::models::{Plugin, PluginAuthType};

    use crate::plugin_client::{DispatchError, DispatchOutcome};

    struct FakeTaskService {
        updates: Mutex<Vec<TaskData>>,
    }

    impl FakeTaskService {
        fn new() -> Self {
            FakeTaskService { updates: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl TaskService for FakeTaskService {
        async fn create_task(&self, _owner: &str) -> Result<String, TaskServiceError> {
            Ok("/redfish/v1/TaskService/Tasks/parent-1".into())
        }
        async fn create_child_task(&self, _owner: &str, _parent: &str) -> Result<String, TaskServiceError> {
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
        ) -> Result<DispatchOutcome, DispatchError> {
            Ok(DispatchOutcome { status_code: self.status_code, body: serde_json::json!({}) })
        }
    }

    fn sample_plugin(id: &str) -> Plugin {
        Plugin {
            id: id.to_string(),
            address: "10.0.0.1".into(),
            port: 45001,
            username: "admin".into(),
            password: b"secret".to_vec(),
            preferred_auth_type: PluginAuthType::XAuthToken,
            plugin_type: "GenericPlugin".into(),
        }
    }

    #[tokio::test]
    async fn empty_body_short_circuits_without_fanning_out() {
        let store = Arc::new(InMemoryResourceStore::new());
        store.put_plugin(sample_plugin("p1"));
        let task_service = Arc::new(FakeTaskService::new());
        let coordinator = FanOutCoordinator::new(
            PluginRegistry::new(store.clone() as Arc<dyn ResourceStore>),
            Arc::new(FakeDispatcher { status_code: 200 }),
            task_service.clone(),
        );

        coordinator
            .run(
                TriggerRequest {
                    session_token: "tok".into(),
                    resource_id: "trig1".into(),
                    url: "/redfish/v1/TelemetryService/Triggers".into(),
                    body: Vec::new(),
                },
                "admin".into(),
                "parent-1".into(),
            )
            .await;

        let updates = task_service.updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].state, TaskState::Exception);
    }

    #[tokio::test]
    async fn successful_fan_out_marks_parent_task_completed() {
        let store = Arc::new(InMemoryResourceStore::new());
        store.put_plugin(sample_plugin("p1"));
        store.put_plugin(sample_plugin("p2"));
        let task_service = Arc::new(FakeTaskService::new());
        let coordinator = FanOutCoordinator::new(
            PluginRegistry::new(store.clone() as Arc<dyn ResourceStore>),
            Arc::new(FakeDispatcher { status_code: 200 }),
            task_service.clone(),
        );

        coordinator
            .run(
                TriggerRequest {
                    session_token: "tok".into(),
                    resource_id: "trig1".into(),
                    url: "/redfish/v1/TelemetryService/Triggers".into(),
                    body: serde_json::json!({"Name": "t1"}).to_string().into_bytes(),
                },
                "admin".into(),
                "parent-1".into(),
            )
            .await;

        let updates = task_service.updates.lock().unwrap();
        let last = updates.last().unwrap();
        assert_eq!(last.state, TaskState::Completed);
        assert_eq!(last.percent_complete, 100);
    }

    #[test]
    fn aggregate_status_takes_the_numeric_max_not_a_fixed_priority() {
        // 404 > 401 numerically, so it wins even though 401 might "feel" worse.
        let results = vec![
            SubtaskResult { plugin_id: "p1".into(), status_code: 401 },
            SubtaskResult { plugin_id: "p2".into(), status_code: 404 },
        ];
        let outcome = aggregate_status(&results);
        assert_eq!(outcome.response.status_code, 404);
        assert_eq!(outcome.state, TaskState::Completed);
        assert_eq!(outcome.status, TaskStatus::Warning);
    }

    #[test]
    fn aggregate_status_all_success_is_completed_ok() {
        let results = vec![
            SubtaskResult { plugin_id: "p1".into(), status_code: 200 },
            SubtaskResult { plugin_id: "p2".into(), status_code: 200 },
        ];
        let outcome = aggregate_status(&results);
        assert_eq!(outcome.response.status_code, 200);
        assert_eq!(outcome.state, TaskState::Completed);
        assert_eq!(outcome.status, TaskStatus::Ok);
    }

    #[test]
    fn percent_complete_uses_integer_division() {
        // 1 of 3 complete: (1 / 3) * 100 == 0, truncated until completion.
        assert_eq!((1 / 3) * 100, 0);
        // 2 of 3: (2 / 3) * 100 == 0.
        assert_eq!((2 / 3) * 100, 0);
        // 3 of 3: (3 / 3) * 100 == 100.
        assert_eq!((3 / 3) * 100, 100);
    }
}
