/// Common test utilities for the trigger fan-out integration tests.
///
/// Unlike the production binary, these tests never touch real network I/O
/// or a real backing store: `ResourceStore`/`SessionService`/`TaskService`
/// are all in-process fakes, the way `axontask-worker`'s mock adapter lets
/// its own integration tests run without a live queue.
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use trigger_fanout_api::app::{build_router, AppState};
use trigger_fanout_api::config::{ApiConfig, Config, PluginConfig};
use trigger_fanout_core::plugin_client::{DispatchError, DispatchOutcome, PluginDispatch};
use trigger_fanout_core::{FanOutCoordinator, PluginRegistry};
use trigger_fanout_shared::contracts::{
    InMemoryResourceStore, ResourceStore, SessionService, TaskService, TaskServiceError,
};
use trigger_fanout_shared::models::{Plugin, PluginAuthType, TaskData};
use trigger_fanout_shared::response::RpcResponse;

pub struct TestContext {
    pub app: axum::Router,
    task_service: Arc<RecordingTaskService>,
}

impl TestContext {
    /// Builds a router backed by `n` plugins whose dispatch returns the
    /// given status codes in order (`plugin-0` gets `statuses[0]`, etc.).
    /// A session token of `"validToken"` is always authorized.
    pub async fn with_plugin_statuses(statuses: Vec<u16>) -> Self {
        Self::build(AllowAllSessionService, statuses)
    }

    /// A context whose `SessionService` rejects every token with 401.
    pub async fn rejecting_auth() -> Self {
        Self::build(RejectingSessionService, vec![200])
    }

    fn build(session_service: impl SessionService + 'static, statuses: Vec<u16>) -> Self {
        let store = Arc::new(InMemoryResourceStore::new());
        let mut status_by_plugin = HashMap::new();
        for (i, status) in statuses.into_iter().enumerate() {
            let id = format!("plugin-{i}");
            status_by_plugin.insert(id.clone(), status);
            store.put_plugin(Plugin {
                id,
                address: "10.0.0.1".into(),
                port: 45001,
                username: "admin".into(),
                password: b"secret".to_vec(),
                preferred_auth_type: PluginAuthType::XAuthToken,
                plugin_type: "GenericPlugin".into(),
            });
        }

        let task_service = Arc::new(RecordingTaskService::new());
        let dispatcher = Arc::new(FakeDispatcher { status_by_plugin });
        let coordinator = Arc::new(FanOutCoordinator::new(
            PluginRegistry::new(store.clone() as Arc<dyn ResourceStore>),
            dispatcher,
            task_service.clone(),
        ));

        let config = Config {
            api: ApiConfig { host: "127.0.0.1".into(), port: 0, production: false },
            plugin: PluginConfig { connect_timeout_secs: 1, request_timeout_secs: 1 },
        };

        let state = AppState::new(
            config,
            coordinator,
            store,
            Arc::new(session_service),
            task_service.clone(),
        );

        TestContext {
            app: build_router(state),
            task_service,
        }
    }

    /// Every `update_task` call recorded against a top-level (parentless)
    /// task, in call order.
    pub fn parent_task_updates(&self) -> Vec<TaskData> {
        self.task_service
            .updates
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.parent_id.is_none())
            .cloned()
            .collect()
    }

    /// Polls until the parent task reaches a terminal state, or panics
    /// after a generous timeout. The fan-out itself does no real network
    /// I/O in these tests, so this resolves almost immediately in practice.
    pub async fn wait_for_fan_out_to_finish(&self) {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            if self
                .parent_task_updates()
                .last()
                .is_some_and(|u| u.state.is_terminal())
            {
                return;
            }
            if Instant::now() > deadline {
                panic!("fan-out did not reach a terminal parent task state in time");
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

struct RecordingTaskService {
    updates: Mutex<Vec<TaskData>>,
    next_id: Mutex<u64>,
}

impl RecordingTaskService {
    fn new() -> Self {
        RecordingTaskService {
            updates: Mutex::new(Vec::new()),
            next_id: Mutex::new(0),
        }
    }

    fn next_task_id(&self) -> String {
        let mut guard = self.next_id.lock().unwrap();
        let id = *guard;
        *guard += 1;
        format!("task-{id}")
    }
}

#[async_trait]
impl TaskService for RecordingTaskService {
    async fn create_task(&self, _owner: &str) -> Result<String, TaskServiceError> {
        Ok(format!("/redfish/v1/TaskService/Tasks/{}", self.next_task_id()))
    }

    async fn create_child_task(&self, _owner: &str, _parent: &str) -> Result<String, TaskServiceError> {
        Ok(format!("/redfish/v1/TaskService/Tasks/{}", self.next_task_id()))
    }

    async fn update_task(&self, data: TaskData) -> Result<(), TaskServiceError> {
        self.updates.lock().unwrap().push(data);
        Ok(())
    }
}

struct AllowAllSessionService;

#[async_trait]
impl SessionService for AllowAllSessionService {
    async fn authorize(&self, _token: &str, _privileges: &[&str], _oem: &[&str]) -> Result<(), RpcResponse> {
        Ok(())
    }

    async fn get_session_user_name(&self, _token: &str) -> Result<String, trigger_fanout_shared::CoreError> {
        Ok("admin".to_string())
    }
}

struct RejectingSessionService;

#[async_trait]
impl SessionService for RejectingSessionService {
    async fn authorize(&self, _token: &str, _privileges: &[&str], _oem: &[&str]) -> Result<(), RpcResponse> {
        Err(trigger_fanout_shared::response::general_error(
            401,
            trigger_fanout_shared::response::ExtendedCode::NoValidSession,
            "invalid session token",
            vec![],
        ))
    }

    async fn get_session_user_name(&self, _token: &str) -> Result<String, trigger_fanout_shared::CoreError> {
        Err(trigger_fanout_shared::CoreError::Auth("no valid session".into()))
    }
}

struct FakeDispatcher {
    status_by_plugin: HashMap<String, u16>,
}

#[async_trait]
impl PluginDispatch for FakeDispatcher {
    async fn dispatch(
        &self,
        plugin: &Plugin,
        _path: &str,
        _body: &JsonValue,
    ) -> Result<DispatchOutcome, DispatchError> {
        let status_code = *self.status_by_plugin.get(&plugin.id).unwrap_or(&200);
        Ok(DispatchOutcome { status_code, body: serde_json::json!({}) })
    }
}
