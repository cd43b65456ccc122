/// `TriggerRPCHandler`: accepts a `PATCH Triggers` request, creates a parent
/// task, and hands the fan-out off to a background `FanOutCoordinator` run
/// without waiting for it to finish.
///
/// Grounded on `examples/original_source/svc-telemetry/rpc/telemetry.go`'s
/// `UpdateTrigger` RPC handler and on
/// `examples/original_source/svc-api/handle/telemetry.go`, which reads the
/// session token from `X-Auth-Token` rather than an `Authorization: Bearer`
/// header.
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use trigger_fanout_shared::models::{extract_task_id, TaskData, TaskState, TaskStatus, TriggerRequest};

use crate::app::AppState;
use crate::error::ApiError;

const PRIVILEGE_LOGIN: &str = "Login";

pub async fn update_trigger(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let session_token = headers
        .get("X-Auth-Token")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| trigger_fanout_shared::CoreError::Auth("missing X-Auth-Token header".into()))?
        .to_string();

    state
        .session_service
        .authorize(&session_token, &[PRIVILEGE_LOGIN], &[])
        .await
        .map_err(|rpc_response| {
            tracing::warn!(status = rpc_response.status_code, "trigger update rejected by session authorization");
            trigger_fanout_shared::CoreError::Auth("session is not authorized".into())
        })?;

    let owner = state
        .session_service
        .get_session_user_name(&session_token)
        .await
        .map_err(|_| trigger_fanout_shared::CoreError::Auth("no valid session".into()))?;

    let parent_task_uri = state
        .task_service
        .create_task(&owner)
        .await
        .map_err(|err| trigger_fanout_shared::CoreError::Internal(err.to_string()))?;
    let parent_task_id = extract_task_id(&parent_task_uri).to_string();

    // Record the task as started before handing off, matching the
    // original's synchronous `UpdateTask(..., Running, OK, 0)` call that
    // precedes the fire-and-forget fan-out goroutine.
    let _ = state
        .task_service
        .update_task(TaskData {
            task_id: parent_task_id.clone(),
            parent_id: None,
            owner: owner.clone(),
            target_uri: "/redfish/v1/TelemetryService/Triggers".into(),
            http_method: "PATCH".into(),
            request: body.to_vec(),
            response: None,
            state: TaskState::Running,
            status: TaskStatus::Ok,
            percent_complete: 0,
        })
        .await;

    // `resource_id` addresses a single trigger within the collection; the
    // PATCH-collection RPC this handler serves has no such segment, so it is
    // left empty rather than reused to carry the unrelated parent task id.
    let trigger_request = TriggerRequest {
        session_token,
        resource_id: String::new(),
        url: "/redfish/v1/TelemetryService/Triggers".into(),
        body: body.to_vec(),
    };

    let coordinator = state.coordinator.clone();
    let fan_out_owner = owner.clone();
    let fan_out_parent_id = parent_task_id.clone();
    tokio::spawn(async move {
        coordinator.run(trigger_request, fan_out_owner, fan_out_parent_id).await;
    });

    let mut response_headers = HeaderMap::new();
    response_headers.insert("Content-type", "application/json; charset=utf-8".parse().unwrap());
    response_headers.insert("Location", format!("/taskmon/{parent_task_id}").parse().unwrap());

    Ok((StatusCode::ACCEPTED, response_headers, "Accepted").into_response())
}
