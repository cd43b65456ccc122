/// Read-only telemetry query endpoints: the `TelemetryService` root document
/// plus the `MetricDefinition`, `MetricReportDefinition`, `MetricReport`, and
/// `Trigger` collections and their single-resource reads.
///
/// Grounded on
/// `examples/original_source/svc-telemetry/telemetry/telemetry.go`'s
/// `GetTelemetryService` and the four `Get*Collection`/`Get*` function
/// pairs, which all share one shape: headers, then an always-200 collection
/// listing or a 404-on-miss single read.
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use trigger_fanout_shared::contracts::DbType;
use trigger_fanout_shared::response::read_only_headers;
use trigger_fanout_shared::CoreError;

use crate::app::AppState;
use crate::error::ApiError;

const BASE: &str = "/redfish/v1/TelemetryService";

fn headers_response(body: impl serde::Serialize) -> Response {
    let mut response = Json(body).into_response();
    for (key, value) in read_only_headers() {
        response.headers_mut().insert(
            axum::http::HeaderName::try_from(key).unwrap(),
            value.parse().unwrap(),
        );
    }
    response
}

pub async fn get_telemetry_service(State(_state): State<AppState>) -> Response {
    headers_response(json!({
        "@odata.id": BASE,
        "@odata.type": "#TelemetryService.v1_3_0.TelemetryService",
        "Id": "TelemetryService",
        "Name": "Telemetry Service",
        "ServiceEnabled": true,
        "MetricDefinitions": {"@odata.id": format!("{BASE}/MetricDefinitions")},
        "MetricReportDefinitions": {"@odata.id": format!("{BASE}/MetricReportDefinitions")},
        "MetricReports": {"@odata.id": format!("{BASE}/MetricReports")},
        "Triggers": {"@odata.id": format!("{BASE}/Triggers")},
    }))
}

macro_rules! collection_endpoint {
    ($fn_name:ident, $table:literal, $odata_type:literal, $name:literal, $path:literal) => {
        pub async fn $fn_name(State(state): State<AppState>) -> Response {
            let member_ids = state
                .resource_store
                .get_all_keys($table, DbType::OnDisk)
                .await
                .unwrap_or_default();
            let collection = trigger_fanout_shared::models::Collection::new(
                &format!("{BASE}/{}", $path),
                $odata_type,
                $name,
                member_ids,
            );
            headers_response(collection)
        }
    };
}

macro_rules! single_resource_endpoint {
    ($fn_name:ident, $table:literal) => {
        pub async fn $fn_name(
            State(state): State<AppState>,
            Path(id): Path<String>,
        ) -> Result<Response, ApiError> {
            let resource = state
                .resource_store
                .get_resource($table, &id, DbType::OnDisk)
                .await
                .map_err(|err| match err {
                    CoreError::NotFound(_) => CoreError::NotFound(id.clone()),
                    other => other,
                })?;
            Ok(headers_response(resource))
        }
    };
}

collection_endpoint!(
    get_metric_definition_collection,
    "MetricDefinition",
    "#MetricDefinitionCollection.MetricDefinitionCollection",
    "Metric Definitions",
    "MetricDefinitions"
);
single_resource_endpoint!(get_metric_definition, "MetricDefinition");

collection_endpoint!(
    get_metric_report_definition_collection,
    "MetricReportDefinition",
    "#MetricReportDefinitionCollection.MetricReportDefinitionCollection",
    "Metric Report Definitions",
    "MetricReportDefinitions"
);
single_resource_endpoint!(get_metric_report_definition, "MetricReportDefinition");

collection_endpoint!(
    get_metric_report_collection,
    "MetricReport",
    "#MetricReportCollection.MetricReportCollection",
    "Metric Reports",
    "MetricReports"
);
single_resource_endpoint!(get_metric_report, "MetricReport");

collection_endpoint!(
    get_trigger_collection,
    "Triggers",
    "#TriggerCollection.TriggerCollection",
    "Triggers",
    "Triggers"
);
single_resource_endpoint!(get_trigger, "Triggers");
