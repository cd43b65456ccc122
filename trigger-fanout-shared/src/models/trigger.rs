use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Top-level properties the Redfish `Triggers` schema actually defines.
/// Anything else in the request body (besides `@odata.*` annotations) fails
/// the property-case check in `crate::validation`.
pub const KNOWN_TRIGGER_PROPERTIES: &[&str] = &[
    "Id",
    "Name",
    "Description",
    "MetricType",
    "TriggerActions",
    "NumericThresholds",
    "DiscreteTriggerCondition",
    "DiscreteTriggers",
    "EventTriggers",
    "MetricIds",
    "MetricReportDefinitions",
    "Severity",
    "Wildcards",
    "Links",
    "Actions",
    "Oem",
];

/// A decoded `Triggers` resource body. Kept as a raw JSON value rather than a
/// fully-typed struct: the coordinator only needs to validate property names
/// and re-marshal the same bytes to every plugin, never to interpret
/// individual fields.
pub type Triggers = JsonValue;

/// Everything the `TriggerRPCHandler` needs to start a fan-out.
#[derive(Debug, Clone)]
pub struct TriggerRequest {
    pub session_token: String,
    pub resource_id: String,
    pub url: String,
    pub body: Vec<u8>,
}

/// A minimal Redfish `@odata` collection envelope, used for the read-only
/// collection endpoints in §4.8.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
    #[serde(rename = "@odata.type")]
    pub odata_type: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Members@odata.count")]
    pub members_count: usize,
    #[serde(rename = "Members")]
    pub members: Vec<MemberLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberLink {
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
}

impl Collection {
    pub fn new(odata_id: &str, odata_type: &str, name: &str, member_ids: Vec<String>) -> Self {
        let members: Vec<MemberLink> = member_ids
            .into_iter()
            .map(|id| MemberLink {
                odata_id: format!("{odata_id}/{id}"),
            })
            .collect();
        Collection {
            odata_id: odata_id.to_string(),
            odata_type: odata_type.to_string(),
            name: name.to_string(),
            members_count: members.len(),
            members,
        }
    }
}
