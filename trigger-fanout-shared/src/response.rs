use std::collections::HashMap;

use serde::Serialize;
use serde_json::{json, Value as JsonValue};

/// Redfish `MessageId` suffixes used by the fan-out coordinator and the RPC
/// handler. Kept as an enum (rather than the original's bare strings) so a
/// typo can't silently produce an unregistered message ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendedCode {
    Success,
    TaskStarted,
    NoValidSession,
    ResourceAtUriUnauthorized,
    ResourceNotFound,
    PropertyUnknown,
    PropertyMissing,
    InternalError,
}

impl ExtendedCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtendedCode::Success => "Base.1.13.0.Success",
            ExtendedCode::TaskStarted => "TaskEvent.1.0.3.TaskStarted",
            ExtendedCode::NoValidSession => "Base.1.13.0.NoValidSession",
            ExtendedCode::ResourceAtUriUnauthorized => "Base.1.13.0.ResourceAtUriUnauthorized",
            ExtendedCode::ResourceNotFound => "Base.1.13.0.ResourceNotFound",
            ExtendedCode::PropertyUnknown => "Base.1.13.0.PropertyUnknown",
            ExtendedCode::PropertyMissing => "Base.1.13.0.PropertyMissing",
            ExtendedCode::InternalError => "Base.1.13.0.InternalError",
        }
    }
}

/// The transport-agnostic shape every component in this crate hands back to
/// its caller: an HTTP-flavored status plus a Redfish message body. The API
/// crate is the only place this gets turned into an actual `axum` response.
#[derive(Debug, Clone, Serialize)]
pub struct RpcResponse {
    pub status_code: u16,
    pub status_message: String,
    pub headers: HashMap<String, String>,
    pub body: JsonValue,
}

/// The header set every telemetry response in the original carries.
pub fn common_headers() -> HashMap<String, String> {
    let mut headers = HashMap::new();
    headers.insert("Cache-Control".into(), "no-cache".into());
    headers.insert("Connection".into(), "keep-alive".into());
    headers.insert("Content-type".into(), "application/json; charset=utf-8".into());
    headers.insert("Transfer-Encoding".into(), "chunked".into());
    headers.insert("OData-Version".into(), "4.0".into());
    headers
}

/// `common_headers` plus `Allow: GET`, used by every collection/single-read
/// endpoint in §4.8.
pub fn read_only_headers() -> HashMap<String, String> {
    let mut headers = common_headers();
    headers.insert("Allow".into(), "GET".into());
    headers
}

/// Builds a Redfish `ExtendedInfo` error body with the given message and
/// message args, mirroring `common.GeneralError` in the original source.
pub fn general_error(
    status_code: u16,
    code: ExtendedCode,
    message: &str,
    message_args: Vec<String>,
) -> RpcResponse {
    let body = json!({
        "error": {
            "code": "Base.1.13.0.GeneralError",
            "message": message,
            "@Message.ExtendedInfo": [{
                "MessageId": code.as_str(),
                "Message": message,
                "MessageArgs": message_args,
                "Severity": "Critical",
                "Resolution": "See the error message for details.",
            }]
        }
    });
    RpcResponse {
        status_code,
        status_message: http_status_text(status_code).to_string(),
        headers: common_headers(),
        body,
    }
}

/// Builds the generic success envelope returned once a trigger update
/// fan-out completes without error.
pub fn success(status_code: u16, message: &str) -> RpcResponse {
    let body = json!({
        "@Message.ExtendedInfo": [{
            "MessageId": ExtendedCode::Success.as_str(),
            "Message": message,
            "MessageArgs": Vec::<String>::new(),
            "Severity": "OK",
            "Resolution": "None",
        }]
    });
    RpcResponse {
        status_code,
        status_message: http_status_text(status_code).to_string(),
        headers: common_headers(),
        body,
    }
}

fn http_status_text(status_code: u16) -> &'static str {
    match status_code {
        200 => "OK",
        202 => "Accepted",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn general_error_carries_the_message_id() {
        let resp = general_error(404, ExtendedCode::ResourceNotFound, "not found", vec!["Triggers".into()]);
        assert_eq!(resp.status_code, 404);
        let message_id = resp.body["error"]["@Message.ExtendedInfo"][0]["MessageId"]
            .as_str()
            .unwrap();
        assert_eq!(message_id, ExtendedCode::ResourceNotFound.as_str());
    }

    #[test]
    fn read_only_headers_include_allow_get() {
        let headers = read_only_headers();
        assert_eq!(headers.get("Allow").unwrap(), "GET");
    }
}
