use serde_json::Value as JsonValue;

use crate::error::CoreError;

/// Mirrors `common.RequestParamsCaseValidator`: every top-level property in
/// the request body must be UpperCamelCase and a member of `known_keys`.
/// `@odata.*` annotations are exempt. Returns the offending keys (empty if
/// the body is clean).
pub fn validate_property_case(
    body: &JsonValue,
    known_keys: &[&str],
) -> Result<Vec<String>, CoreError> {
    let obj = body
        .as_object()
        .ok_or_else(|| CoreError::Internal("request body is not a JSON object".into()))?;

    let offenders = obj
        .keys()
        .filter(|key| !key.starts_with('@'))
        .filter(|key| !is_upper_camel_case(key) || !known_keys.contains(&key.as_str()))
        .cloned()
        .collect();

    Ok(offenders)
}

fn is_upper_camel_case(key: &str) -> bool {
    matches!(key.chars().next(), Some(c) if c.is_ascii_uppercase())
}

/// `isEmptyRequest` in the original: true for a zero-length body or a body
/// that decodes to an empty JSON object.
pub fn is_empty_request(body: &[u8]) -> bool {
    if body.is_empty() {
        return true;
    }
    match serde_json::from_slice::<JsonValue>(body) {
        Ok(JsonValue::Object(map)) => map.is_empty(),
        _ => false,
    }
}
