//! JSON body → [`RawFields`].
//!
//! Parsing is lenient: a body that is not JSON, or not a JSON object, is
//! treated as an empty object and fails validation downstream with
//! `invalid request`.

use sc_01_auth_protocol::RawFields;
use serde_json::Value;

/// Extract the status check fields from a request body.
///
/// - `user_id` and `tag` must be JSON strings
/// - `timestamp` keeps the textual form of a JSON number, or a JSON string
///   as-is; whether it is an integer is decided by the authenticator
pub fn parse_request(body: &[u8]) -> RawFields {
    let value: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
    let Some(object) = value.as_object() else {
        return RawFields::default();
    };

    RawFields {
        user_id: object
            .get("user_id")
            .and_then(Value::as_str)
            .map(str::to_owned),
        timestamp: object.get("timestamp").and_then(timestamp_text),
        tag: object.get("tag").and_then(Value::as_str).map(str::to_owned),
    }
}

fn timestamp_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}
