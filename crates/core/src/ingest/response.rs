//! Interpretation of conversion and batch-import responses.

use serde_json::Value;

use super::types::PhaseFailure;
use crate::client::RawResponse;

fn parse_body(response: &RawResponse) -> Result<Value, PhaseFailure> {
    serde_json::from_str(&response.body).map_err(|e| PhaseFailure::Malformed {
        reason: e.to_string(),
        body: response.body.clone(),
    })
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn has_entries(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::String(s) => !s.is_empty(),
        Value::Bool(b) => *b,
        Value::Number(_) => true,
    }
}

/// Turns a conversion response into the jsonmodel payload to upload.
///
/// The backend signals a failed conversion either with a non-200 status or
/// with a 200 whose body is an object holding an `error` key.
pub fn interpret_conversion(response: &RawResponse) -> Result<Value, PhaseFailure> {
    if !response.is_ok() {
        return Err(PhaseFailure::Status {
            status: response.status,
            body: response.body.clone(),
        });
    }

    let payload = parse_body(response)?;
    match &payload {
        Value::Null => Err(PhaseFailure::Malformed {
            reason: "empty payload".to_string(),
            body: response.body.clone(),
        }),
        Value::Object(map) if map.contains_key("error") => {
            Err(PhaseFailure::Rejected(render(&map["error"])))
        }
        _ => Ok(payload),
    }
}

/// Checks a batch-import response.
///
/// The body is a JSON array of progress records; the last one carries the
/// `errors` of the import, if any.
pub fn interpret_upload(response: &RawResponse) -> Result<Value, PhaseFailure> {
    if !response.is_ok() {
        return Err(PhaseFailure::Status {
            status: response.status,
            body: response.body.clone(),
        });
    }

    let payload = parse_body(response)?;
    let last = match &payload {
        Value::Array(items) => items.last(),
        _ => {
            return Err(PhaseFailure::Malformed {
                reason: "expected a JSON array".to_string(),
                body: response.body.clone(),
            })
        }
    };

    match last {
        None => Err(PhaseFailure::Malformed {
            reason: "empty batch import response".to_string(),
            body: response.body.clone(),
        }),
        Some(Value::Object(record)) => match record.get("errors") {
            Some(errors) if has_entries(errors) => Err(PhaseFailure::Rejected(render(errors))),
            _ => Ok(payload),
        },
        Some(_) => Ok(payload),
    }
}
