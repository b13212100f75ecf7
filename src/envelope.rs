// Response envelope normalization - every historical API shape in one place
//
// The backend has shipped several response shapes over time. Callers never
// branch on them; the precedence below is the compatibility contract.

use serde_json::Value;

use crate::encryption;
use crate::error::{Error, Result};

/// Extracts the canonical record array from a raw list response.
///
/// First match wins:
/// 1. `{encrypted: truthy, data: "<iv>:<ct>"}` - decrypt, then accept
///    `{success: true, data: [..]}` or a bare array from the plaintext
/// 2. `{success: true, data: [..]}`
/// 3. a bare array
/// 4. any object with an array `data` field
/// 5. otherwise: unexpected format
pub fn extract_records(response: Value, secret: &str) -> Result<Vec<Value>> {
    if let Some(payload) = encrypted_payload(&response) {
        let plain = encryption::decrypt(payload, secret)?;
        if let Value::Array(items) = plain {
            return Ok(items);
        }
        if is_success(&plain) {
            if let Some(items) = array_field(&plain, "data") {
                return Ok(items);
            }
        }
        return Err(unexpected(&plain));
    }

    if is_success(&response) {
        if let Some(items) = array_field(&response, "data") {
            return Ok(items);
        }
    }
    if let Value::Array(items) = response {
        return Ok(items);
    }
    if let Some(items) = array_field(&response, "data") {
        return Ok(items);
    }
    Err(unexpected(&response))
}

/// Extracts a single record from a mutation response.
///
/// Canonical shape: `{success: true, data: Object}`, optionally wrapped in
/// the encryption envelope. `success: false` surfaces the server message
/// as an application error.
pub fn extract_record(response: Value, secret: &str) -> Result<Value> {
    let plain = unwrap_encrypted(response, secret)?;
    require_success(&plain)?;
    match plain.get("data") {
        Some(data @ Value::Object(_)) => Ok(data.clone()),
        _ => Err(unexpected(&plain)),
    }
}

/// Extracts the generated notes text from an AI-notes response:
/// `{success: true, notes: "..."}`, optionally encryption-wrapped.
pub fn extract_notes(response: Value, secret: &str) -> Result<String> {
    let plain = unwrap_encrypted(response, secret)?;
    require_success(&plain)?;
    match plain.get("notes").and_then(Value::as_str) {
        Some(notes) => Ok(notes.to_string()),
        None => Err(unexpected(&plain)),
    }
}

fn unwrap_encrypted(response: Value, secret: &str) -> Result<Value> {
    match encrypted_payload(&response) {
        Some(payload) => encryption::decrypt(payload, secret),
        None => Ok(response),
    }
}

fn require_success(value: &Value) -> Result<()> {
    if is_success(value) {
        return Ok(());
    }
    if value.is_object() {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("request failed")
            .to_string();
        return Err(Error::Api { message });
    }
    Err(unexpected(value))
}

/// The `data` payload of an encrypted envelope, when present and non-empty.
fn encrypted_payload(value: &Value) -> Option<&str> {
    if !value.get("encrypted").is_some_and(is_truthy) {
        return None;
    }
    value
        .get("data")
        .and_then(Value::as_str)
        .filter(|payload| !payload.is_empty())
}

fn is_success(value: &Value) -> bool {
    value.get("success").and_then(Value::as_bool) == Some(true)
}

fn array_field(value: &Value, field: &str) -> Option<Vec<Value>> {
    match value.get(field) {
        Some(Value::Array(items)) => Some(items.clone()),
        _ => None,
    }
}

// JS-style truthiness, since older backends sent `encrypted: 1`.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn unexpected(value: &Value) -> Error {
    tracing::warn!("unexpected response format from server: {}", shape_of(value));
    Error::UnexpectedFormat
}

/// Diagnostic shape description - never the payload itself, which may hold
/// personal data.
fn shape_of(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            format!("object with keys [{}]", keys.join(", "))
        }
        Value::Array(items) => format!("array of {} items", items.len()),
        Value::String(_) => "string".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::Bool(_) => "bool".to_string(),
        Value::Null => "null".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "envelope-test-secret";
    const IV: [u8; 16] = [3u8; 16];

    fn encrypted(value: &Value) -> Value {
        json!({"encrypted": true, "data": encryption::encrypt(value, SECRET, &IV)})
    }

    #[test]
    fn test_encrypted_success_envelope_yields_records() {
        let inner = json!({"success": true, "data": [{"_id": "a"}, {"_id": "b"}]});
        let records = extract_records(encrypted(&inner), SECRET).unwrap();
        assert_eq!(records, vec![json!({"_id": "a"}), json!({"_id": "b"})]);
    }

    #[test]
    fn test_encrypted_bare_array_yields_records() {
        let inner = json!([{"_id": "a"}]);
        let records = extract_records(encrypted(&inner), SECRET).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_encrypted_malformed_plaintext_is_unexpected() {
        let inner = json!({"foo": "bar"});
        let err = extract_records(encrypted(&inner), SECRET).unwrap_err();
        assert!(matches!(err, Error::UnexpectedFormat));
    }

    #[test]
    fn test_plain_success_envelope_yields_records() {
        let response = json!({"success": true, "data": [{"_id": "a"}, {"_id": "b"}]});
        let records = extract_records(response, SECRET).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_bare_array_yields_records() {
        let records = extract_records(json!([{"_id": "a"}, {"_id": "b"}]), SECRET).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_data_array_without_success_flag_yields_records() {
        let records = extract_records(json!({"data": [{"_id": "a"}]}), SECRET).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_unknown_shape_is_unexpected_format() {
        let err = extract_records(json!({"foo": "bar"}), SECRET).unwrap_err();
        assert!(matches!(err, Error::UnexpectedFormat));
    }

    #[test]
    fn test_numeric_encrypted_flag_is_truthy() {
        let inner = json!({"success": true, "data": []});
        let response = json!({"encrypted": 1, "data": encryption::encrypt(&inner, SECRET, &IV)});
        assert!(extract_records(response, SECRET).unwrap().is_empty());
    }

    #[test]
    fn test_extract_record_canonical_shape() {
        let inner = json!({"success": true, "data": {"_id": "a", "callStatus": "COMPLETED"}});
        let record = extract_record(encrypted(&inner), SECRET).unwrap();
        assert_eq!(record.get("_id"), Some(&json!("a")));
    }

    #[test]
    fn test_extract_record_rejects_bare_record() {
        // Historical shape, intentionally unsupported.
        let err = extract_record(json!({"_id": "a"}), SECRET).unwrap_err();
        assert!(matches!(err, Error::Api { .. }));
    }

    #[test]
    fn test_extract_record_surfaces_server_message() {
        let inner = json!({"success": false, "message": "consultation not found"});
        let err = extract_record(encrypted(&inner), SECRET).unwrap_err();
        match err {
            Error::Api { message } => assert_eq!(message, "consultation not found"),
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_notes() {
        let inner = json!({"success": true, "notes": "spoke with the student"});
        let notes = extract_notes(encrypted(&inner), SECRET).unwrap();
        assert_eq!(notes, "spoke with the student");
    }
}
