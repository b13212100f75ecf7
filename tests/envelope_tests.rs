// tests/envelope_tests.rs
//! End-to-end normalization: encrypted envelope in, typed records out.

mod support;

use consultation_desk::{envelope, Consultation, Error};
use serde_json::json;
use support::{encrypted_envelope, SECRET};

fn wire_record(id: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "name": "Asha Verma",
        "contact": "9876543210",
        "state": "Maharashtra",
        "callStatus": "SCHEDULED",
        "neetScore": "542"
    })
}

fn to_records(values: Vec<serde_json::Value>) -> Vec<Consultation> {
    values
        .into_iter()
        .map(|v| serde_json::from_value(v).unwrap())
        .collect()
}

#[test]
fn test_encrypted_success_envelope_to_typed_records() {
    let inner = json!({"success": true, "data": [wire_record("a"), wire_record("b")]});
    let values = envelope::extract_records(encrypted_envelope(&inner), SECRET).unwrap();
    let records = to_records(values);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, "a");
    assert_eq!(records[1].neet_score_value(), Some(542.0));
}

#[test]
fn test_plain_success_envelope_to_typed_records() {
    let response = json!({"success": true, "data": [wire_record("a")]});
    let values = envelope::extract_records(response, SECRET).unwrap();
    assert_eq!(to_records(values).len(), 1);
}

#[test]
fn test_bare_array_response() {
    let values =
        envelope::extract_records(json!([wire_record("a"), wire_record("b")]), SECRET).unwrap();
    assert_eq!(to_records(values).len(), 2);
}

#[test]
fn test_unexpected_shape_fails_without_partial_result() {
    let err = envelope::extract_records(json!({"foo": "bar"}), SECRET).unwrap_err();
    assert!(matches!(err, Error::UnexpectedFormat));
}

#[test]
fn test_tampered_ciphertext_is_a_decrypt_error() {
    let inner = json!({"success": true, "data": [wire_record("a")]});
    let mut response = encrypted_envelope(&inner);
    let payload = response["data"].as_str().unwrap().to_string();
    // flip the last ciphertext nibble
    let tampered = format!(
        "{}{}",
        &payload[..payload.len() - 1],
        if payload.ends_with('0') { "1" } else { "0" }
    );
    response["data"] = json!(tampered);

    let err = envelope::extract_records(response, SECRET).unwrap_err();
    assert!(matches!(err, Error::Decrypt { .. }));
}

#[test]
fn test_mutation_echo_roundtrip() {
    let inner = json!({"success": true, "data": wire_record("a")});
    let value = envelope::extract_record(encrypted_envelope(&inner), SECRET).unwrap();
    let record: Consultation = serde_json::from_value(value).unwrap();
    assert_eq!(record.id, "a");
    assert_eq!(record.effective_status().as_str(), "SCHEDULED");
}

#[test]
fn test_mutation_failure_carries_server_message() {
    let inner = json!({"success": false, "message": "Failed to update call status"});
    let err = envelope::extract_record(encrypted_envelope(&inner), SECRET).unwrap_err();
    match err {
        Error::Api { message } => assert_eq!(message, "Failed to update call status"),
        other => panic!("expected Api error, got {:?}", other),
    }
}
