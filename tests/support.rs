// tests/support.rs
//! Shared helpers for integration tests
#![allow(dead_code)] // each test binary uses its own subset

use consultation_desk::encryption;
use consultation_desk::Consultation;
use serde_json::{json, Value};

pub const SECRET: &str = "integration-test-secret";
pub const IV: [u8; 16] = [9u8; 16];

/// A minimal valid record; tests set the fields they care about.
pub fn record(id: &str, name: &str) -> Consultation {
    serde_json::from_value(json!({
        "_id": id,
        "name": name,
        "contact": "9876543210",
        "state": "Maharashtra"
    }))
    .expect("test record should deserialize")
}

/// Wraps a JSON value the way the backend does: `{encrypted, data}` with an
/// AES-CBC payload under the shared test secret.
pub fn encrypted_envelope(value: &Value) -> Value {
    json!({
        "encrypted": true,
        "data": encryption::encrypt(value, SECRET, &IV)
    })
}
