//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Otx.
//! The Otx project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Otx Ingest Tests
//!
//! Tests for the sample text fallback chain and OTLP flattening.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test ingest
//! ```

use std::io::Write;

use otx::{OtError, OtIngestConfig, OtSampleReader};
use serde_json::{json, Value};

fn parse(text: &str) -> Vec<Value> {
    OtSampleReader::new()
        .parse_text(text)
        .into_iter()
        .map(Value::Object)
        .collect()
}

/// Tests the key=value fallback example.
#[test]
fn test_key_value_fallback() {
    assert_eq!(
        parse(r#"level=error msg="boom" code=500"#),
        vec![json!({"level": "error", "msg": "boom", "code": "500"})]
    );
}

/// Tests whole-text JSON forms.
#[test]
fn test_json_array_and_object() {
    assert_eq!(parse(r#"[{"a": 1}, 2, {"b": 2}]"#), vec![json!({"a": 1}), json!({"b": 2})]);
    assert_eq!(parse(r#"{"a": {"b": true}}"#), vec![json!({"a": {"b": true}})]);
    assert!(parse("\"just a string\"").is_empty());
}

/// Tests NDJSON with trailing commas mixed with key=value lines.
#[test]
fn test_ndjson_with_trailing_commas() {
    let text = "{\"a\": 1},\n\n{\"b\": 2},,\n[1, 2]\nuser=bob\nnoise\n";
    assert_eq!(
        parse(text),
        vec![json!({"a": 1}), json!({"b": 2}), json!({"user": "bob"})]
    );
}

/// Tests OTLP span flattening through the reader.
#[test]
fn test_otlp_spans() {
    let payload = json!({
        "resourceSpans": [{
            "resource": {"attributes": [{"key": "service.name", "value": {"stringValue": "api"}}]},
            "scopeSpans": [{
                "spans": [
                    {"traceId": "t", "spanId": "a", "name": "first", "attributes": [
                        {"key": "user.email", "value": {"stringValue": "a@b.io"}}
                    ]},
                    {"traceId": "t", "spanId": "b", "parentSpanId": "a", "name": "second",
                     "status": {"code": 2, "message": "boom"}}
                ]
            }]
        }]
    });
    let records = parse(&payload.to_string());
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["resource.service.name"], json!("api"));
    assert_eq!(records[0]["user.email"], json!("a@b.io"));
    assert_eq!(records[0]["span.name"], json!("first"));
    assert_eq!(records[1]["span.parent_span_id"], json!("a"));
    assert_eq!(records[1]["span.status.message"], json!("boom"));
}

/// Tests the record cap and the empty-batch error.
#[test]
fn test_cap_and_empty_batch() {
    let text: String = (0..10).map(|i| format!("{{\"i\": {i}}}\n")).collect();
    let reader = OtSampleReader::new().with_config(OtIngestConfig { max_records: 4 });
    let records = reader.parse_batch(&text).unwrap();
    assert_eq!(records.len(), 4);
    assert_eq!(records[3]["i"], json!(3));

    let err = OtSampleReader::new().parse_batch("  \n").unwrap_err();
    assert!(matches!(err, OtError::Ingest { .. }));
}

/// Tests reading samples from a file.
#[test]
fn test_read_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "level=info msg=ok").unwrap();
    let records = OtSampleReader::new().read_path(file.path()).unwrap();
    assert_eq!(records[0]["msg"], json!("ok"));
}
