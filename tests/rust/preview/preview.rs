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

//! # Otx Preview Tests
//!
//! Tests for the sample transformer and the diff engine working together.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test preview
//! ```

use otx::inspect::{diff_records, OtDiffStatus};
use otx::preview::digest;
use otx::record::record_from_value;
use otx::step::catalog;
use otx::{OtCategory, OtRecord, OtSampleTransformer, OtStep, OtStepConfig};
use serde_json::{json, Value};

fn rec(value: Value) -> OtRecord {
    record_from_value(value).unwrap()
}

fn step(step_type: &str, config: OtStepConfig) -> OtStep {
    OtStep::builder(step_type, step_type, OtCategory::Privacy)
        .config(config)
        .build()
        .unwrap()
}

/// Tests the mask-passwords preview example end to end.
#[test]
fn test_mask_passwords_preview() {
    let before = rec(json!({"process.command_line": "app --password=secret123"}));
    let after = OtSampleTransformer::new().apply(&before, &[step(catalog::MASK_PASSWORDS, OtStepConfig::None)]);
    assert_eq!(Value::Object(after.clone()), json!({"process.command_line": "app --password=********"}));

    let diff = diff_records(Some(&before), Some(&after));
    assert_eq!(diff.len(), 1);
    assert_eq!(diff[0].status, OtDiffStatus::Modified);
    assert_eq!(diff[0].previous_value, Some(json!("app --password=secret123")));
}

/// Tests hashing of a nested email field.
#[test]
fn test_hash_emails_nested() {
    let before = rec(json!({"user": {"email": "jane@example.com", "name": "Jane"}}));
    let after = OtSampleTransformer::new().apply(&before, &[step(catalog::HASH_EMAILS, OtStepConfig::None)]);
    assert_eq!(after["user"]["email"], json!(digest("jane@example.com")));

    let diff = diff_records(Some(&before), Some(&after));
    let statuses: Vec<_> = diff.iter().map(|e| (e.path.as_str(), e.status)).collect();
    assert_eq!(
        statuses,
        vec![("user.email", OtDiffStatus::Modified), ("user.name", OtDiffStatus::Unchanged)]
    );
}

/// Tests that a drop quick action shows as a removed path.
#[test]
fn test_drop_field_shows_removed() {
    let before = rec(json!({"http": {"body": "{...}"}, "http.method": "GET"}));
    let after = OtSampleTransformer::new().apply(
        &before,
        &[step(catalog::DROP_FIELD, OtStepConfig::Field { field: "http.body".into() })],
    );
    let diff = diff_records(Some(&before), Some(&after));
    assert_eq!(diff[0].path, "http.body");
    assert_eq!(diff[0].status, OtDiffStatus::Removed);
    assert_eq!(diff[1].status, OtDiffStatus::Unchanged);
}

/// Tests batch transformation leaves inputs intact.
#[test]
fn test_transform_batch() {
    let batch = vec![
        rec(json!({"user.email": "a@b.io"})),
        rec(json!({"user.email": 7})),
    ];
    let out = OtSampleTransformer::new()
        .transform_batch(&batch, &[step(catalog::HASH_EMAILS, OtStepConfig::None)]);
    assert_eq!(out[0]["user.email"], json!(digest("a@b.io")));
    assert_eq!(out[1], batch[1]);
    assert_eq!(batch[0]["user.email"], json!("a@b.io"));
}

/// Tests that dropping a field keeps the remaining keys in upload order.
#[test]
fn test_drop_field_keeps_key_order() {
    let before = rec(json!({"a": 1, "b": 2, "c": 3}));
    let after = OtSampleTransformer::new().apply(
        &before,
        &[step(catalog::DROP_FIELD, OtStepConfig::Field { field: "a".into() })],
    );
    let keys: Vec<&str> = after.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["b", "c"]);
}

/// Tests that a log mask-passwords preview rewrites the log body.
#[test]
fn test_log_mask_passwords_preview() {
    let before = rec(json!({"log.body": "auth password=s3cret ok"}));
    let mut mask = step(catalog::MASK_PASSWORDS, OtStepConfig::None);
    mask.signal = otx::OtSignal::Log;
    let after = OtSampleTransformer::new().apply(&before, &[mask]);
    assert_eq!(after["log.body"], json!("auth password=******** ok"));
}
