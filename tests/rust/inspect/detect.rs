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

//! # Otx Inspect Tests - Detect
//!
//! Tests for the auto-detection heuristics.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test detect
//! ```

use otx::record::record_from_value;
use otx::step::catalog;
use otx::{OtCategory, OtDetectConfig, OtDetector, OtRecord, OtStep, OtStepConfig};
use serde_json::json;

fn detected_fields(steps: &[OtStep], step_type: &str) -> Option<Vec<String>> {
    steps
        .iter()
        .find(|s| s.step_type.as_str() == step_type)
        .map(|s| match &s.config {
            OtStepConfig::Detected { fields, .. } => fields.clone(),
            _ => Vec::new(),
        })
}

fn region_batch() -> Vec<OtRecord> {
    (0..10)
        .filter_map(|i| {
            record_from_value(json!({
                "service.region": "eu-west-1",
                "request.id": format!("req-{i}"),
            }))
        })
        .collect()
}

/// Tests the redundant and high-cardinality examples on one batch.
#[test]
fn test_redundant_and_high_cardinality() {
    let steps = OtDetector::new().detect(&region_batch(), &[]);
    assert_eq!(
        detected_fields(&steps, catalog::DROP_DUPLICATE_ATTRIBUTES),
        Some(vec!["service.region".to_string()])
    );
    assert_eq!(
        detected_fields(&steps, catalog::DROP_HIGH_CARDINALITY),
        Some(vec!["request.id".to_string()])
    );
}

/// Tests that candidates come out disabled and ordered by priority.
#[test]
fn test_candidates_sorted_by_priority() {
    let records: Vec<OtRecord> = vec![
        json!({
            "user.email": "jane@example.com",
            "session.uuid": "123e4567-e89b-12d3-a456-426614174000",
            "net.peer.ip": "10.0.0.1",
            "api.key.secret": "abc",
            "k8s.pod.annotation.x": "y",
        }),
        json!({"user.email": "joe@example.com", "net.peer.ip": "10.0.0.2"}),
    ]
    .into_iter()
    .filter_map(record_from_value)
    .collect();

    let steps = OtDetector::new().detect(&records, &[]);
    let order: Vec<&str> = steps.iter().map(|s| s.step_type.as_str()).collect();
    assert_eq!(
        order,
        vec![
            catalog::MASK_AUTH_TOKENS,
            catalog::HASH_EMAILS,
            catalog::HASH_UUIDS,
            catalog::MASK_IP_ADDRESSES,
            catalog::DROP_K8S_METADATA,
        ]
    );
    assert!(steps.iter().all(|s| !s.enabled));
    assert!(steps.iter().all(|s| s.id.starts_with("auto-")));
    assert_eq!(
        detected_fields(&steps, catalog::HASH_EMAILS),
        Some(vec!["user.email".to_string()])
    );
}

/// Tests that rule types already in the pipeline are skipped.
#[test]
fn test_existing_steps_suppress_rules() {
    let existing = OtStep::builder(catalog::DROP_DUPLICATE_ATTRIBUTES, "Drop", OtCategory::Deletion)
        .build()
        .unwrap();
    let steps = OtDetector::new().detect(&region_batch(), &[existing]);
    assert!(detected_fields(&steps, catalog::DROP_DUPLICATE_ATTRIBUTES).is_none());
    assert!(detected_fields(&steps, catalog::DROP_HIGH_CARDINALITY).is_some());
}

/// Tests that thresholds come from configuration.
#[test]
fn test_thresholds_are_configurable() {
    let records: Vec<OtRecord> = vec![json!({"body": "x".repeat(20)})]
        .into_iter()
        .filter_map(record_from_value)
        .collect();
    assert!(OtDetector::new().detect(&records, &[]).is_empty());

    let config = OtDetectConfig { large_value_chars: 10, ..Default::default() };
    let steps = OtDetector::new().with_config(config).detect(&records, &[]);
    assert_eq!(
        detected_fields(&steps, catalog::TRUNCATE_LARGE_VALUES),
        Some(vec!["body".to_string()])
    );
}

/// Tests the detection summary.
#[test]
fn test_summary() {
    let summary = OtDetector::new().summary(&region_batch());
    assert_eq!(summary.total, 2);
    assert_eq!(summary.by_category.get("filtering"), Some(&1));
    assert_eq!(summary.by_category.get("deletion"), Some(&1));
    assert_eq!(summary.top_issues[0].name, "Drop High-Cardinality Attributes");
    assert_eq!(summary.top_issues[0].count, 1);
}
