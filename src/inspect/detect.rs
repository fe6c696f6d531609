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

//! Heuristic issue detection over sample batches.
//!
//! Each rule inspects the top-level keys of every record and reports the
//! fields that triggered it. Matching on key names is case-insensitive.
//! Candidates come out disabled and sorted by descending priority; ties keep
//! declaration order.

use std::collections::HashSet;
use std::sync::OnceLock;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::OtDetectConfig;
use crate::pattern::{self, OtPatternCell};
use crate::record::OtRecord;
use crate::step::{catalog, new_step_id, OtCategory, OtSignal, OtStep, OtStepConfig, OtStepType};

const UUID_PATTERN: &str =
    r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$";
const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";
const IPV4_PATTERN: &str = r"\b\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}\b";

static UUID_RE: OtPatternCell = OnceLock::new();
static EMAIL_RE: OtPatternCell = OnceLock::new();
static IPV4_RE: OtPatternCell = OnceLock::new();

const HEALTH_FRAGMENTS: &[&str] = &["/health", "/ping", "/ready", "/live", "healthcheck"];

type OtDetectFn = fn(&OtDetectConfig, &[OtRecord]) -> Vec<String>;

struct OtDetectionRule {
    step_type: &'static str,
    name: &'static str,
    description: &'static str,
    category: OtCategory,
    compatible_signals: &'static [OtSignal],
    priority: u32,
    detect: OtDetectFn,
}

const TRACE: &[OtSignal] = &[OtSignal::Trace];
const TRACE_LOG: &[OtSignal] = &[OtSignal::Trace, OtSignal::Log];
const ALL: &[OtSignal] = &OtSignal::ALL;

static RULES: &[OtDetectionRule] = &[
    OtDetectionRule {
        step_type: catalog::MASK_AUTH_TOKENS,
        name: "Mask Auth Tokens",
        description: "Detected authentication tokens in resource attributes",
        category: OtCategory::Privacy,
        compatible_signals: TRACE_LOG,
        priority: 100,
        detect: detect_auth_tokens,
    },
    OtDetectionRule {
        step_type: catalog::HASH_UUIDS,
        name: "Hash UUIDs and GUIDs",
        description: "Detected UUIDs and GUIDs that should be hashed for privacy",
        category: OtCategory::Privacy,
        compatible_signals: ALL,
        priority: 90,
        detect: detect_uuids,
    },
    OtDetectionRule {
        step_type: catalog::HASH_EMAILS,
        name: "Hash Email Addresses",
        description: "Detected email addresses in telemetry",
        category: OtCategory::Privacy,
        compatible_signals: ALL,
        priority: 95,
        detect: detect_emails,
    },
    OtDetectionRule {
        step_type: catalog::MASK_IP_ADDRESSES,
        name: "Mask IP Addresses",
        description: "Detected IP addresses that may contain PII",
        category: OtCategory::Privacy,
        compatible_signals: TRACE_LOG,
        priority: 80,
        detect: detect_ip_addresses,
    },
    OtDetectionRule {
        step_type: catalog::DROP_HIGH_CARDINALITY,
        name: "Drop High-Cardinality Attributes",
        description: "Detected attributes with very high cardinality (cost impact)",
        category: OtCategory::Filtering,
        compatible_signals: TRACE,
        priority: 60,
        detect: detect_high_cardinality,
    },
    OtDetectionRule {
        step_type: catalog::TRUNCATE_LARGE_VALUES,
        name: "Truncate Large Values",
        description: "Detected attributes with very large string values",
        category: OtCategory::Filtering,
        compatible_signals: TRACE_LOG,
        priority: 50,
        detect: detect_large_values,
    },
    OtDetectionRule {
        step_type: catalog::DROP_K8S_METADATA,
        name: "Drop Verbose K8s Metadata",
        description: "Detected verbose Kubernetes metadata that may not be needed",
        category: OtCategory::Deletion,
        compatible_signals: TRACE,
        priority: 40,
        detect: detect_k8s_metadata,
    },
    OtDetectionRule {
        step_type: catalog::SAMPLE_HEALTH_CHECKS,
        name: "Sample Health Check Traffic",
        description: "Detected high-volume health check endpoints (reduce by 90%)",
        category: OtCategory::Filtering,
        compatible_signals: TRACE,
        priority: 70,
        detect: detect_health_checks,
    },
    OtDetectionRule {
        step_type: catalog::LIMIT_ATTRIBUTE_COUNT,
        name: "Limit Attribute Count",
        description: "Detected records with too many attributes",
        category: OtCategory::Filtering,
        compatible_signals: TRACE_LOG,
        priority: 55,
        detect: detect_attribute_count,
    },
    OtDetectionRule {
        step_type: catalog::DROP_DUPLICATE_ATTRIBUTES,
        name: "Drop Duplicate Attributes",
        description: "Detected attributes with identical values across all records",
        category: OtCategory::Deletion,
        compatible_signals: ALL,
        priority: 45,
        detect: detect_redundant,
    },
];

/// Collects distinct field names in discovery order.
#[derive(Default)]
struct FieldSet {
    seen: HashSet<String>,
    fields: Vec<String>,
}

impl FieldSet {
    fn push(&mut self, field: String) {
        if self.seen.insert(field.clone()) {
            self.fields.push(field);
        }
    }

    fn into_vec(self) -> Vec<String> {
        self.fields
    }
}

fn keys_matching(records: &[OtRecord], accept: impl Fn(&str, &Value) -> bool) -> Vec<String> {
    let mut found = FieldSet::default();
    for record in records {
        for (key, value) in record {
            if accept(&key.to_lowercase(), value) {
                found.push(key.clone());
            }
        }
    }
    found.into_vec()
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

fn string_matches(value: &Value, cell: &'static OtPatternCell, pattern_text: &str) -> bool {
    value
        .as_str()
        .is_some_and(|s| pattern::matches(cell, pattern_text, s))
}

fn detect_auth_tokens(_: &OtDetectConfig, records: &[OtRecord]) -> Vec<String> {
    keys_matching(records, |key, _| {
        (key.contains("auth") && key.contains("token"))
            || contains_any(key, &["api.key", "api_key", "secret", "password"])
    })
}

fn detect_uuids(_: &OtDetectConfig, records: &[OtRecord]) -> Vec<String> {
    keys_matching(records, |key, value| {
        contains_any(key, &["uid", "guid", "uuid", "id"]) && string_matches(value, &UUID_RE, UUID_PATTERN)
    })
}

fn detect_emails(_: &OtDetectConfig, records: &[OtRecord]) -> Vec<String> {
    keys_matching(records, |key, value| {
        contains_any(key, &["email", "user"]) && string_matches(value, &EMAIL_RE, EMAIL_PATTERN)
    })
}

fn detect_ip_addresses(_: &OtDetectConfig, records: &[OtRecord]) -> Vec<String> {
    keys_matching(records, |key, value| {
        contains_any(key, &["ip", "address", "peer"]) && string_matches(value, &IPV4_RE, IPV4_PATTERN)
    })
}

fn detect_large_values(config: &OtDetectConfig, records: &[OtRecord]) -> Vec<String> {
    keys_matching(records, |_, value| {
        value
            .as_str()
            .is_some_and(|s| s.chars().count() > config.large_value_chars)
    })
}

fn detect_k8s_metadata(_: &OtDetectConfig, records: &[OtRecord]) -> Vec<String> {
    keys_matching(records, |key, _| {
        key.contains("k8s.") && contains_any(key, &["annotation", "label", "template"])
    })
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn detect_health_checks(_: &OtDetectConfig, records: &[OtRecord]) -> Vec<String> {
    let mut found = FieldSet::default();
    for record in records {
        for (key, value) in record {
            let lowered = key.to_lowercase();
            if !contains_any(&lowered, &["url", "path", "endpoint", "name"]) {
                continue;
            }
            let Some(text) = scalar_text(value) else {
                continue;
            };
            if contains_any(&text.to_lowercase(), HEALTH_FRAGMENTS) {
                found.push(format!("{key}={text}"));
            }
        }
    }
    found.into_vec()
}

fn detect_attribute_count(config: &OtDetectConfig, records: &[OtRecord]) -> Vec<String> {
    records
        .iter()
        .map(|record| record.len())
        .filter(|count| *count > config.max_attributes)
        .max()
        .map(|count| vec![format!("{count} attributes detected")])
        .unwrap_or_default()
}

/// Distinct serialized values and presence count per top-level key.
fn value_sets(records: &[OtRecord]) -> IndexMap<&str, (HashSet<String>, usize)> {
    let mut sets: IndexMap<&str, (HashSet<String>, usize)> = IndexMap::new();
    for record in records {
        for (key, value) in record {
            let entry = sets.entry(key.as_str()).or_default();
            entry.0.insert(value.to_string());
            entry.1 += 1;
        }
    }
    sets
}

fn detect_high_cardinality(config: &OtDetectConfig, records: &[OtRecord]) -> Vec<String> {
    if records.is_empty() {
        return Vec::new();
    }
    value_sets(records)
        .into_iter()
        .filter(|(_, (values, _))| {
            let ratio = values.len() as f64 / records.len() as f64;
            values.len() >= config.cardinality_min_distinct && ratio > config.cardinality_ratio
        })
        .map(|(key, _)| key.to_string())
        .collect()
}

fn detect_redundant(_: &OtDetectConfig, records: &[OtRecord]) -> Vec<String> {
    if records.len() < 2 {
        return Vec::new();
    }
    value_sets(records)
        .into_iter()
        .filter(|(_, (values, present))| values.len() == 1 && *present == records.len())
        .map(|(key, _)| key.to_string())
        .collect()
}

/// One line of a detection summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtDetectedIssue {
    pub name: String,
    pub count: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtDetectionSummary {
    pub total: usize,
    pub by_category: IndexMap<String, usize>,
    pub top_issues: Vec<OtDetectedIssue>,
}

/// Runs the detection rules against a sample batch.
#[derive(Clone, Debug, Default)]
pub struct OtDetector {
    config: OtDetectConfig,
}

impl OtDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: OtDetectConfig) -> Self {
        self.config = config;
        self
    }

    /// Candidate steps for `records`, skipping rule types already in `existing`.
    pub fn detect(&self, records: &[OtRecord], existing: &[OtStep]) -> Vec<OtStep> {
        if records.is_empty() {
            return Vec::new();
        }
        if records.len() > self.config.batch_warning_records {
            log::warn!(
                "running detection on {} records; per-key value sets grow with batch size",
                records.len()
            );
        }

        let present: HashSet<&str> = existing.iter().map(|s| s.step_type.as_str()).collect();
        let pending: Vec<&OtDetectionRule> = RULES
            .iter()
            .filter(|rule| !present.contains(rule.step_type))
            .collect();

        let mut candidates: Vec<(u32, OtStep)> = self.run(&pending, records);
        candidates.sort_by(|a, b| b.0.cmp(&a.0));
        log::debug!("detection produced {} candidate(s)", candidates.len());
        candidates.into_iter().map(|(_, step)| step).collect()
    }

    #[cfg(feature = "parallel")]
    fn run(&self, rules: &[&OtDetectionRule], records: &[OtRecord]) -> Vec<(u32, OtStep)> {
        use rayon::prelude::*;
        rules
            .par_iter()
            .filter_map(|rule| self.evaluate(rule, records))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn run(&self, rules: &[&OtDetectionRule], records: &[OtRecord]) -> Vec<(u32, OtStep)> {
        rules
            .iter()
            .filter_map(|rule| self.evaluate(rule, records))
            .collect()
    }

    fn evaluate(&self, rule: &OtDetectionRule, records: &[OtRecord]) -> Option<(u32, OtStep)> {
        let fields = (rule.detect)(&self.config, records);
        if fields.is_empty() {
            return None;
        }

        let quoted = self.config.description_fields;
        let mut listed = fields.iter().take(quoted).cloned().collect::<Vec<_>>().join(", ");
        if fields.len() > quoted {
            listed.push_str("...");
        }

        let step = OtStep {
            id: new_step_id(&format!("auto-{}", rule.step_type)),
            step_type: OtStepType::new(rule.step_type),
            title: rule.name.to_string(),
            description: Some(format!("{} (Fields: {})", rule.description, listed)),
            category: rule.category,
            signal: OtSignal::Trace,
            compatible_signals: rule.compatible_signals.to_vec(),
            enabled: false,
            config: OtStepConfig::Detected {
                fields,
                priority: rule.priority,
            },
        };
        Some((rule.priority, step))
    }

    /// Totals, per-category counts and the five highest-priority issues.
    pub fn summary(&self, records: &[OtRecord]) -> OtDetectionSummary {
        let detected = self.detect(records, &[]);
        let mut by_category: IndexMap<String, usize> = IndexMap::new();
        for step in &detected {
            *by_category.entry(step.category.as_str().to_string()).or_default() += 1;
        }
        let top_issues = detected
            .iter()
            .take(5)
            .map(|step| OtDetectedIssue {
                name: step.title.clone(),
                count: match &step.config {
                    OtStepConfig::Detected { fields, .. } => fields.len(),
                    _ => 0,
                },
            })
            .collect();
        OtDetectionSummary {
            total: detected.len(),
            by_category,
            top_issues,
        }
    }
}
