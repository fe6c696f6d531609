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

//! Built-in step types and pipeline templates.

use super::{OtCategory, OtConfigShape, OtSignal};

pub const MASK_PASSWORDS: &str = "mask-passwords";
pub const HASH_EMAILS: &str = "hash-emails";
pub const SAMPLE_HIGH_VOLUME: &str = "sample-high-volume";
pub const MASK_FIELD: &str = "mask-field";
pub const HASH_FIELD: &str = "hash-field";
pub const DROP_FIELD: &str = "drop-field";
pub const CUSTOM_OTTL: &str = "custom-ottl";

pub const MASK_AUTH_TOKENS: &str = "mask-auth-tokens";
pub const HASH_UUIDS: &str = "hash-uuids";
pub const MASK_IP_ADDRESSES: &str = "mask-ip-addresses";
pub const DROP_HIGH_CARDINALITY: &str = "drop-high-cardinality";
pub const TRUNCATE_LARGE_VALUES: &str = "truncate-large-values";
pub const DROP_K8S_METADATA: &str = "drop-k8s-metadata";
pub const SAMPLE_HEALTH_CHECKS: &str = "sample-health-checks";
pub const LIMIT_ATTRIBUTE_COUNT: &str = "limit-attribute-count";
pub const DROP_DUPLICATE_ATTRIBUTES: &str = "drop-duplicate-attributes";

pub const CONVERT_METRIC_TYPE: &str = "convert-metric-type";
pub const SET_METRIC_METADATA: &str = "set-metric-metadata";
pub const DATAPOINT_OPERATIONS: &str = "datapoint-operations";
pub const SCALE_VALUES: &str = "scale-values";

/// Static description of a step type offered to operators.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OtStepDefinition {
    pub step_type: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: OtCategory,
    pub signal: OtSignal,
    pub compatible_signals: &'static [OtSignal],
    /// Configuration shapes a step of this type may carry.
    pub accepts: &'static [OtConfigShape],
}

/// A named bundle of step types applied together.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OtTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub description: &'static str,
    pub step_types: &'static [&'static str],
}

const ALL: &[OtSignal] = &[OtSignal::Trace, OtSignal::Metric, OtSignal::Log];
const TRACE_LOG: &[OtSignal] = &[OtSignal::Trace, OtSignal::Log];
const TRACE: &[OtSignal] = &[OtSignal::Trace];
const METRIC: &[OtSignal] = &[OtSignal::Metric];
const LOG: &[OtSignal] = &[OtSignal::Log];

const PLAIN: &[OtConfigShape] = &[OtConfigShape::None];
const DETECTABLE: &[OtConfigShape] = &[OtConfigShape::None, OtConfigShape::Detected];
const TARGETED: &[OtConfigShape] = &[
    OtConfigShape::None,
    OtConfigShape::Field,
    OtConfigShape::Detected,
];
const FIELD_ONLY: &[OtConfigShape] = &[OtConfigShape::Field];
const HASHED: &[OtConfigShape] = &[OtConfigShape::Hash, OtConfigShape::Field];
const STATEMENT: &[OtConfigShape] = &[OtConfigShape::Statement];

macro_rules! def {
    ($ty:expr, $name:expr, $desc:expr, $cat:ident, $sig:ident, $compat:expr, $accepts:expr) => {
        OtStepDefinition {
            step_type: $ty,
            name: $name,
            description: $desc,
            category: OtCategory::$cat,
            signal: OtSignal::$sig,
            compatible_signals: $compat,
            accepts: $accepts,
        }
    };
}

static DEFINITIONS: &[OtStepDefinition] = &[
    // Core privacy and sampling steps
    def!(MASK_PASSWORDS, "Mask Passwords", "Pattern: password=VALUE in process.command_line", Privacy, Trace, TRACE_LOG, TARGETED),
    def!(HASH_EMAILS, "Hash Email Addresses", "SHA256 hash for user.email attribute", Privacy, Trace, ALL, TARGETED),
    def!(SAMPLE_HIGH_VOLUME, "Sample High-Volume Traces", "Keep 10% of health check traces", Filtering, Trace, TRACE, PLAIN),
    // Quick actions raised from a diff entry
    def!(MASK_FIELD, "Mask Field", "Replace a sensitive value with asterisks.", Privacy, Trace, ALL, FIELD_ONLY),
    def!(HASH_FIELD, "Hash Field", "Hash a value so analytics remain possible.", Privacy, Trace, ALL, HASHED),
    def!(DROP_FIELD, "Drop Field", "Remove an attribute from telemetry payloads.", Deletion, Trace, ALL, FIELD_ONLY),
    // Attribute operations
    def!("add-static-attribute", "Add Static Attribute", "Add a new key/value pair to the payload.", Attribute, Trace, ALL, PLAIN),
    def!("derive-from-substring", "Derive from Substring", "Extract characters by index range from an attribute.", Attribute, Trace, ALL, PLAIN),
    def!("concatenate-multiple", "Concatenate Multiple", "Join attributes together with separators.", Attribute, Trace, ALL, PLAIN),
    def!("split-and-extract", "Split & Extract", "Split values by delimiter and pull specific parts.", Attribute, Trace, ALL, PLAIN),
    def!("case-conversion", "Case Conversion", "Convert attribute values to snake_case, camelCase, etc.", Attribute, Trace, ALL, PLAIN),
    def!("copy-between-scopes", "Copy Between Scopes", "Move attributes across resource, span, log, or datapoint scopes.", Attribute, Trace, ALL, PLAIN),
    // Parsing and extraction
    def!("parse-json-body", "Parse JSON Body", "Extract structured data from JSON payloads.", Parsing, Trace, ALL, PLAIN),
    def!("parse-xml", "Parse XML", "Use XPath-style selectors to read XML content.", Parsing, Trace, ALL, PLAIN),
    def!("extract-regex-pattern", "Extract Regex Patterns", "Capture named groups from regex matches.", Parsing, Trace, ALL, PLAIN),
    def!("parse-user-agent", "Parse User Agent", "Break user agent strings into browser, OS, and device fields.", Parsing, Trace, ALL, PLAIN),
    // Privacy and masking
    def!("mask-with-pattern", "Mask with Pattern", "Use regex replacements to redact secrets.", Privacy, Trace, ALL, PLAIN),
    def!("hash-attributes", "Hash Attributes", "Hash values using SHA256, Murmur3, or MD5.", Privacy, Trace, ALL, PLAIN),
    def!("mask-sensitive-data", "Mask Sensitive Data", "Replace sensitive values like passwords or tokens with asterisks.", Privacy, Trace, TRACE_LOG, PLAIN),
    def!("hash-pii", "Hash PII", "Hash personally identifiable information using SHA-256.", Privacy, Trace, ALL, PLAIN),
    def!("redact-with-wildcards", "Redact with Wildcards", "Normalize IDs and URLs using wildcard masks.", Privacy, Trace, ALL, PLAIN),
    def!("partial-masking", "Partial Masking", "Reveal only the first/last characters of sensitive strings.", Privacy, Trace, ALL, PLAIN),
    // Filtering and cost control
    def!("drop-by-condition", "Drop by Condition", "Filter records using query builder rules.", Filtering, Trace, ALL, PLAIN),
    def!("sample-telemetry", "Sample Telemetry", "Reduce volume with smart or deterministic sampling.", Filtering, Trace, ALL, PLAIN),
    def!(LIMIT_ATTRIBUTE_COUNT, "Limit Attribute Count", "Keep the most important attributes and drop the rest.", Filtering, Trace, TRACE_LOG, DETECTABLE),
    def!("truncate-values", "Truncate Values", "Enforce max string length with ellipsis previews.", Filtering, Trace, ALL, PLAIN),
    // Deletion
    def!("delete-specific-attributes", "Delete Specific Attributes", "Remove selected attributes from telemetry.", Deletion, Trace, ALL, PLAIN),
    def!("keep-only-listed", "Keep Only Listed", "Whitelist attributes and drop everything else.", Deletion, Trace, ALL, PLAIN),
    def!("remove-by-pattern", "Remove by Pattern", "Use regex patterns to drop groups of attributes.", Deletion, Trace, ALL, PLAIN),
    // Metric-specific
    def!(CONVERT_METRIC_TYPE, "Convert Metric Type", "Convert between sum, gauge, and histogram signals.", Metric, Metric, METRIC, PLAIN),
    def!(SET_METRIC_METADATA, "Set Metric Metadata", "Update metric descriptions, units, and display types.", Metric, Metric, METRIC, PLAIN),
    def!(DATAPOINT_OPERATIONS, "Datapoint Operations", "Adjust datapoint values or attributes per sample.", Metric, Metric, METRIC, PLAIN),
    def!(SCALE_VALUES, "Scale Values", "Multiply or divide metric values to convert units.", Metric, Metric, METRIC, PLAIN),
    def!("convert-sum-to-gauge", "Convert Sum to Gauge", "Use convert_sum_to_gauge() to turn sum metrics into gauges.", Metric, Metric, METRIC, PLAIN),
    def!("extract-count-metric", "Extract Count Metric", "Create a new metric from histogram or summary counts.", Metric, Metric, METRIC, PLAIN),
    def!("extract-sum-metric", "Extract Sum Metric", "Create a new metric from histogram or summary sums.", Metric, Metric, METRIC, PLAIN),
    def!("convert-summary-count-to-sum", "Summary Count to Sum", "Use convert_summary_count_val_to_sum() for summary datapoints.", Metric, Metric, METRIC, PLAIN),
    def!("summary-quantile-to-gauge", "Summary Quantile to Gauge", "Convert summary quantiles into gauge metrics.", Metric, Metric, METRIC, PLAIN),
    def!("convert-summary-sum-to-sum", "Summary Sum to Sum", "Normalize summary sums using convert_summary_sum_val_to_sum().", Metric, Metric, METRIC, PLAIN),
    def!("copy-metric", "Copy Metric", "Duplicate metric streams with copy_metric().", Metric, Metric, METRIC, PLAIN),
    def!("aggregate-on-attributes", "Aggregate on Attributes", "Roll up datapoints grouped by selected attributes.", Metric, Metric, METRIC, PLAIN),
    def!("convert-exp-histogram", "Convert Exponential Histogram", "Convert exponential histograms to standard histograms.", Metric, Metric, METRIC, PLAIN),
    def!("aggregate-on-attribute-value", "Aggregate on Attribute Value", "Roll up datapoints grouped by a specific attribute value.", Metric, Metric, METRIC, PLAIN),
    def!("merge-histogram-buckets", "Merge Histogram Buckets", "Combine histogram buckets into aggregated buckets.", Metric, Metric, METRIC, PLAIN),
    // Formatting and presentation
    def!("format-strings", "Format Strings", "Use templates and placeholders to reshape strings.", Formatting, Trace, ALL, PLAIN),
    def!("format-timestamps", "Format Timestamps", "Convert timestamps into readable formats.", Formatting, Trace, ALL, PLAIN),
    def!("normalize-units", "Normalize Units", "Convert between ms and s, bytes and MB, and more.", Formatting, Trace, ALL, PLAIN),
    def!("sort-arrays", "Sort Arrays", "Sort array attributes ascending or descending.", Formatting, Trace, ALL, PLAIN),
    // Advanced operations
    def!("type-conversion", "Type Conversion", "Cast values to integers, doubles, durations, and more.", Advanced, Trace, ALL, PLAIN),
    def!("body-remapping", "Body Remapping", "Move values between log.body and attributes.", Advanced, Log, LOG, PLAIN),
    def!("severity-adjustment", "Severity Adjustment", "Normalize log severity levels or map custom levels.", Advanced, Log, LOG, PLAIN),
    def!("cache-variables", "Cache Variables", "Store reusable values for later transformation steps.", Advanced, Trace, ALL, PLAIN),
    def!(CUSTOM_OTTL, "Custom OTTL", "Write raw OTTL statements for advanced scenarios.", Advanced, Trace, ALL, STATEMENT),
    // Emitted by auto-detection
    def!(MASK_AUTH_TOKENS, "Mask Auth Tokens", "Detected authentication tokens in resource attributes", Privacy, Trace, TRACE_LOG, DETECTABLE),
    def!(HASH_UUIDS, "Hash UUIDs and GUIDs", "Detected UUIDs and GUIDs that should be hashed for privacy", Privacy, Trace, ALL, DETECTABLE),
    def!(MASK_IP_ADDRESSES, "Mask IP Addresses", "Detected IP addresses that may contain PII", Privacy, Trace, TRACE_LOG, DETECTABLE),
    def!(DROP_HIGH_CARDINALITY, "Drop High-Cardinality Attributes", "Detected attributes with very high cardinality (cost impact)", Filtering, Trace, TRACE, DETECTABLE),
    def!(TRUNCATE_LARGE_VALUES, "Truncate Large Values", "Detected attributes with very large string values", Filtering, Trace, TRACE_LOG, DETECTABLE),
    def!(DROP_K8S_METADATA, "Drop Verbose K8s Metadata", "Detected verbose Kubernetes metadata that may not be needed", Deletion, Trace, TRACE, DETECTABLE),
    def!(SAMPLE_HEALTH_CHECKS, "Sample Health Check Traffic", "Detected high-volume health check endpoints (reduce by 90%)", Filtering, Trace, TRACE, DETECTABLE),
    def!(DROP_DUPLICATE_ATTRIBUTES, "Drop Duplicate Attributes", "Detected attributes with identical values across all records", Deletion, Trace, ALL, DETECTABLE),
];

static TEMPLATES: &[OtTemplate] = &[
    OtTemplate {
        id: "template-pii-essentials",
        name: "PII Protection Essentials",
        category: "Security & Privacy",
        description: "Mask emails, hash identifiers, and redact secrets from telemetry streams.",
        step_types: &["mask-with-pattern", "hash-attributes", "redact-with-wildcards"],
    },
    OtTemplate {
        id: "template-cost-control",
        name: "Cost Control Starter",
        category: "Cost Optimization",
        description: "Trim high-cardinality attributes and sample noisy traffic to cut storage.",
        step_types: &["sample-telemetry", LIMIT_ATTRIBUTE_COUNT, "truncate-values"],
    },
    OtTemplate {
        id: "template-http-cleanup",
        name: "HTTP Telemetry Cleanup",
        category: "Operations",
        description: "Parse JSON payloads, remove noisy attributes, and keep request context tidy.",
        step_types: &["parse-json-body", "remove-by-pattern", "delete-specific-attributes"],
    },
];

pub fn definitions() -> &'static [OtStepDefinition] {
    DEFINITIONS
}

pub fn definition(step_type: &str) -> Option<&'static OtStepDefinition> {
    DEFINITIONS.iter().find(|def| def.step_type == step_type)
}

pub fn templates() -> &'static [OtTemplate] {
    TEMPLATES
}

pub fn template(id: &str) -> Option<&'static OtTemplate> {
    TEMPLATES.iter().find(|template| template.id == id)
}

/// Case-insensitive search over names and descriptions, optionally narrowed
/// to a category and to definitions usable with `signal`.
pub fn search(
    query: &str,
    category: Option<OtCategory>,
    signal: Option<OtSignal>,
) -> Vec<&'static OtStepDefinition> {
    let needle = query.trim().to_lowercase();
    DEFINITIONS
        .iter()
        .filter(|def| {
            needle.is_empty()
                || def.name.to_lowercase().contains(&needle)
                || def.description.to_lowercase().contains(&needle)
        })
        .filter(|def| category.map_or(true, |c| def.category == c))
        .filter(|def| signal.map_or(true, |s| def.compatible_signals.contains(&s)))
        .collect()
}
