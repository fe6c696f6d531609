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

//! Signal compatibility checks for individual statements and whole programs.
//!
//! Extraction is lexical: function names are identifiers directly followed by
//! `(`, path prefixes are one of the known scope words directly followed by a
//! `.`. Functions missing from the table are accepted for every signal.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{OtError, Result};
use crate::pattern::{self, OtPatternCell};
use crate::step::OtSignal;

const METRIC_ONLY_FUNCTIONS: &[&str] = &[
    "convert_sum_to_gauge",
    "convert_gauge_to_sum",
    "extract_count_metric",
    "extract_sum_metric",
    "convert_summary_count_val_to_sum",
    "convert_summary_quantile_val_to_gauge",
    "convert_summary_sum_val_to_sum",
    "copy_metric",
    "scale_metric",
    "aggregate_on_attributes",
    "convert_exponential_histogram_to_histogram",
    "aggregate_on_attribute_value",
    "merge_histogram_buckets",
];

const COMMON_FUNCTIONS: &[&str] = &[
    "set",
    "delete_key",
    "delete_matching_keys",
    "keep_keys",
    "limit",
    "merge_maps",
    "replace_match",
    "replace_pattern",
    "replace_all_matches",
    "replace_all_patterns",
    "truncate_all",
    "flatten",
    "concat",
    "split",
    "substring",
    "len",
    "int",
    "double",
    "sha256",
    "sha1",
    "md5",
    "uuid",
    "time",
    "unix_seconds",
    "unix_milli",
    "unix_nano",
    "parse_json",
    "parse_xml",
    "noop",
];

const METRIC_ONLY: &[OtSignal] = &[OtSignal::Metric];

/// Signals a known function may be used with, `None` when unknown.
pub fn function_signals(name: &str) -> Option<&'static [OtSignal]> {
    if METRIC_ONLY_FUNCTIONS.contains(&name) {
        Some(METRIC_ONLY)
    } else if COMMON_FUNCTIONS.contains(&name) {
        Some(&OtSignal::ALL)
    } else {
        None
    }
}

pub fn allowed_prefixes(signal: OtSignal) -> &'static [&'static str] {
    match signal {
        OtSignal::Trace => &["resource", "scope", "span", "spanevent"],
        OtSignal::Metric => &["resource", "scope", "metric", "datapoint"],
        OtSignal::Log => &["resource", "scope", "log"],
    }
}

const FUNCTION_PATTERN: &str = r"\b([A-Za-z_][A-Za-z0-9_]*)\s*\(";
const PREFIX_PATTERN: &str = r"\b(resource|scope|spanevent|span|metric|datapoint|log)\.";
const SECTION_PATTERN: &str = r"^\s*(trace|metric|log)_statements:";

static FUNCTION_RE: OtPatternCell = OnceLock::new();
static PREFIX_RE: OtPatternCell = OnceLock::new();
static SECTION_RE: OtPatternCell = OnceLock::new();

fn dedup_captures(re: Option<&Regex>, text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    let Some(re) = re else {
        return found;
    };
    for caps in re.captures_iter(text) {
        let name = &caps[1];
        if !found.iter().any(|f| f == name) {
            found.push(name.to_string());
        }
    }
    found
}

/// Function names called by `statement`, deduplicated in discovery order.
pub fn extract_functions(statement: &str) -> Vec<String> {
    dedup_captures(pattern::cached(&FUNCTION_RE, FUNCTION_PATTERN), statement)
}

/// Path prefixes used by `statement`, deduplicated in discovery order.
pub fn extract_path_prefixes(statement: &str) -> Vec<String> {
    dedup_captures(pattern::cached(&PREFIX_RE, PREFIX_PATTERN), statement)
}

/// Outcome of a compatibility check. `errors` is empty exactly when `valid`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl OtValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

fn join_signals(signals: &[OtSignal]) -> String {
    signals
        .iter()
        .map(OtSignal::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Checks every function and path prefix of `statement` against `signal`.
pub fn validate_statement(statement: &str, signal: OtSignal) -> OtValidationReport {
    let mut errors = Vec::new();

    for function in extract_functions(statement) {
        if let Some(signals) = function_signals(&function) {
            if !signals.contains(&signal) {
                errors.push(format!(
                    "Function '{}' is not compatible with {} signal. Compatible with: {}",
                    function,
                    signal,
                    join_signals(signals)
                ));
            }
        }
    }

    let allowed = allowed_prefixes(signal);
    let invalid: Vec<String> = extract_path_prefixes(statement)
        .into_iter()
        .filter(|prefix| !allowed.contains(&prefix.as_str()))
        .collect();
    if !invalid.is_empty() {
        errors.push(format!(
            "Invalid path prefixes for {} statements: {}. Allowed: {}",
            signal,
            invalid.join(", "),
            allowed.join(", ")
        ));
    }

    OtValidationReport::from_errors(errors)
}

/// Best-effort guess of the signal a statement was written for.
pub fn infer_signal(statement: &str) -> OtSignal {
    let functions = extract_functions(statement);
    if functions
        .iter()
        .any(|f| METRIC_ONLY_FUNCTIONS.contains(&f.as_str()))
    {
        return OtSignal::Metric;
    }

    let prefixes = extract_path_prefixes(statement);
    let uses = |names: &[&str]| prefixes.iter().any(|p| names.contains(&p.as_str()));
    if uses(&["metric", "datapoint"]) {
        OtSignal::Metric
    } else if uses(&["log"]) {
        OtSignal::Log
    } else {
        OtSignal::Trace
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Human label for a function's compatibility, e.g. `"All signals"` or `"Metric"`.
pub fn compatibility_label(function: &str) -> String {
    match function_signals(function) {
        Some(signals) if signals.len() < OtSignal::ALL.len() => signals
            .iter()
            .map(|s| title_case(s.as_str()))
            .collect::<Vec<_>>()
            .join(", "),
        _ => "All signals".to_string(),
    }
}

/// Validates every statement line of a hand-edited program.
///
/// Statements are attributed to the most recent `<signal>_statements:`
/// header; lines before any header are checked against trace. Returns the
/// per-line problems, or an error when the text is empty.
pub fn validate_program(text: &str) -> Result<OtValidationReport> {
    if text.trim().is_empty() {
        return Err(OtError::validation("program text may not be empty"));
    }

    let mut signal = OtSignal::Trace;
    let mut errors = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let section = pattern::cached(&SECTION_RE, SECTION_PATTERN).and_then(|re| re.captures(line));
        if let Some(caps) = section {
            signal = OtSignal::parse(&caps[1]).unwrap_or_default();
            continue;
        }
        let trimmed = line.trim_start();
        let Some(statement) = trimmed.strip_prefix("- ") else {
            continue;
        };
        let statement = statement.trim();
        if statement.is_empty() || statement.starts_with('#') || statement.starts_with("context:") {
            continue;
        }
        let report = validate_statement(statement, signal);
        if !report.valid {
            errors.push(format!("Line {}: {}", index + 1, report.errors.join("; ")));
        }
    }

    Ok(OtValidationReport::from_errors(errors))
}
