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

//! # Otx DSL Tests - Validate
//!
//! Tests for statement and program compatibility checks.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test validate
//! ```

use otx::dsl::validate::{extract_functions, function_signals};
use otx::{compatibility_label, infer_signal, validate_program, validate_statement, OtSignal};

/// Tests the metric-only function example against the log signal.
#[test]
fn test_metric_function_rejected_on_log() {
    let report = validate_statement(r#"convert_gauge_to_sum("cumulative", false)"#, OtSignal::Log);
    assert!(!report.valid);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("convert_gauge_to_sum"));
    assert!(report.errors[0].ends_with("Compatible with: metric"));
}

/// Tests that all violations are aggregated in one pass.
#[test]
fn test_errors_are_aggregated() {
    let report = validate_statement(
        r#"scale_metric(2.0) where span.name == "x" and copy_metric(name="y")"#,
        OtSignal::Trace,
    );
    assert_eq!(report.errors.len(), 2);
    assert!(report.errors[0].starts_with("Function 'scale_metric'"));
    assert!(report.errors[1].starts_with("Function 'copy_metric'"));

    let report = validate_statement(r#"set(log.body, span.name)"#, OtSignal::Metric);
    assert_eq!(
        report.errors,
        vec!["Invalid path prefixes for metric statements: log, span. Allowed: resource, scope, metric, datapoint"]
    );
}

/// Tests that valid statements for each signal pass.
#[test]
fn test_valid_statements() {
    assert!(validate_statement(r#"set(resource.attributes["a"], "b")"#, OtSignal::Log).valid);
    assert!(validate_statement(r#"scale_metric(0.1, "kWh")"#, OtSignal::Metric).valid);
    assert!(validate_statement(r#"truncate_all(spanevent.attributes, 10)"#, OtSignal::Trace).valid);
}

/// Tests the function table lookups.
#[test]
fn test_function_table() {
    assert_eq!(function_signals("merge_histogram_buckets"), Some(&[OtSignal::Metric][..]));
    assert_eq!(function_signals("noop").map(|s| s.len()), Some(3));
    assert_eq!(function_signals("IsMatch"), None);
    assert_eq!(compatibility_label("copy_metric"), "Metric");
    assert_eq!(extract_functions("  noop ( )"), vec!["noop"]);
}

/// Tests the signal inference precedence.
#[test]
fn test_infer_signal_precedence() {
    assert_eq!(infer_signal(r#"scale_metric(1.0) where log.body == "x""#), OtSignal::Metric);
    assert_eq!(infer_signal(r#"set(log.body, span.name)"#), OtSignal::Log);
    assert_eq!(infer_signal(r#"set(spanevent.name, "x")"#), OtSignal::Trace);
}

/// Tests program validation line numbering and the empty-text failure.
#[test]
fn test_validate_program() {
    let text = "transform:\n  trace_statements:\n    - context: span\n      statements:\n        - set(log.body, \"x\")\n        - noop()";
    let report = validate_program(text).unwrap();
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("Line 5: Invalid path prefixes for trace statements: log."));
    assert!(validate_program("").is_err());
}
