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

//! # Otx DSL Tests - Compiler
//!
//! Tests for OTTL program generation: rule tiers, grouping, ordering and
//! rendering.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test compiler
//! ```

use otx::dsl::{OtRuleOutput, OtRuleTable, OtStatementContext};
use otx::step::catalog;
use otx::{OtCategory, OtCompiler, OtCompilerConfig, OtErrorMode, OtSignal, OtStep, OtStepConfig};

fn step(id: &str, step_type: &str, title: &str, category: OtCategory, signal: OtSignal) -> OtStep {
    OtStep::builder(step_type, title, category)
        .id(id)
        .signal(signal)
        .build()
        .unwrap()
}

/// Tests the mask-passwords example: a span-context replace_pattern on the
/// command line.
#[test]
fn test_mask_passwords_compiles_to_span_statement() {
    let steps = vec![step("1", catalog::MASK_PASSWORDS, "Mask Passwords", OtCategory::Privacy, OtSignal::Trace)];
    let program = OtCompiler::default().compile(&steps);

    let section = program.section(OtSignal::Trace).unwrap();
    assert_eq!(section.groups.len(), 1);
    assert_eq!(section.groups[0].context, OtStatementContext::Span);
    let statement = &section.groups[0].statements[0].statement;
    assert!(statement.starts_with("replace_pattern("));
    assert!(statement.contains("process.command_line"));
}

/// Tests the full rendered layout for steps across all three signals.
#[test]
fn test_render_layout_across_signals() {
    let steps = vec![
        step("l", catalog::HASH_EMAILS, "Hash Email Addresses", OtCategory::Privacy, OtSignal::Log),
        step("m", catalog::SET_METRIC_METADATA, "Set Metric Metadata", OtCategory::Metric, OtSignal::Metric),
        step("t", catalog::SAMPLE_HIGH_VOLUME, "Sample", OtCategory::Filtering, OtSignal::Trace),
    ];
    let config = OtCompilerConfig { include_comments: false, ..Default::default() };
    let text = OtCompiler::new(config).compile_text(&steps);

    let expected = [
        "# Generated OTTL configuration",
        "# Source: Active telemetry selection",
        "transform:",
        "  error_mode: ignore",
        "  trace_statements:",
        "    - context: span",
        "      statements:",
        r#"        - set(span.attributes["telemetry.sample.keep"], true) where span.attributes["service.name"] in ["health-check", "cron"]"#,
        "  metric_statements:",
        "    - context: metric",
        "      statements:",
        r#"        - set(metric.description, "Updated description")"#,
        "  log_statements:",
        "    - context: log",
        "      statements:",
        r#"        - set(log.attributes["user.email"], sha256(log.attributes["user.email"]))"#,
    ]
    .join("\n");
    assert_eq!(text, expected);
}

/// Tests that statements inside a group keep pipeline order.
#[test]
fn test_group_order_follows_pipeline_order() {
    let steps = vec![
        step("a", catalog::HASH_EMAILS, "A", OtCategory::Privacy, OtSignal::Trace),
        step("b", catalog::DROP_K8S_METADATA, "B", OtCategory::Deletion, OtSignal::Trace),
        step("c", catalog::MASK_PASSWORDS, "C", OtCategory::Privacy, OtSignal::Trace),
        step("d", "partial-masking", "D", OtCategory::Privacy, OtSignal::Trace),
    ];
    let program = OtCompiler::default().compile(&steps);
    let section = program.section(OtSignal::Trace).unwrap();
    let span: Vec<&str> = section.groups[0].statements.iter().map(|s| s.step_id.as_str()).collect();
    assert_eq!(span, vec!["a", "c", "d"]);
    assert_eq!(section.groups[1].context, OtStatementContext::Resource);
}

/// Tests that unknown steps degrade to a no-op instead of failing.
#[test]
fn test_unknown_steps_emit_noop() {
    let steps = vec![step("x", "vendor-special", "Vendor", OtCategory::Formatting, OtSignal::Log)];
    let program = OtCompiler::default().compile(&steps);
    assert_eq!(program.statement_count(), 1);
    assert_eq!(program.sections[0].signal, OtSignal::Log);
    assert_eq!(program.sections[0].groups[0].statements[0].statement, "noop()");
    assert!(!program.is_placeholder());
}

/// Tests the configurable error mode and a caller-registered rule.
#[test]
fn test_error_mode_and_custom_rules() {
    let mut rules = OtRuleTable::builtin().clone();
    rules.register_category(OtSignal::Metric, OtCategory::Formatting, |_| {
        OtRuleOutput::new(OtStatementContext::Datapoint, "noop()")
    });
    let config = OtCompilerConfig { error_mode: OtErrorMode::Propagate, ..Default::default() };
    let compiler = OtCompiler::new(config).with_rules(rules);

    let steps = vec![step("f", "format-strings", "Format", OtCategory::Formatting, OtSignal::Metric)];
    let program = compiler.compile(&steps);
    assert_eq!(program.sections[0].groups[0].context, OtStatementContext::Datapoint);
    assert!(program.render().contains("  error_mode: propagate\n"));
}

/// Tests that a hash quick action with a configured field renders that field.
#[test]
fn test_quick_action_statement_uses_field() {
    let step = OtStep::builder(catalog::MASK_FIELD, "Mask user.name", OtCategory::Privacy)
        .config(OtStepConfig::Field { field: "user.name".into() })
        .build()
        .unwrap();
    let text = OtCompiler::default().compile_text(&[step]);
    assert!(text.contains(r#"        - set(span.attributes["user.name"], "********")"#));
}
