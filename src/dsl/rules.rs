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

//! Statement rules.
//!
//! A rule turns one step into a context and its statements, one per target
//! field. Lookup goes through three tiers: the step type, then the category,
//! then a `noop()` in the signal's primary context. Every enabled step
//! therefore yields at least one statement.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::dsl::context::OtStatementContext;
use crate::step::catalog;
use crate::step::{OtCategory, OtSignal, OtStep, OtStepConfig};

pub const NOOP_STATEMENT: &str = "noop()";

/// Output of a rule. `statements` is never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OtRuleOutput {
    pub context: OtStatementContext,
    pub statements: Vec<String>,
}

impl OtRuleOutput {
    pub fn new(context: OtStatementContext, statement: impl Into<String>) -> Self {
        Self {
            context,
            statements: vec![statement.into()],
        }
    }

    /// Several statements in one context; an empty list becomes `noop()`.
    pub fn many(context: OtStatementContext, statements: Vec<String>) -> Self {
        if statements.is_empty() {
            return Self::new(context, NOOP_STATEMENT);
        }
        Self { context, statements }
    }
}

/// Which lookup tier produced a statement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OtRuleTier {
    StepType,
    Category,
    Fallback,
}

pub type OtRule = Arc<dyn Fn(&OtStep) -> OtRuleOutput + Send + Sync>;

/// Extensible rule registry keyed by `(signal, step type)` and
/// `(signal, category)`.
#[derive(Clone, Default)]
pub struct OtRuleTable {
    by_type: HashMap<(OtSignal, String), OtRule>,
    by_category: HashMap<(OtSignal, OtCategory), OtRule>,
}

impl fmt::Debug for OtRuleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OtRuleTable")
            .field("by_type", &self.by_type.len())
            .field("by_category", &self.by_category.len())
            .finish()
    }
}

impl OtRuleTable {
    /// An empty table. Every step resolves to the fallback tier.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Shared table of the built-in rules.
    pub fn builtin() -> &'static OtRuleTable {
        static BUILTIN: OnceLock<OtRuleTable> = OnceLock::new();
        BUILTIN.get_or_init(builtin_rules)
    }

    pub fn register_step_type<F>(&mut self, signal: OtSignal, step_type: &str, rule: F) -> &mut Self
    where
        F: Fn(&OtStep) -> OtRuleOutput + Send + Sync + 'static,
    {
        self.by_type
            .insert((signal, step_type.to_string()), Arc::new(rule));
        self
    }

    pub fn register_category<F>(&mut self, signal: OtSignal, category: OtCategory, rule: F) -> &mut Self
    where
        F: Fn(&OtStep) -> OtRuleOutput + Send + Sync + 'static,
    {
        self.by_category.insert((signal, category), Arc::new(rule));
        self
    }

    pub fn has_step_type(&self, signal: OtSignal, step_type: &str) -> bool {
        self.by_type
            .contains_key(&(signal, step_type.to_string()))
    }

    /// Resolves a step through the three tiers.
    pub fn resolve(&self, step: &OtStep) -> (OtRuleOutput, OtRuleTier) {
        let signal = step.signal;
        if let Some(rule) = self
            .by_type
            .get(&(signal, step.step_type.as_str().to_string()))
        {
            return (rule(step), OtRuleTier::StepType);
        }
        if let Some(rule) = self.by_category.get(&(signal, step.category)) {
            return (rule(step), OtRuleTier::Category);
        }
        (
            OtRuleOutput::new(OtStatementContext::primary(signal), NOOP_STATEMENT),
            OtRuleTier::Fallback,
        )
    }
}

/// Escapes `value` for use inside an OTTL string literal on one YAML line.
fn quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// `span.attributes["user.email"]` and friends.
fn attribute(context: OtStatementContext, field: &str) -> String {
    format!("{}.attributes[\"{}\"]", context.as_str(), quoted(field))
}

/// Configured target fields, or `default` when the step names none.
fn fields_or<'a>(step: &'a OtStep, default: &'a str) -> Vec<&'a str> {
    let fields = step.config.fields();
    if fields.is_empty() {
        vec![default]
    } else {
        fields
    }
}

/// One statement per target field.
fn per_field(
    step: &OtStep,
    context: OtStatementContext,
    default: &str,
    render: impl Fn(&str) -> String,
) -> OtRuleOutput {
    OtRuleOutput::many(
        context,
        fields_or(step, default).into_iter().map(render).collect(),
    )
}

fn hash_function(step: &OtStep) -> &'static str {
    match &step.config {
        OtStepConfig::Hash { algorithm, .. } => match algorithm.to_ascii_lowercase().as_str() {
            "sha1" => "sha1",
            "md5" => "md5",
            _ => "sha256",
        },
        _ => "sha256",
    }
}

fn mask_field(context: OtStatementContext) -> impl Fn(&OtStep) -> OtRuleOutput + Send + Sync {
    move |step| {
        per_field(step, context, "value", |field| {
            format!("set({}, \"********\")", attribute(context, field))
        })
    }
}

fn hash_field(context: OtStatementContext) -> impl Fn(&OtStep) -> OtRuleOutput + Send + Sync {
    move |step| {
        let function = hash_function(step);
        per_field(step, context, "value", |field| {
            let target = attribute(context, field);
            format!("set({target}, {function}({target}))")
        })
    }
}

fn drop_field(context: OtStatementContext) -> impl Fn(&OtStep) -> OtRuleOutput + Send + Sync {
    move |step| {
        per_field(step, context, "value", |field| {
            format!("delete_key({}.attributes, \"{}\")", context.as_str(), quoted(field))
        })
    }
}

fn custom_statement(signal: OtSignal) -> impl Fn(&OtStep) -> OtRuleOutput + Send + Sync {
    move |step| match &step.config {
        OtStepConfig::Statement { statement, context } => OtRuleOutput::new(
            context.unwrap_or_else(|| OtStatementContext::primary(signal)),
            statement.trim(),
        ),
        _ => OtRuleOutput::new(OtStatementContext::primary(signal), NOOP_STATEMENT),
    }
}

fn builtin_rules() -> OtRuleTable {
    use OtStatementContext as Ctx;

    let mut table = OtRuleTable::empty();

    // trace
    table
        .register_step_type(OtSignal::Trace, catalog::MASK_PASSWORDS, |step| {
            per_field(step, Ctx::Span, "process.command_line", |field| {
                let target = attribute(Ctx::Span, field);
                format!(r#"replace_pattern({target}, "password=([^\s]+)", "password=********")"#)
            })
        })
        .register_step_type(OtSignal::Trace, catalog::HASH_EMAILS, |step| {
            per_field(step, Ctx::Span, "user.email", |field| {
                let target = attribute(Ctx::Span, field);
                format!("set({target}, sha256({target}))")
            })
        })
        .register_step_type(OtSignal::Trace, catalog::SAMPLE_HIGH_VOLUME, |_| {
            OtRuleOutput::new(
                Ctx::Span,
                r#"set(span.attributes["telemetry.sample.keep"], true) where span.attributes["service.name"] in ["health-check", "cron"]"#,
            )
        })
        .register_step_type(OtSignal::Trace, catalog::MASK_FIELD, mask_field(Ctx::Span))
        .register_step_type(OtSignal::Trace, catalog::HASH_FIELD, hash_field(Ctx::Span))
        .register_step_type(OtSignal::Trace, catalog::DROP_FIELD, drop_field(Ctx::Span))
        .register_step_type(OtSignal::Trace, catalog::DROP_K8S_METADATA, |_| {
            OtRuleOutput::new(
                Ctx::Resource,
                r#"delete_matching_keys(resource.attributes, "(?i).*(annotation|label|template).*")"#,
            )
        })
        .register_step_type(OtSignal::Trace, catalog::TRUNCATE_LARGE_VALUES, |_| {
            OtRuleOutput::new(Ctx::Span, "truncate_all(span.attributes, 500)")
        })
        .register_step_type(OtSignal::Trace, catalog::CUSTOM_OTTL, custom_statement(OtSignal::Trace))
        .register_category(OtSignal::Trace, OtCategory::Privacy, |_| {
            OtRuleOutput::new(
                Ctx::Span,
                r#"replace_pattern(span.attributes["user.password"], "(?i)(password=)([^&\"\s]+)", "$${1}********")"#,
            )
        })
        .register_category(OtSignal::Trace, OtCategory::Filtering, |_| {
            OtRuleOutput::new(
                Ctx::Span,
                r#"keep_keys(span.attributes, ["service.name", "telemetry.priority"])"#,
            )
        });

    // metric
    table
        .register_step_type(OtSignal::Metric, catalog::CONVERT_METRIC_TYPE, |_| {
            OtRuleOutput::new(
                Ctx::Metric,
                r#"convert_gauge_to_sum("cumulative", false) where metric.type == "Gauge""#,
            )
        })
        .register_step_type(OtSignal::Metric, catalog::SET_METRIC_METADATA, |_| {
            OtRuleOutput::new(Ctx::Metric, r#"set(metric.description, "Updated description")"#)
        })
        .register_step_type(OtSignal::Metric, catalog::DATAPOINT_OPERATIONS, |_| {
            OtRuleOutput::new(Ctx::Metric, "scale_metric(1.0)")
        })
        .register_step_type(OtSignal::Metric, catalog::SCALE_VALUES, |_| {
            OtRuleOutput::new(Ctx::Metric, r#"scale_metric(0.1, "kWh")"#)
        })
        .register_step_type(OtSignal::Metric, catalog::MASK_FIELD, mask_field(Ctx::Datapoint))
        .register_step_type(OtSignal::Metric, catalog::HASH_FIELD, hash_field(Ctx::Datapoint))
        .register_step_type(OtSignal::Metric, catalog::DROP_FIELD, drop_field(Ctx::Datapoint))
        .register_step_type(OtSignal::Metric, catalog::CUSTOM_OTTL, custom_statement(OtSignal::Metric));

    // log
    table
        .register_step_type(OtSignal::Log, catalog::MASK_PASSWORDS, |step| {
            let render = |target: String| {
                format!(r#"replace_pattern({target}, "(?i)(password=)([^&\"\s]+)", "$${{1}}********")"#)
            };
            let fields = step.config.fields();
            if fields.is_empty() {
                return OtRuleOutput::new(Ctx::Log, render("log.body".to_string()));
            }
            OtRuleOutput::many(
                Ctx::Log,
                fields.into_iter().map(|field| render(attribute(Ctx::Log, field))).collect(),
            )
        })
        .register_step_type(OtSignal::Log, catalog::HASH_EMAILS, |step| {
            per_field(step, Ctx::Log, "user.email", |field| {
                let target = attribute(Ctx::Log, field);
                format!("set({target}, sha256({target}))")
            })
        })
        .register_step_type(OtSignal::Log, catalog::MASK_FIELD, mask_field(Ctx::Log))
        .register_step_type(OtSignal::Log, catalog::HASH_FIELD, hash_field(Ctx::Log))
        .register_step_type(OtSignal::Log, catalog::DROP_FIELD, drop_field(Ctx::Log))
        .register_step_type(OtSignal::Log, catalog::CUSTOM_OTTL, custom_statement(OtSignal::Log))
        .register_category(OtSignal::Log, OtCategory::Privacy, |_| {
            OtRuleOutput::new(
                Ctx::Log,
                r#"replace_pattern(log.body, "(?i)(token=)([^&\"\s]+)", "$${1}********")"#,
            )
        })
        .register_category(OtSignal::Log, OtCategory::Filtering, |_| {
            OtRuleOutput::new(
                Ctx::Log,
                r#"set(log.severity_text, "INFO") where log.severity_number < 9"#,
            )
        });

    table
}
