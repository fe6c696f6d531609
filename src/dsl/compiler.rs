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

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::{OtCompilerConfig, OtErrorMode};
use crate::dsl::context::OtStatementContext;
use crate::dsl::rules::{OtRuleTable, OtRuleTier, NOOP_STATEMENT};
use crate::step::{OtSignal, OtStep};

/// Name and environment of the telemetry source a program was built for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtSourceIdentity {
    pub name: String,
    pub environment: String,
}

impl OtSourceIdentity {
    pub fn new(name: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            environment: environment.into(),
        }
    }
}

/// One statement produced from one enabled step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OtCompiledStatement {
    pub signal: OtSignal,
    pub context: OtStatementContext,
    pub statement: String,
    /// Id of the source step, empty for the placeholder no-op.
    pub step_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OtContextGroup {
    pub context: OtStatementContext,
    pub statements: Vec<OtCompiledStatement>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OtSignalSection {
    pub signal: OtSignal,
    pub groups: Vec<OtContextGroup>,
}

/// Grouped program ready for rendering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OtCompiledProgram {
    pub error_mode: OtErrorMode,
    pub header: Vec<String>,
    pub include_comments: bool,
    pub sections: Vec<OtSignalSection>,
}

impl OtCompiledProgram {
    pub fn statement_count(&self) -> usize {
        self.statements().count()
    }

    pub fn statements(&self) -> impl Iterator<Item = &OtCompiledStatement> {
        self.sections
            .iter()
            .flat_map(|section| section.groups.iter())
            .flat_map(|group| group.statements.iter())
    }

    pub fn section(&self, signal: OtSignal) -> Option<&OtSignalSection> {
        self.sections.iter().find(|s| s.signal == signal)
    }

    /// True when the program is the placeholder emitted for an empty pipeline.
    pub fn is_placeholder(&self) -> bool {
        let mut statements = self.statements();
        matches!(
            (statements.next(), statements.next()),
            (Some(only), None) if only.step_id.is_empty() && only.statement == NOOP_STATEMENT
        )
    }

    pub fn render(&self) -> String {
        let mut lines: Vec<String> = self.header.iter().map(|h| format!("# {h}")).collect();
        lines.push("transform:".to_string());
        lines.push(format!("  error_mode: {}", self.error_mode.as_str()));

        for section in &self.sections {
            lines.push(format!("  {}_statements:", section.signal.as_str()));
            for group in &section.groups {
                lines.push(format!("    - context: {}", group.context.as_str()));
                lines.push("      statements:".to_string());
                for statement in &group.statements {
                    if self.include_comments {
                        for text in [&statement.title, &statement.description].into_iter().flatten() {
                            for line in text.lines().filter(|l| !l.trim().is_empty()) {
                                lines.push(format!("        # {}", line.trim()));
                            }
                        }
                    }
                    lines.push(format!("        - {}", statement.statement));
                }
            }
        }

        lines.join("\n")
    }
}

impl fmt::Display for OtCompiledProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Compiles an ordered step list into a grouped program.
#[derive(Clone, Debug)]
pub struct OtCompiler {
    config: OtCompilerConfig,
    source: Option<OtSourceIdentity>,
    rules: OtRuleTable,
}

impl Default for OtCompiler {
    fn default() -> Self {
        Self::new(OtCompilerConfig::default())
    }
}

impl OtCompiler {
    pub fn new(config: OtCompilerConfig) -> Self {
        Self {
            config,
            source: None,
            rules: OtRuleTable::builtin().clone(),
        }
    }

    pub fn with_source(mut self, source: Option<OtSourceIdentity>) -> Self {
        self.source = source;
        self
    }

    pub fn with_rules(mut self, rules: OtRuleTable) -> Self {
        self.rules = rules;
        self
    }

    pub fn set_source(&mut self, source: Option<OtSourceIdentity>) {
        self.source = source;
    }

    pub fn rules_mut(&mut self) -> &mut OtRuleTable {
        &mut self.rules
    }

    pub fn config(&self) -> &OtCompilerConfig {
        &self.config
    }

    pub fn compile(&self, steps: &[OtStep]) -> OtCompiledProgram {
        let mut grouped: IndexMap<OtSignal, IndexMap<OtStatementContext, Vec<OtCompiledStatement>>> =
            IndexMap::new();
        let mut fallbacks = 0usize;

        for step in steps.iter().filter(|s| s.enabled) {
            let (output, tier) = self.rules.resolve(step);
            if tier == OtRuleTier::Fallback {
                fallbacks += 1;
            }
            let group = grouped
                .entry(step.signal)
                .or_default()
                .entry(output.context)
                .or_default();
            for (index, statement) in output.statements.iter().enumerate() {
                // Comments go above the first statement of a step only.
                let first = index == 0;
                group.push(OtCompiledStatement {
                    signal: step.signal,
                    context: output.context,
                    statement: single_line(statement),
                    step_id: step.id.clone(),
                    title: Some(step.title.clone()).filter(|t| first && !t.trim().is_empty()),
                    description: step.description.clone().filter(|d| first && !d.trim().is_empty()),
                });
            }
        }

        let mut sections = Vec::new();
        for signal in OtSignal::ALL {
            let Some(mut contexts) = grouped.swap_remove(&signal) else {
                continue;
            };
            let mut groups = Vec::with_capacity(contexts.len());
            for context in OtStatementContext::canonical_order(signal) {
                if let Some(statements) = contexts.shift_remove(context) {
                    groups.push(OtContextGroup { context: *context, statements });
                }
            }
            groups.extend(
                contexts
                    .into_iter()
                    .map(|(context, statements)| OtContextGroup { context, statements }),
            );
            sections.push(OtSignalSection { signal, groups });
        }

        if sections.is_empty() {
            sections.push(placeholder_section());
        }

        let program = OtCompiledProgram {
            error_mode: self.config.error_mode,
            header: self.header(),
            include_comments: self.config.include_comments,
            sections,
        };
        log::debug!(
            "compiled {} statement(s) in {} section(s), {} via no-op fallback",
            program.statement_count(),
            program.sections.len(),
            fallbacks
        );
        program
    }

    /// Compiles and renders in one call.
    pub fn compile_text(&self, steps: &[OtStep]) -> String {
        self.compile(steps).render()
    }

    fn header(&self) -> Vec<String> {
        if !self.config.include_header {
            return Vec::new();
        }
        let source = match &self.source {
            Some(source) => format!("Source: {} ({})", source.name, source.environment),
            None => "Source: Active telemetry selection".to_string(),
        };
        vec!["Generated OTTL configuration".to_string(), source]
    }
}

/// Joins the trimmed lines of `statement` with single spaces so it renders
/// as one YAML list item.
fn single_line(statement: &str) -> String {
    statement
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn placeholder_section() -> OtSignalSection {
    let signal = OtSignal::default();
    let context = OtStatementContext::primary(signal);
    OtSignalSection {
        signal,
        groups: vec![OtContextGroup {
            context,
            statements: vec![OtCompiledStatement {
                signal,
                context,
                statement: NOOP_STATEMENT.to_string(),
                step_id: String::new(),
                title: None,
                description: None,
            }],
        }],
    }
}
