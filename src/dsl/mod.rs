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

//! # OTTL Generation Module
//!
//! Turns an ordered step list into an OpenTelemetry Transformation Language
//! program for the collector's `transform` processor, and checks statements
//! for signal compatibility.
//!
//! ## Architecture
//!
//! - **Context** ([context.rs](context/index.html)): statement contexts and
//!   their canonical order per signal
//! - **Rules** ([rules.rs](rules/index.html)): the tiered step-to-statement
//!   lookup table
//! - **Compiler** ([compiler.rs](compiler/index.html)): grouping, ordering and
//!   rendering of the program text
//! - **Validate** ([validate.rs](validate/index.html)): function and path
//!   compatibility checks
//!
//! ## Output
//!
//! ```text
//! transform:
//!   error_mode: ignore
//!   trace_statements:
//!     - context: span
//!       statements:
//!         # Mask Passwords
//!         - replace_pattern(span.attributes["process.command_line"], ...)
//! ```

pub mod context;
pub mod rules;
pub mod compiler;
pub mod validate;

pub use context::OtStatementContext;
pub use rules::{OtRuleOutput, OtRuleTable, OtRuleTier, NOOP_STATEMENT};
pub use compiler::{
    OtCompiledProgram, OtCompiledStatement, OtCompiler, OtContextGroup, OtSignalSection,
    OtSourceIdentity,
};
pub use validate::{
    compatibility_label, infer_signal, validate_program, validate_statement, OtValidationReport,
};
