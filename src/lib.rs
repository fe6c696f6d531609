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

//! # Otx Core Library
//!
//! Otx builds OpenTelemetry Transformation Language (OTTL) programs from an
//! ordered list of pipeline steps and previews their effect on sample
//! telemetry before anything is deployed.
//!
//! ## Module Overview
//!
//! - **step**: the step model, step-type catalog and templates
//! - **dsl**: statement rules, the program compiler and signal compatibility
//!   checks
//! - **ingest**: sample parsing (JSON, NDJSON, `key=value`, OTLP/JSON)
//! - **preview**: simulated step effects on sample records
//! - **inspect**: field-level diff and heuristic issue detection
//! - **sync**: synced/custom state of the displayed program text
//! - **pipeline**: the ordered, toggleable step list
//! - **workspace**: a session bundling all of the above
//! - **record**, **config**, **errors**: shared data, settings and errors
//!
//! ## Feature Flags
//!
//! - `parallel`: evaluates detection rules on a Rayon pool
//! - `full`: enables all features
//!
//! ## Quick Start
//!
//! ```rust
//! use otx::{OtCompiler, OtPipeline};
//! use otx::step::catalog;
//!
//! let mut pipeline = OtPipeline::new();
//! pipeline.add_from_catalog(catalog::MASK_PASSWORDS, None).unwrap();
//!
//! let text = OtCompiler::default().compile_text(pipeline.steps());
//! assert!(text.contains("trace_statements:"));
//! ```
//!
//! ## Error Handling
//!
//! Compilation, validation, preview and detection never fail. Fallible
//! operations (configuration, step construction, batch ingest, custom program
//! save, pipeline edits on unknown ids) return `Result<T, OtError>`.

pub mod errors;
pub mod config;
pub mod record;
pub mod step;
pub mod dsl;
pub mod ingest;
pub mod preview;
pub mod inspect;
pub mod sync;
pub mod pipeline;
pub mod workspace;

mod pattern;

pub use errors::{OtError, Result};
pub use config::{OtCompilerConfig, OtConfig, OtDetectConfig, OtErrorMode, OtIngestConfig};
pub use record::{OtFieldPath, OtRecord, OtRecordBatch};
pub use step::{
    OtCategory, OtConfigShape, OtSignal, OtStep, OtStepBuilder, OtStepConfig, OtStepDefinition,
    OtStepType, OtTemplate,
};
pub use dsl::{
    compatibility_label, infer_signal, validate_program, validate_statement, OtCompiledProgram,
    OtCompiledStatement, OtCompiler, OtContextGroup, OtRuleTable, OtSignalSection,
    OtSourceIdentity, OtStatementContext, OtValidationReport,
};
pub use ingest::OtSampleReader;
pub use preview::OtSampleTransformer;
pub use inspect::{
    OtDetectionSummary, OtDetector, OtDiffEntry, OtDiffStatus, OtDiffSummary, OtDiffer,
};
pub use sync::{OtProgramSync, OtSyncState};
pub use pipeline::{OtPipeline, OtQuickAction};
pub use workspace::{OtPreview, OtWorkspace};
