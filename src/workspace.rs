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

//! # Workspace Module
//!
//! One editing session: configuration, the pipeline, the compiler, the sync
//! state and the loaded samples. The workspace never recompiles implicitly;
//! call [`OtWorkspace::recompute`] after mutating the pipeline.
//!
//! ```rust
//! use otx::workspace::OtWorkspace;
//! use otx::step::catalog;
//!
//! let mut workspace = OtWorkspace::default();
//! workspace.load_samples(r#"{"process.command_line": "app --password=x"}"#).unwrap();
//! workspace.pipeline_mut().add_from_catalog(catalog::MASK_PASSWORDS, None).unwrap();
//! workspace.recompute();
//! let preview = workspace.preview(0).unwrap();
//! assert_eq!(preview.summary.modified, 1);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::OtConfig;
use crate::dsl::compiler::{OtCompiledProgram, OtCompiler, OtSourceIdentity};
use crate::dsl::validate::{validate_statement, OtValidationReport};
use crate::errors::Result;
use crate::ingest::OtSampleReader;
use crate::inspect::detect::{OtDetectionSummary, OtDetector};
use crate::inspect::diff::{OtDiffEntry, OtDiffSummary, OtDiffer};
use crate::pipeline::OtPipeline;
use crate::preview::OtSampleTransformer;
use crate::record::{OtRecord, OtRecordBatch};
use crate::step::OtStep;
use crate::sync::{OtProgramSync, OtSyncState};

/// Before/after view of one sample.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OtPreview {
    pub index: usize,
    pub before: OtRecord,
    pub after: OtRecord,
    pub diff: Vec<OtDiffEntry>,
    pub summary: OtDiffSummary,
}

/// Compatibility problems of one compiled statement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtStatementIssue {
    pub step_id: String,
    pub statement: String,
    pub report: OtValidationReport,
}

#[derive(Debug)]
pub struct OtWorkspace {
    config: OtConfig,
    pipeline: OtPipeline,
    compiler: OtCompiler,
    sync: OtProgramSync,
    program: OtCompiledProgram,
    samples: OtRecordBatch,
}

impl Default for OtWorkspace {
    fn default() -> Self {
        Self::new(OtConfig::default())
    }
}

impl OtWorkspace {
    pub fn new(config: OtConfig) -> Self {
        let compiler = OtCompiler::new(config.compiler.clone());
        let program = compiler.compile(&[]);
        let sync = OtProgramSync::new(program.render());
        Self {
            config,
            pipeline: OtPipeline::new(),
            compiler,
            sync,
            program,
            samples: OtRecordBatch::new(),
        }
    }

    pub fn from_config_path(path: &Path) -> Result<Self> {
        Ok(Self::new(OtConfig::load(path)?))
    }

    pub fn config(&self) -> &OtConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &OtPipeline {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut OtPipeline {
        &mut self.pipeline
    }

    pub fn compiler_mut(&mut self) -> &mut OtCompiler {
        &mut self.compiler
    }

    /// Sets the source named in the program header. Takes effect on the next
    /// [`recompute`](Self::recompute).
    pub fn set_source(&mut self, source: Option<OtSourceIdentity>) {
        self.compiler.set_source(source);
    }

    /// Recompiles the pipeline and hands the text to the sync state.
    pub fn recompute(&mut self) -> &OtCompiledProgram {
        self.program = self.compiler.compile(self.pipeline.steps());
        self.sync.refresh(self.program.render());
        &self.program
    }

    pub fn program(&self) -> &OtCompiledProgram {
        &self.program
    }

    pub fn sync_state(&self) -> OtSyncState {
        self.sync.state()
    }

    pub fn save_custom(&mut self, text: impl Into<String>) -> Result<OtValidationReport> {
        self.sync.save_custom(text)
    }

    /// Discards custom text and returns the freshly compiled program.
    pub fn revert(&mut self) -> String {
        self.recompute();
        self.sync.revert().to_string()
    }

    /// The authoritative program text.
    pub fn export(&self) -> &str {
        self.sync.export_text()
    }

    /// Compiled statements whose functions or paths do not fit their signal.
    pub fn statement_issues(&self) -> Vec<OtStatementIssue> {
        self.program
            .statements()
            .filter_map(|compiled| {
                let report = validate_statement(&compiled.statement, compiled.signal);
                (!report.valid).then(|| OtStatementIssue {
                    step_id: compiled.step_id.clone(),
                    statement: compiled.statement.clone(),
                    report,
                })
            })
            .collect()
    }

    /// Replaces the samples; fails when the text yields no records.
    pub fn load_samples(&mut self, text: &str) -> Result<usize> {
        let reader = OtSampleReader::new().with_config(self.config.ingest.clone());
        self.samples = reader.parse_batch(text)?;
        Ok(self.samples.len())
    }

    pub fn set_samples(&mut self, samples: OtRecordBatch) {
        self.samples = samples;
    }

    pub fn samples(&self) -> &[OtRecord] {
        &self.samples
    }

    /// Simulates the pipeline on sample `index` and diffs the result.
    pub fn preview(&self, index: usize) -> Option<OtPreview> {
        let before = self.samples.get(index)?;
        let after = OtSampleTransformer::new().apply(before, self.pipeline.steps());
        let diff = OtDiffer::new().diff(Some(before), Some(&after));
        let summary = OtDiffSummary::from_entries(&diff);
        Some(OtPreview {
            index,
            before: before.clone(),
            after,
            diff,
            summary,
        })
    }

    fn detector(&self) -> OtDetector {
        OtDetector::new().with_config(self.config.detect.clone())
    }

    /// Candidate steps for the loaded samples that the pipeline lacks.
    pub fn detect(&self) -> Vec<OtStep> {
        self.detector().detect(&self.samples, self.pipeline.steps())
    }

    pub fn detection_summary(&self) -> OtDetectionSummary {
        self.detector().summary(&self.samples)
    }
}
