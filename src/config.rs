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

//! # Otx Configuration Module
//!
//! Settings for the three configurable parts of the core: program rendering,
//! auto-detection thresholds and sample ingest. Every field has a default, so
//! a configuration file only needs to name what it changes.
//!
//! ## Formats
//!
//! Configuration is read from JSON or YAML. [`OtConfig::load`] picks the
//! decoder from the file extension and falls back to sniffing the content.
//!
//! ```yaml
//! compiler:
//!   error_mode: propagate
//! detect:
//!   large_value_chars: 1000
//! ingest:
//!   max_records: 100
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{OtError, Result};

/// How the transform processor reacts to statement errors at runtime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtErrorMode {
    #[default]
    Ignore,
    Silent,
    Propagate,
}

impl OtErrorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtErrorMode::Ignore => "ignore",
            OtErrorMode::Silent => "silent",
            OtErrorMode::Propagate => "propagate",
        }
    }
}

/// Rendering options for generated programs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OtCompilerConfig {
    pub error_mode: OtErrorMode,
    /// Emit the `# Generated OTTL configuration` / `# Source:` header.
    pub include_header: bool,
    /// Emit title/description comment lines above each statement.
    pub include_comments: bool,
}

impl Default for OtCompilerConfig {
    fn default() -> Self {
        Self {
            error_mode: OtErrorMode::Ignore,
            include_header: true,
            include_comments: true,
        }
    }
}

/// Thresholds used by the auto-detection rules.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OtDetectConfig {
    /// Unique-value ratio above which an attribute counts as high cardinality.
    pub cardinality_ratio: f64,
    /// Minimum distinct values before the cardinality ratio is considered.
    pub cardinality_min_distinct: usize,
    /// String length (in characters) above which a value is "large".
    pub large_value_chars: usize,
    /// Top-level attribute count above which a record is flagged.
    pub max_attributes: usize,
    /// Maximum number of fields quoted in a candidate description.
    pub description_fields: usize,
    /// Batch size above which detection logs a memory warning.
    pub batch_warning_records: usize,
}

impl Default for OtDetectConfig {
    fn default() -> Self {
        Self {
            cardinality_ratio: 0.9,
            cardinality_min_distinct: 10,
            large_value_chars: 500,
            max_attributes: 50,
            description_fields: 3,
            batch_warning_records: 250,
        }
    }
}

/// Limits applied while parsing uploaded samples.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OtIngestConfig {
    pub max_records: usize,
}

impl Default for OtIngestConfig {
    fn default() -> Self {
        Self { max_records: 250 }
    }
}

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OtConfig {
    pub compiler: OtCompilerConfig,
    pub detect: OtDetectConfig,
    pub ingest: OtIngestConfig,
}

impl OtConfig {
    pub fn from_json_str(source: &str) -> Result<Self> {
        let config: OtConfig = serde_json::from_str(source)
            .map_err(|e| OtError::config(format!("invalid JSON config: {e}")))?;
        config.check()
    }

    pub fn from_yaml_str(source: &str) -> Result<Self> {
        let config: OtConfig = serde_yaml::from_str(source)
            .map_err(|e| OtError::config(format!("invalid YAML config: {e}")))?;
        config.check()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "json" => Self::from_json_str(&content),
            "yaml" | "yml" => Self::from_yaml_str(&content),
            _ => {
                let trimmed = content.trim_start();
                if trimmed.starts_with('{') {
                    Self::from_json_str(&content)
                } else {
                    Self::from_yaml_str(&content)
                }
            }
        }
    }

    fn check(self) -> Result<Self> {
        if !(0.0..=1.0).contains(&self.detect.cardinality_ratio) {
            return Err(OtError::config(
                "detect.cardinality_ratio must lie within [0, 1]",
            ));
        }
        if self.ingest.max_records == 0 {
            return Err(OtError::config("ingest.max_records must be positive"));
        }
        Ok(self)
    }
}
