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

//! # Step Model
//!
//! A step is one configured unit of pipeline behaviour ("mask this field",
//! "convert this metric"). Steps form an ordered list owned by the caller;
//! order is significant because it fixes statement order inside each
//! generated context group.
//!
//! ## Identity
//!
//! Every step carries two identifiers:
//!
//! - `id`: unique per step instance, used for toggling and reordering
//! - `step_type`: a stable kebab-case identifier (`mask-passwords`,
//!   `convert-metric-type`, ...) used to select the statement rule and the
//!   simulated preview effect
//!
//! The `title` is presentation only. Statement generation never looks at it.
//!
//! ## Configuration
//!
//! [`OtStepConfig`] is a tagged variant. The built-in catalog declares which
//! shapes each step type accepts, and [`OtStepBuilder::build`] rejects a step
//! whose configuration does not fit.
//!
//! ```rust
//! use otx::step::{OtCategory, OtSignal, OtStep, OtStepConfig};
//!
//! let step = OtStep::builder("hash-field", "Hash user.id", OtCategory::Privacy)
//!     .signal(OtSignal::Log)
//!     .config(OtStepConfig::Field { field: "user.id".into() })
//!     .build()
//!     .unwrap();
//! assert!(step.enabled);
//! ```

pub mod catalog;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dsl::context::OtStatementContext;
use crate::errors::{OtError, Result};

pub use catalog::{OtStepDefinition, OtTemplate};

/// Telemetry signal a step targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtSignal {
    #[default]
    Trace,
    Metric,
    Log,
}

impl OtSignal {
    /// Section order of generated programs.
    pub const ALL: [OtSignal; 3] = [OtSignal::Trace, OtSignal::Metric, OtSignal::Log];

    pub fn as_str(&self) -> &'static str {
        match self {
            OtSignal::Trace => "trace",
            OtSignal::Metric => "metric",
            OtSignal::Log => "log",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(OtSignal::Trace),
            "metric" => Some(OtSignal::Metric),
            "log" => Some(OtSignal::Log),
            _ => None,
        }
    }
}

impl fmt::Display for OtSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtCategory {
    Attribute,
    Parsing,
    Privacy,
    Filtering,
    Deletion,
    Metric,
    Formatting,
    Advanced,
}

impl OtCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtCategory::Attribute => "attribute",
            OtCategory::Parsing => "parsing",
            OtCategory::Privacy => "privacy",
            OtCategory::Filtering => "filtering",
            OtCategory::Deletion => "deletion",
            OtCategory::Metric => "metric",
            OtCategory::Formatting => "formatting",
            OtCategory::Advanced => "advanced",
        }
    }
}

impl fmt::Display for OtCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable step-type identifier used as the statement dispatch key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OtStepType(String);

impl OtStepType {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn definition(&self) -> Option<&'static OtStepDefinition> {
        catalog::definition(&self.0)
    }
}

impl From<&str> for OtStepType {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for OtStepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shape tag of an [`OtStepConfig`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OtConfigShape {
    None,
    Field,
    Hash,
    Detected,
    Statement,
}

fn default_algorithm() -> String {
    "sha256".to_string()
}

/// Per-step-type parameters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OtStepConfig {
    #[default]
    None,
    /// A single attribute path.
    Field { field: String },
    /// Hash an attribute with the named algorithm.
    Hash {
        field: String,
        #[serde(default = "default_algorithm")]
        algorithm: String,
    },
    /// Emitted by auto-detection: the fields that triggered the rule.
    Detected { fields: Vec<String>, priority: u32 },
    /// A raw statement, optionally pinned to a context.
    Statement {
        statement: String,
        #[serde(default)]
        context: Option<OtStatementContext>,
    },
}

impl OtStepConfig {
    pub fn shape(&self) -> OtConfigShape {
        match self {
            OtStepConfig::None => OtConfigShape::None,
            OtStepConfig::Field { .. } => OtConfigShape::Field,
            OtStepConfig::Hash { .. } => OtConfigShape::Hash,
            OtStepConfig::Detected { .. } => OtConfigShape::Detected,
            OtStepConfig::Statement { .. } => OtConfigShape::Statement,
        }
    }

    /// Every attribute path this configuration points at, in order.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            OtStepConfig::Field { field } | OtStepConfig::Hash { field, .. } => vec![field.as_str()],
            OtStepConfig::Detected { fields, .. } => fields.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// The first attribute path this configuration points at, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            OtStepConfig::Field { field } | OtStepConfig::Hash { field, .. } => Some(field),
            OtStepConfig::Detected { fields, .. } => fields.first().map(String::as_str),
            _ => None,
        }
    }

    fn check(&self) -> Result<()> {
        match self {
            OtStepConfig::Field { field } | OtStepConfig::Hash { field, .. }
                if field.trim().is_empty() =>
            {
                Err(OtError::validation("step config requires a non-empty 'field'"))
            }
            OtStepConfig::Statement { statement, .. } if statement.trim().is_empty() => {
                Err(OtError::validation("step config requires a non-empty 'statement'"))
            }
            _ => Ok(()),
        }
    }
}

fn default_enabled() -> bool {
    true
}

/// One pipeline step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OtStep {
    pub id: String,
    pub step_type: OtStepType,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: OtCategory,
    #[serde(default)]
    pub signal: OtSignal,
    #[serde(default)]
    pub compatible_signals: Vec<OtSignal>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub config: OtStepConfig,
}

impl OtStep {
    pub fn builder(
        step_type: impl Into<OtStepType>,
        title: impl Into<String>,
        category: OtCategory,
    ) -> OtStepBuilder {
        OtStepBuilder::new(step_type.into(), title.into(), category)
    }

    /// Creates an enabled step from a catalog entry with an empty configuration.
    pub fn from_definition(def: &OtStepDefinition) -> Self {
        OtStep {
            id: new_step_id(def.step_type),
            step_type: OtStepType::new(def.step_type),
            title: def.name.to_string(),
            description: Some(def.description.to_string()),
            category: def.category,
            signal: def.signal,
            compatible_signals: def.compatible_signals.to_vec(),
            enabled: true,
            config: OtStepConfig::None,
        }
    }

    /// Checks the configuration against the step type's declared shapes.
    ///
    /// Steps of a type missing from the catalog accept any shape.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(OtError::validation("step id may not be empty"));
        }
        if self.step_type.as_str().trim().is_empty() {
            return Err(OtError::validation("step type may not be empty"));
        }
        self.config.check()?;
        if let Some(def) = self.step_type.definition() {
            let shape = self.config.shape();
            if !def.accepts.contains(&shape) {
                return Err(OtError::validation(format!(
                    "step type '{}' does not accept {:?} configuration",
                    def.step_type, shape
                )));
            }
        }
        Ok(())
    }

    pub fn is_compatible_with(&self, signal: OtSignal) -> bool {
        self.compatible_signals.is_empty() || self.compatible_signals.contains(&signal)
    }
}

/// Generates a fresh identifier of the form `<prefix>-<uuid>`.
pub fn new_step_id(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}

/// Validating constructor for [`OtStep`].
#[derive(Debug)]
pub struct OtStepBuilder {
    id: Option<String>,
    step_type: OtStepType,
    title: String,
    description: Option<String>,
    category: OtCategory,
    signal: Option<OtSignal>,
    compatible_signals: Option<Vec<OtSignal>>,
    enabled: bool,
    config: OtStepConfig,
}

impl OtStepBuilder {
    fn new(step_type: OtStepType, title: String, category: OtCategory) -> Self {
        Self {
            id: None,
            step_type,
            title,
            description: None,
            category,
            signal: None,
            compatible_signals: None,
            enabled: true,
            config: OtStepConfig::None,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn signal(mut self, signal: OtSignal) -> Self {
        self.signal = Some(signal);
        self
    }

    pub fn compatible_signals(mut self, signals: Vec<OtSignal>) -> Self {
        self.compatible_signals = Some(signals);
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn config(mut self, config: OtStepConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<OtStep> {
        let def = self.step_type.definition();
        let signal = self
            .signal
            .or_else(|| def.map(|d| d.signal))
            .unwrap_or_default();
        let compatible_signals = self
            .compatible_signals
            .or_else(|| def.map(|d| d.compatible_signals.to_vec()))
            .unwrap_or_else(|| vec![signal]);
        let id = self
            .id
            .unwrap_or_else(|| new_step_id(self.step_type.as_str()));

        let step = OtStep {
            id,
            step_type: self.step_type,
            title: self.title,
            description: self.description,
            category: self.category,
            signal,
            compatible_signals,
            enabled: self.enabled,
            config: self.config,
        };
        step.validate()?;
        Ok(step)
    }
}
