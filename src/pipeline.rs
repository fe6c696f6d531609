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

//! # Pipeline Module
//!
//! The ordered, individually toggleable step list. Every mutation is an
//! explicit call; nothing recompiles on its own, so callers recompute after
//! each accepted change.
//!
//! ```rust
//! use otx::pipeline::{OtPipeline, OtQuickAction};
//! use otx::step::{catalog, OtSignal};
//!
//! let mut pipeline = OtPipeline::new();
//! pipeline.add_from_catalog(catalog::MASK_PASSWORDS, None).unwrap();
//! pipeline.add_quick_action(OtQuickAction::Hash, "user.id", OtSignal::Log).unwrap();
//! assert_eq!(pipeline.enabled_count(), 2);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{OtError, Result};
use crate::step::catalog;
use crate::step::{OtCategory, OtConfigShape, OtSignal, OtStep, OtStepConfig};

/// One-click actions raised from a diff entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtQuickAction {
    Mask,
    Hash,
    Drop,
}

impl OtQuickAction {
    fn step_type(&self) -> &'static str {
        match self {
            OtQuickAction::Mask => catalog::MASK_FIELD,
            OtQuickAction::Hash => catalog::HASH_FIELD,
            OtQuickAction::Drop => catalog::DROP_FIELD,
        }
    }

    fn category(&self) -> OtCategory {
        match self {
            OtQuickAction::Drop => OtCategory::Deletion,
            _ => OtCategory::Privacy,
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            OtQuickAction::Mask => "Mask",
            OtQuickAction::Hash => "Hash",
            OtQuickAction::Drop => "Drop",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OtPipeline {
    steps: Vec<OtStep>,
}

impl OtPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a pipeline from existing steps, validating each one.
    pub fn from_steps(steps: Vec<OtStep>) -> Result<Self> {
        let mut pipeline = Self::new();
        for step in steps {
            pipeline.add(step)?;
        }
        Ok(pipeline)
    }

    pub fn steps(&self) -> &[OtStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn enabled_count(&self) -> usize {
        self.steps.iter().filter(|s| s.enabled).count()
    }

    pub fn get(&self, id: &str) -> Option<&OtStep> {
        self.steps.iter().find(|s| s.id == id)
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.steps
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| OtError::validation(format!("unknown step id '{id}'")))
    }

    /// Appends a step; duplicate ids are rejected.
    pub fn add(&mut self, step: OtStep) -> Result<&OtStep> {
        step.validate()?;
        if self.get(&step.id).is_some() {
            return Err(OtError::validation(format!("duplicate step id '{}'", step.id)));
        }
        log::debug!("adding step '{}' ({})", step.id, step.step_type);
        self.steps.push(step);
        self.last()
    }

    fn last(&self) -> Result<&OtStep> {
        self.steps
            .last()
            .ok_or_else(|| OtError::internal("pipeline unexpectedly empty"))
    }

    /// Appends every step, stopping at the first invalid one.
    pub fn extend(&mut self, steps: impl IntoIterator<Item = OtStep>) -> Result<()> {
        for step in steps {
            self.add(step)?;
        }
        Ok(())
    }

    /// Adds an enabled step for a catalog type that needs no configuration.
    pub fn add_from_catalog(&mut self, step_type: &str, signal: Option<OtSignal>) -> Result<&OtStep> {
        let def = catalog::definition(step_type)
            .ok_or_else(|| OtError::validation(format!("unknown step type '{step_type}'")))?;
        if !def.accepts.contains(&OtConfigShape::None) {
            return Err(OtError::validation(format!(
                "step type '{step_type}' requires configuration"
            )));
        }
        let mut step = OtStep::from_definition(def);
        if let Some(signal) = signal {
            if !def.compatible_signals.contains(&signal) {
                return Err(OtError::validation(format!(
                    "step type '{step_type}' is not compatible with {signal}"
                )));
            }
            step.signal = signal;
        }
        self.add(step)
    }

    /// Adds every step of a template and returns the new ids.
    pub fn apply_template(&mut self, template_id: &str) -> Result<Vec<String>> {
        let template = catalog::template(template_id)
            .ok_or_else(|| OtError::validation(format!("unknown template '{template_id}'")))?;
        let mut ids = Vec::with_capacity(template.step_types.len());
        for step_type in template.step_types {
            ids.push(self.add_from_catalog(step_type, None)?.id.clone());
        }
        log::info!("applied template '{}' ({} step(s))", template.name, ids.len());
        Ok(ids)
    }

    /// Adds a mask, hash or drop step targeting one field.
    pub fn add_quick_action(&mut self, action: OtQuickAction, field: &str, signal: OtSignal) -> Result<&OtStep> {
        let field = field.trim();
        let config = match action {
            OtQuickAction::Hash => OtStepConfig::Hash {
                field: field.to_string(),
                algorithm: "sha256".to_string(),
            },
            _ => OtStepConfig::Field {
                field: field.to_string(),
            },
        };
        let step = OtStep::builder(action.step_type(), format!("{} {}", action.verb(), field), action.category())
            .signal(signal)
            .config(config)
            .build()?;
        self.add(step)
    }

    pub fn remove(&mut self, id: &str) -> Result<OtStep> {
        let index = self.position(id)?;
        Ok(self.steps.remove(index))
    }

    /// Moves the step at `from` so that it ends up at index `to`.
    pub fn move_step(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.steps.len();
        if from >= len || to >= len {
            return Err(OtError::validation(format!(
                "move {from} -> {to} out of range for {len} step(s)"
            )));
        }
        let step = self.steps.remove(from);
        self.steps.insert(to, step);
        Ok(())
    }

    /// Reorders to match `ids`, which must name every step exactly once.
    pub fn reorder_by_ids(&mut self, ids: &[&str]) -> Result<()> {
        if ids.len() != self.steps.len() {
            return Err(OtError::validation(format!(
                "reorder lists {} id(s) for {} step(s)",
                ids.len(),
                self.steps.len()
            )));
        }
        let mut indices = Vec::with_capacity(ids.len());
        for id in ids {
            let index = self.position(id)?;
            if indices.contains(&index) {
                return Err(OtError::validation(format!("repeated step id '{id}'")));
            }
            indices.push(index);
        }
        let mut slots: Vec<Option<OtStep>> = std::mem::take(&mut self.steps).into_iter().map(Some).collect();
        self.steps = indices
            .into_iter()
            .filter_map(|index| slots[index].take())
            .collect();
        Ok(())
    }

    /// Flips `enabled` and returns the new value.
    pub fn toggle(&mut self, id: &str) -> Result<bool> {
        let index = self.position(id)?;
        let step = &mut self.steps[index];
        step.enabled = !step.enabled;
        Ok(step.enabled)
    }

    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> Result<()> {
        let index = self.position(id)?;
        self.steps[index].enabled = enabled;
        Ok(())
    }
}
