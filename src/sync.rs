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

//! # Program Sync Module
//!
//! Tracks whether the displayed program text is compiler output or a
//! hand-edited override.
//!
//! - `Synced` (initial): [`OtProgramSync::refresh`] replaces the text.
//! - `save_custom` pins hand-edited text and moves to `Custom`.
//! - `Custom`: `refresh` keeps the pinned text and stashes the compiled one.
//! - `revert` drops the pinned text and returns to `Synced`.

use serde::{Deserialize, Serialize};

use crate::dsl::validate::{validate_program, OtValidationReport};
use crate::errors::Result;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtSyncState {
    #[default]
    Synced,
    Custom,
}

/// Holder of the authoritative program text for one session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtProgramSync {
    state: OtSyncState,
    compiled: String,
    custom: Option<String>,
}

impl OtProgramSync {
    pub fn new(compiled: impl Into<String>) -> Self {
        Self {
            state: OtSyncState::Synced,
            compiled: compiled.into(),
            custom: None,
        }
    }

    pub fn state(&self) -> OtSyncState {
        self.state
    }

    pub fn is_custom(&self) -> bool {
        self.state == OtSyncState::Custom
    }

    /// Latest compiler output, whatever the state.
    pub fn compiled_text(&self) -> &str {
        &self.compiled
    }

    /// Records fresh compiler output.
    ///
    /// While custom the pinned text stays authoritative; the compiled text is
    /// only kept for a later revert.
    pub fn refresh(&mut self, compiled: impl Into<String>) {
        self.compiled = compiled.into();
        if self.is_custom() {
            log::debug!("program is custom; recompiled text held for revert");
        }
    }

    /// Pins hand-edited text and returns its advisory compatibility report.
    ///
    /// Empty text is rejected and leaves the state untouched. Incompatible
    /// statements do not block the save.
    pub fn save_custom(&mut self, text: impl Into<String>) -> Result<OtValidationReport> {
        let text = text.into();
        let report = validate_program(&text)?;
        if !report.valid {
            log::warn!(
                "custom program saved with {} compatibility issue(s)",
                report.errors.len()
            );
        }
        self.custom = Some(text);
        if self.state != OtSyncState::Custom {
            log::info!("program sync: synced -> custom");
        }
        self.state = OtSyncState::Custom;
        Ok(report)
    }

    /// Drops the custom text and returns to the compiled program.
    pub fn revert(&mut self) -> &str {
        if self.custom.take().is_some() {
            log::info!("program sync: custom -> synced");
        }
        self.state = OtSyncState::Synced;
        &self.compiled
    }

    /// The text that should be exported or copied.
    pub fn export_text(&self) -> &str {
        match (&self.state, &self.custom) {
            (OtSyncState::Custom, Some(custom)) => custom,
            _ => &self.compiled,
        }
    }
}
