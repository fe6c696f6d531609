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

use serde::{Deserialize, Serialize};

use crate::step::OtSignal;

/// Sub-scope a statement applies to within a signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtStatementContext {
    Span,
    Spanevent,
    Resource,
    Scope,
    Metric,
    Datapoint,
    Log,
}

const TRACE_ORDER: &[OtStatementContext] = &[
    OtStatementContext::Span,
    OtStatementContext::Spanevent,
    OtStatementContext::Scope,
    OtStatementContext::Resource,
];

const METRIC_ORDER: &[OtStatementContext] = &[
    OtStatementContext::Metric,
    OtStatementContext::Datapoint,
    OtStatementContext::Scope,
    OtStatementContext::Resource,
];

const LOG_ORDER: &[OtStatementContext] = &[
    OtStatementContext::Log,
    OtStatementContext::Scope,
    OtStatementContext::Resource,
];

impl OtStatementContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtStatementContext::Span => "span",
            OtStatementContext::Spanevent => "spanevent",
            OtStatementContext::Resource => "resource",
            OtStatementContext::Scope => "scope",
            OtStatementContext::Metric => "metric",
            OtStatementContext::Datapoint => "datapoint",
            OtStatementContext::Log => "log",
        }
    }

    /// Canonical group precedence inside a signal section.
    pub fn canonical_order(signal: OtSignal) -> &'static [OtStatementContext] {
        match signal {
            OtSignal::Trace => TRACE_ORDER,
            OtSignal::Metric => METRIC_ORDER,
            OtSignal::Log => LOG_ORDER,
        }
    }

    /// Context used for fallback statements and the empty program.
    pub fn primary(signal: OtSignal) -> OtStatementContext {
        match signal {
            OtSignal::Trace => OtStatementContext::Span,
            OtSignal::Metric => OtStatementContext::Metric,
            OtSignal::Log => OtStatementContext::Log,
        }
    }

    /// Position in the signal's canonical order, `None` when not canonical.
    pub fn rank(&self, signal: OtSignal) -> Option<usize> {
        Self::canonical_order(signal).iter().position(|c| c == self)
    }
}

impl fmt::Display for OtStatementContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
