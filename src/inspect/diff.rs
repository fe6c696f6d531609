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

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::record::OtRecord;

/// Classification of one flattened path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtDiffStatus {
    Modified,
    Added,
    Removed,
    Unchanged,
}

impl OtDiffStatus {
    /// Default presentation rank, lower first.
    pub fn rank(&self) -> u8 {
        match self {
            OtDiffStatus::Modified => 0,
            OtDiffStatus::Added => 1,
            OtDiffStatus::Removed => 2,
            OtDiffStatus::Unchanged => 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OtDiffEntry {
    pub path: String,
    pub status: OtDiffStatus,
    /// The after value, or the before value for removed paths.
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_value: Option<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtDiffSummary {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub unchanged: usize,
}

impl OtDiffSummary {
    pub fn from_entries(entries: &[OtDiffEntry]) -> Self {
        let mut summary = Self::default();
        for entry in entries {
            match entry.status {
                OtDiffStatus::Added => summary.added += 1,
                OtDiffStatus::Removed => summary.removed += 1,
                OtDiffStatus::Modified => summary.modified += 1,
                OtDiffStatus::Unchanged => summary.unchanged += 1,
            }
        }
        summary
    }

    pub fn changed(&self) -> usize {
        self.added + self.removed + self.modified
    }
}

/// Flattens nested objects into dot-joined paths.
///
/// Arrays and primitives are leaves; empty objects contribute no paths.
pub fn flatten(record: &OtRecord) -> IndexMap<String, Value> {
    let mut out = IndexMap::new();
    flatten_into(&mut out, None, record);
    out
}

fn flatten_into(out: &mut IndexMap<String, Value>, prefix: Option<&str>, object: &Map<String, Value>) {
    for (key, value) in object {
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) => flatten_into(out, Some(&path), nested),
            leaf => {
                out.insert(path, leaf.clone());
            }
        }
    }
}

/// Compares leaves by their serialized text, so key order inside objects
/// nested in arrays counts as a change.
fn same_text(a: &Value, b: &Value) -> bool {
    a == b && serde_json::to_string(a).ok() == serde_json::to_string(b).ok()
}

/// Field-level differ for a pair of records.
#[derive(Clone, Debug, Default)]
pub struct OtDiffer {
    ignore_fields: HashSet<String>,
}

impl OtDiffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Excludes a flattened path from the result.
    pub fn ignore_field(mut self, path: &str) -> Self {
        self.ignore_fields.insert(path.to_string());
        self
    }

    /// Diffs `before` against `after`, either of which may be absent.
    ///
    /// Entries come out modified, added, removed, unchanged; within a status
    /// the order is before-record order followed by after-only paths.
    pub fn diff(&self, before: Option<&OtRecord>, after: Option<&OtRecord>) -> Vec<OtDiffEntry> {
        let before = before.map(flatten).unwrap_or_default();
        let mut after = after.map(flatten).unwrap_or_default();

        let mut entries = Vec::with_capacity(before.len().max(after.len()));
        for (path, previous) in before {
            let entry = match after.shift_remove(&path) {
                Some(current) if same_text(&current, &previous) => OtDiffEntry {
                    path,
                    status: OtDiffStatus::Unchanged,
                    value: current,
                    previous_value: None,
                },
                Some(current) => OtDiffEntry {
                    path,
                    status: OtDiffStatus::Modified,
                    value: current,
                    previous_value: Some(previous),
                },
                None => OtDiffEntry {
                    path,
                    status: OtDiffStatus::Removed,
                    value: previous,
                    previous_value: None,
                },
            };
            entries.push(entry);
        }
        entries.extend(after.into_iter().map(|(path, value)| OtDiffEntry {
            path,
            status: OtDiffStatus::Added,
            value,
            previous_value: None,
        }));

        entries.retain(|entry| !self.ignore_fields.contains(&entry.path));
        entries.sort_by_key(|entry| entry.status.rank());
        entries
    }
}

/// Diffs with the default differ.
pub fn diff_records(before: Option<&OtRecord>, after: Option<&OtRecord>) -> Vec<OtDiffEntry> {
    OtDiffer::new().diff(before, after)
}
