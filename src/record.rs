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

//! # Otx Record Module
//!
//! Telemetry samples are arbitrary JSON-like mappings: string keys to
//! primitives, arrays or nested mappings, with no schema. Otx keeps them as
//! [`serde_json::Map`] with insertion order preserved so that previews and
//! detection results follow the order fields appeared in the upload.
//!
//! Field addressing is dotted. Flattened telemetry commonly uses dots inside a
//! single key (`"process.command_line"`), while hand-written samples may nest
//! (`{"process": {"command_line": ...}}`). [`OtFieldPath`] accepts both: an
//! exact top-level key wins, otherwise the path is walked segment by segment.
//!
//! ```rust
//! use otx::record::{OtFieldPath, OtRecord};
//! use serde_json::json;
//!
//! let record: OtRecord = json!({"user": {"email": "a@b.com"}})
//!     .as_object()
//!     .cloned()
//!     .unwrap();
//! let path = OtFieldPath::parse("user.email").unwrap();
//! assert_eq!(path.resolve(&record), Some(&json!("a@b.com")));
//! ```

use serde_json::{Map, Value};

use crate::errors::{OtError, Result};

/// A single telemetry sample.
pub type OtRecord = Map<String, Value>;

/// Convenience alias for working on batches of samples.
pub type OtRecordBatch = Vec<OtRecord>;

/// Converts a JSON value into a record when it is an object.
pub fn record_from_value(value: Value) -> Option<OtRecord> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Dotted path addressing a field of an [`OtRecord`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OtFieldPath {
    raw: String,
    segments: Vec<String>,
}

impl OtFieldPath {
    pub fn parse(path: &str) -> Result<Self> {
        let raw = path.trim();
        let segments: Vec<String> = raw
            .split('.')
            .map(|segment| segment.trim().to_string())
            .filter(|segment| !segment.is_empty())
            .collect();

        if segments.is_empty() {
            return Err(OtError::validation("field path may not be empty"));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn resolve<'a>(&self, record: &'a OtRecord) -> Option<&'a Value> {
        if let Some(value) = record.get(&self.raw) {
            return Some(value);
        }
        let (first, rest) = self.segments.split_first()?;
        let mut current = record.get(first)?;
        for segment in rest {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                _ => return None,
            };
        }
        Some(current)
    }

    pub fn resolve_mut<'a>(&self, record: &'a mut OtRecord) -> Option<&'a mut Value> {
        if record.contains_key(&self.raw) {
            return record.get_mut(&self.raw);
        }
        let (first, rest) = self.segments.split_first()?;
        let mut current = record.get_mut(first)?;
        for segment in rest {
            current = match current {
                Value::Object(map) => map.get_mut(segment)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Removes the addressed field, returning its previous value. The
    /// remaining keys keep their order.
    pub fn remove(&self, record: &mut OtRecord) -> Option<Value> {
        if record.contains_key(&self.raw) {
            return record.shift_remove(&self.raw);
        }
        let (last, parents) = self.segments.split_last()?;
        let (first, middle) = match parents.split_first() {
            Some(split) => split,
            None => return record.shift_remove(last),
        };
        let mut current = record.get_mut(first)?;
        for segment in middle {
            current = match current {
                Value::Object(map) => map.get_mut(segment)?,
                _ => return None,
            };
        }
        match current {
            Value::Object(map) => map.shift_remove(last),
            _ => None,
        }
    }
}
