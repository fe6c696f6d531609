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

//! Sample text parsing.
//!
//! The whole text is tried as JSON first. When that fails the text is read
//! line by line: each line is tried as a JSON object, then as `key=value`
//! pairs. Lines that yield nothing are skipped.

use std::sync::OnceLock;

use serde_json::{Map, Value};

use crate::ingest::otlp;
use crate::pattern::{self, OtPatternCell};
use crate::record::{OtRecord, OtRecordBatch};

const PAIR_PATTERN: &str = r#"(\S+?)=("[^"]*"|'[^']*'|\S*)"#;
static PAIR_RE: OtPatternCell = OnceLock::new();

/// Parses `text` into records without ever failing.
pub fn parse_records(text: &str) -> OtRecordBatch {
    let text = text.trim_start_matches('\u{feff}').trim();
    if text.is_empty() {
        return OtRecordBatch::new();
    }

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(object) => Some(expand_object(object)),
                _ => None,
            })
            .flatten()
            .collect(),
        Ok(Value::Object(object)) => expand_object(object),
        Ok(_) => {
            log::warn!("sample input is a JSON scalar; no records extracted");
            OtRecordBatch::new()
        }
        Err(_) => parse_lines(text),
    }
}

fn expand_object(object: Map<String, Value>) -> OtRecordBatch {
    if otlp::is_otlp_payload(&object) {
        otlp::flatten_payload(&object)
    } else {
        vec![object]
    }
}

fn parse_lines(text: &str) -> OtRecordBatch {
    let mut records = OtRecordBatch::new();
    let mut skipped = 0usize;

    for line in text.lines() {
        let line = line.trim().trim_end_matches(',').trim_end();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(object)) => records.extend(expand_object(object)),
            Ok(_) => skipped += 1,
            Err(_) => match parse_pairs(line) {
                Some(record) => records.push(record),
                None => skipped += 1,
            },
        }
    }

    if skipped > 0 {
        log::warn!("skipped {skipped} sample line(s) without usable fields");
    }
    records
}

fn strip_quotes(value: &str) -> &str {
    let value = value
        .strip_prefix(['"', '\''])
        .unwrap_or(value);
    value.strip_suffix(['"', '\'']).unwrap_or(value)
}

/// Reads `key=value` pairs; values stay strings.
pub fn parse_pairs(line: &str) -> Option<OtRecord> {
    let re = pattern::cached(&PAIR_RE, PAIR_PATTERN)?;
    let mut record = OtRecord::new();
    for caps in re.captures_iter(line) {
        let key = strip_quotes(&caps[1]);
        if key.is_empty() {
            continue;
        }
        let value = strip_quotes(&caps[2]);
        record.insert(key.to_string(), Value::String(value.to_string()));
    }
    (!record.is_empty()).then_some(record)
}
