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

//! # Sample Ingest Module
//!
//! Turns uploaded sample text into [`OtRecord`](crate::record::OtRecord)s.
//!
//! ## Module Components
//!
//! - **Text** ([text.rs](text/index.html)): the JSON, NDJSON and
//!   `key=value` fallback chain
//! - **OTLP** ([otlp.rs](otlp/index.html)): flattening of OTLP/JSON span and
//!   log exports
//!
//! ## Supported Input
//!
//! - a JSON array of objects, or a single object
//! - newline-delimited JSON objects, trailing commas tolerated
//! - `key=value key2="value 2"` lines
//! - OTLP/JSON `resourceSpans` and `resourceLogs` payloads
//!
//! ## Usage
//!
//! ```rust
//! use otx::ingest::OtSampleReader;
//!
//! let reader = OtSampleReader::new();
//! let batch = reader.parse_batch("level=error msg=\"boom\"").unwrap();
//! assert_eq!(batch.len(), 1);
//! ```

pub mod otlp;
pub mod text;

use std::path::Path;

use crate::config::OtIngestConfig;
use crate::errors::{OtError, Result};
use crate::record::OtRecordBatch;

pub use text::{parse_pairs, parse_records};

/// Sample parser with a record cap.
#[derive(Clone, Debug, Default)]
pub struct OtSampleReader {
    config: OtIngestConfig,
}

impl OtSampleReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: OtIngestConfig) -> Self {
        self.config = config;
        self
    }

    /// Parses `text`, keeping at most `max_records` records. Never fails.
    pub fn parse_text(&self, text: &str) -> OtRecordBatch {
        let mut records = parse_records(text);
        if records.len() > self.config.max_records {
            log::info!(
                "sample batch truncated from {} to {} record(s)",
                records.len(),
                self.config.max_records
            );
            records.truncate(self.config.max_records);
        }
        records
    }

    /// Like [`parse_text`](Self::parse_text) but reports an empty result.
    pub fn parse_batch(&self, text: &str) -> Result<OtRecordBatch> {
        let records = self.parse_text(text);
        if records.is_empty() {
            return Err(OtError::ingest(
                "no telemetry records found; expected JSON, NDJSON, OTLP/JSON or key=value lines",
            ));
        }
        log::debug!("parsed {} sample record(s)", records.len());
        Ok(records)
    }

    pub fn read_path(&self, path: &Path) -> Result<OtRecordBatch> {
        let content = std::fs::read_to_string(path)?;
        self.parse_batch(&content)
    }
}
