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

//! # Inspection Module
//!
//! Read-only analysis of sample records.
//!
//! - **Diff** ([diff.rs](diff/index.html)): field-level before/after
//!   classification of two records
//! - **Detect** ([detect.rs](detect/index.html)): heuristic rules that propose
//!   candidate steps for a sample batch

pub mod diff;
pub mod detect;

pub use diff::{
    diff_records, flatten, OtDiffEntry, OtDiffStatus, OtDiffSummary, OtDiffer,
};
pub use detect::{OtDetectedIssue, OtDetectionSummary, OtDetector};
