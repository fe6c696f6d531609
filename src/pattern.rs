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

//! Lazily compiled regular expressions shared across modules.

use std::sync::OnceLock;

use regex::Regex;

pub(crate) type OtPatternCell = OnceLock<Option<Regex>>;

/// Compiles `pattern` into `cell` on first use.
///
/// A pattern that fails to compile is logged once and then behaves as if it
/// never matches.
pub(crate) fn cached(cell: &'static OtPatternCell, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(err) => {
            log::error!("invalid built-in pattern {pattern:?}: {err}");
            None
        }
    })
    .as_ref()
}

/// Shorthand for `cached(..).is_some_and(|re| re.is_match(text))`.
pub(crate) fn matches(cell: &'static OtPatternCell, pattern: &str, text: &str) -> bool {
    cached(cell, pattern).is_some_and(|re| re.is_match(text))
}
