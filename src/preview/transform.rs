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

//! Simulated step effects.
//!
//! Only a handful of step types have a visible effect; every other step
//! leaves the record unchanged. The input is never mutated.

use std::sync::OnceLock;

use serde_json::Value;
use xxhash_rust::xxh3::xxh3_64;

use crate::pattern::{self, OtPatternCell};
use crate::record::{OtFieldPath, OtRecord, OtRecordBatch};
use crate::step::{catalog, OtSignal, OtStep};

pub const MASK: &str = "********";

const PASSWORD_PATTERN: &str = r"(?i)password=([^\s]+)";
static PASSWORD_RE: OtPatternCell = OnceLock::new();

type OtEffect = fn(&OtStep, &mut OtRecord);

/// Short, stable, non-cryptographic tag for `value`, e.g. `h_1a2b3c4d`.
pub fn digest(value: &str) -> String {
    format!("h_{:08x}", xxh3_64(value.as_bytes()) as u32)
}

/// Target paths of `step`, or `default` when it names none.
fn targets<'a>(step: &'a OtStep, default: Option<&'a str>) -> Vec<OtFieldPath> {
    let mut fields = step.config.fields();
    if fields.is_empty() {
        fields.extend(default);
    }
    fields
        .into_iter()
        .filter_map(|field| OtFieldPath::parse(field).ok())
        .collect()
}

/// Rewrites the string at `path`; non-strings and missing fields are left alone.
fn rewrite_string(record: &mut OtRecord, path: &OtFieldPath, rewrite: impl FnOnce(&str) -> String) {
    if let Some(Value::String(current)) = path.resolve_mut(record) {
        *current = rewrite(current);
    }
}

/// Field the compiled mask-passwords statement reads for each signal.
fn password_default(signal: OtSignal) -> &'static str {
    match signal {
        OtSignal::Log => "log.body",
        _ => "process.command_line",
    }
}

fn mask_passwords(step: &OtStep, record: &mut OtRecord) {
    let Some(re) = pattern::cached(&PASSWORD_RE, PASSWORD_PATTERN) else {
        return;
    };
    for path in targets(step, Some(password_default(step.signal))) {
        rewrite_string(record, &path, |value| {
            re.replace_all(value, format!("password={MASK}").as_str()).into_owned()
        });
    }
}

fn hash_emails(step: &OtStep, record: &mut OtRecord) {
    for path in targets(step, Some("user.email")) {
        rewrite_string(record, &path, digest);
    }
}

fn hash_field(step: &OtStep, record: &mut OtRecord) {
    for path in targets(step, None) {
        rewrite_string(record, &path, digest);
    }
}

fn mask_field(step: &OtStep, record: &mut OtRecord) {
    for path in targets(step, None) {
        rewrite_string(record, &path, |_| MASK.to_string());
    }
}

fn drop_field(step: &OtStep, record: &mut OtRecord) {
    for path in targets(step, None) {
        path.remove(record);
    }
}

fn effect(step_type: &str) -> Option<OtEffect> {
    let effect: OtEffect = match step_type {
        catalog::MASK_PASSWORDS => mask_passwords,
        catalog::HASH_EMAILS => hash_emails,
        catalog::HASH_FIELD => hash_field,
        catalog::MASK_FIELD => mask_field,
        catalog::DROP_FIELD => drop_field,
        _ => return None,
    };
    Some(effect)
}

/// True when the step type changes records during preview.
pub fn has_effect(step_type: &str) -> bool {
    effect(step_type).is_some()
}

/// Applies the simulated effect of enabled steps to sample records.
#[derive(Clone, Copy, Debug, Default)]
pub struct OtSampleTransformer;

impl OtSampleTransformer {
    pub fn new() -> Self {
        Self
    }

    pub fn apply(&self, record: &OtRecord, steps: &[OtStep]) -> OtRecord {
        let mut output = record.clone();
        for step in steps.iter().filter(|s| s.enabled) {
            if let Some(effect) = effect(step.step_type.as_str()) {
                effect(step, &mut output);
            }
        }
        output
    }

    pub fn transform_batch(&self, records: &[OtRecord], steps: &[OtStep]) -> OtRecordBatch {
        records.iter().map(|record| self.apply(record, steps)).collect()
    }
}
