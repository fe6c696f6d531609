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

//! # Otx Core Tests - Properties
//!
//! Property tests for compiler grouping and record diffing.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test properties
//! ```

use std::collections::{BTreeMap, BTreeSet};

use otx::inspect::{diff_records, flatten, OtDiffStatus};
use otx::step::catalog;
use otx::{
    OtCategory, OtCompiler, OtRecord, OtRuleTable, OtSignal, OtStatementContext, OtStep,
    OtStepConfig,
};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

const STEP_TYPES: &[&str] = &[
    catalog::MASK_PASSWORDS,
    catalog::HASH_EMAILS,
    catalog::DROP_K8S_METADATA,
    catalog::TRUNCATE_LARGE_VALUES,
    catalog::SCALE_VALUES,
    catalog::CONVERT_METRIC_TYPE,
    catalog::LIMIT_ATTRIBUTE_COUNT,
    "parse-json-body",
    "severity-adjustment",
];

const CONTEXTS: &[OtStatementContext] = &[
    OtStatementContext::Span,
    OtStatementContext::Spanevent,
    OtStatementContext::Resource,
    OtStatementContext::Scope,
    OtStatementContext::Metric,
    OtStatementContext::Datapoint,
    OtStatementContext::Log,
];

/// A catalog step, or a custom statement pinned to any context of any signal.
fn step_strategy() -> impl Strategy<Value = (Option<usize>, usize, usize)> {
    prop_oneof![
        (0..STEP_TYPES.len()).prop_map(|pick| (Some(pick), 0, 0)),
        (0..OtSignal::ALL.len(), 0..CONTEXTS.len()).prop_map(|(signal, context)| (None, signal, context)),
    ]
}

fn steps_strategy() -> impl Strategy<Value = Vec<OtStep>> {
    prop::collection::vec((step_strategy(), any::<bool>()), 0..12).prop_map(|picks| {
        picks
            .into_iter()
            .enumerate()
            .map(|(index, ((pick, signal, context), enabled))| {
                let mut step = match pick {
                    Some(pick) => OtStep::from_definition(catalog::definition(STEP_TYPES[pick]).unwrap()),
                    None => OtStep::builder(catalog::CUSTOM_OTTL, "Custom", OtCategory::Advanced)
                        .signal(OtSignal::ALL[signal])
                        .config(OtStepConfig::Statement {
                            statement: "noop()".into(),
                            context: Some(CONTEXTS[context]),
                        })
                        .build()
                        .unwrap(),
                };
                step.id = format!("s{index}");
                step.enabled = enabled;
                step
            })
            .collect()
    })
}

fn value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        (0i64..3).prop_map(|n| json!(n)),
        "[xy]".prop_map(Value::String),
        Just(Value::Null),
    ];
    leaf.prop_recursive(3, 16, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(Value::Array),
            prop::collection::btree_map("[a-c]", inner, 0..3)
                .prop_map(|fields| Value::Object(fields.into_iter().collect::<Map<String, Value>>())),
        ]
    })
}

fn record_strategy() -> impl Strategy<Value = OtRecord> {
    prop::collection::btree_map("[a-e]", value_strategy(), 0..5)
        .prop_map(|fields| fields.into_iter().collect())
}

fn statuses(before: &OtRecord, after: &OtRecord) -> BTreeMap<String, OtDiffStatus> {
    diff_records(Some(before), Some(after))
        .into_iter()
        .map(|entry| (entry.path, entry.status))
        .collect()
}

proptest! {
    /// Tests that a pipeline without enabled steps compiles to the placeholder.
    #[test]
    fn test_disabled_pipeline_is_placeholder(mut steps in steps_strategy()) {
        for step in &mut steps {
            step.enabled = false;
        }
        let program = OtCompiler::default().compile(&steps);
        prop_assert!(program.is_placeholder());
        prop_assert_eq!(program.statement_count(), 1);
    }

    /// Tests that every enabled step yields one statement and groups keep pipeline order.
    #[test]
    fn test_groups_keep_pipeline_order(steps in steps_strategy()) {
        let program = OtCompiler::default().compile(&steps);
        let enabled = steps.iter().filter(|s| s.enabled).count();
        if enabled > 0 {
            prop_assert_eq!(program.statement_count(), enabled);
        }
        for section in &program.sections {
            for group in &section.groups {
                let positions: Vec<usize> = group
                    .statements
                    .iter()
                    .filter_map(|c| steps.iter().position(|s| s.id == c.step_id))
                    .collect();
                prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
            }
        }
        let order: Vec<OtSignal> = program.sections.iter().map(|s| s.signal).collect();
        let mut sorted = order.clone();
        sorted.sort();
        prop_assert_eq!(order, sorted);
    }

    /// Tests that canonical contexts come first in canonical order, then the rest by discovery.
    #[test]
    fn test_context_order_is_canonical_then_discovered(steps in steps_strategy()) {
        let program = OtCompiler::default().compile(&steps);
        for section in &program.sections {
            let mut discovered: Vec<OtStatementContext> = Vec::new();
            for step in steps.iter().filter(|s| s.enabled && s.signal == section.signal) {
                let context = OtRuleTable::builtin().resolve(step).0.context;
                if !discovered.contains(&context) {
                    discovered.push(context);
                }
            }
            let mut expected: Vec<OtStatementContext> = OtStatementContext::canonical_order(section.signal)
                .iter()
                .copied()
                .filter(|c| discovered.contains(c))
                .collect();
            expected.extend(discovered.iter().copied().filter(|c| c.rank(section.signal).is_none()));
            let actual: Vec<OtStatementContext> = section.groups.iter().map(|g| g.context).collect();
            prop_assert_eq!(actual, expected);
        }
    }

    /// Tests that compiling the same steps twice gives identical text.
    #[test]
    fn test_compile_is_deterministic(steps in steps_strategy()) {
        let compiler = OtCompiler::default();
        prop_assert_eq!(compiler.compile_text(&steps), compiler.compile_text(&steps));
    }

    /// Tests that the diff covers each flattened path of either record exactly once.
    #[test]
    fn test_diff_covers_union_of_paths(before in record_strategy(), after in record_strategy()) {
        let entries = diff_records(Some(&before), Some(&after));
        let (flat_before, flat_after) = (flatten(&before), flatten(&after));
        let union: BTreeSet<&String> = flat_before.keys().chain(flat_after.keys()).collect();
        let paths: BTreeSet<&String> = entries.iter().map(|e| &e.path).collect();
        prop_assert_eq!(entries.len(), union.len());
        prop_assert_eq!(paths, union);
        prop_assert!(entries.windows(2).all(|w| w[0].status.rank() <= w[1].status.rank()));
    }

    /// Tests that swapping sides swaps added and removed path by path.
    #[test]
    fn test_diff_swap_is_symmetric(before in record_strategy(), after in record_strategy()) {
        let forward = statuses(&before, &after);
        let backward = statuses(&after, &before);
        prop_assert_eq!(forward.len(), backward.len());
        for (path, status) in &forward {
            let expected = match status {
                OtDiffStatus::Added => OtDiffStatus::Removed,
                OtDiffStatus::Removed => OtDiffStatus::Added,
                other => *other,
            };
            prop_assert_eq!(backward.get(path), Some(&expected), "path {}", path);
        }
    }

    /// Tests that a record diffed against itself is unchanged everywhere.
    #[test]
    fn test_diff_with_self_is_unchanged(record in record_strategy()) {
        let entries = diff_records(Some(&record), Some(&record));
        prop_assert_eq!(entries.len(), flatten(&record).len());
        prop_assert!(entries.iter().all(|e| e.status == OtDiffStatus::Unchanged));
        prop_assert!(entries.iter().all(|e| e.previous_value.is_none()));
    }
}
