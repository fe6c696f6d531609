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

//! # Otx Core Tests - Workspace
//!
//! End-to-end tests over the pipeline, compiler, sync state and preview.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test workspace
//! ```

use std::io::Write;

use otx::inspect::OtDiffStatus;
use otx::step::catalog;
use otx::{OtErrorMode, OtQuickAction, OtSignal, OtSourceIdentity, OtSyncState, OtWorkspace};

const SAMPLES: &str = r#"
{"process.command_line": "app --password=secret123", "user.email": "a@b.io", "service.region": "eu"},
{"process.command_line": "worker", "user.email": "c@d.io", "service.region": "eu"},
"#;

/// Tests the edit, recompute and preview cycle.
#[test]
fn test_edit_recompute_preview() {
    let mut workspace = OtWorkspace::default();
    assert_eq!(workspace.load_samples(SAMPLES).unwrap(), 2);

    workspace.pipeline_mut().add_from_catalog(catalog::MASK_PASSWORDS, None).unwrap();
    workspace.pipeline_mut().add_from_catalog(catalog::HASH_EMAILS, None).unwrap();
    let program = workspace.recompute();
    assert_eq!(program.statement_count(), 2);

    let preview = workspace.preview(0).unwrap();
    assert_eq!(preview.after["process.command_line"], "app --password=********");
    assert_eq!(preview.summary.modified, 2);
    assert_eq!(preview.summary.unchanged, 1);
    assert_eq!(preview.diff[2].status, OtDiffStatus::Unchanged);
}

/// Tests that toggling without recompute leaves the program untouched.
#[test]
fn test_recompute_is_explicit() {
    let mut workspace = OtWorkspace::default();
    let id = workspace
        .pipeline_mut()
        .add_from_catalog(catalog::SCALE_VALUES, None)
        .unwrap()
        .id
        .clone();
    workspace.recompute();
    let before = workspace.export().to_string();

    workspace.pipeline_mut().toggle(&id).unwrap();
    assert_eq!(workspace.export(), before);
    workspace.recompute();
    assert!(workspace.program().is_placeholder());
    assert_ne!(workspace.export(), before);
}

/// Tests custom text pinning and revert through the workspace.
#[test]
fn test_custom_then_revert() {
    let mut workspace = OtWorkspace::default();
    workspace.set_source(Some(OtSourceIdentity::new("checkout", "staging")));
    workspace.recompute();

    let report = workspace
        .save_custom("transform:\n  metric_statements:\n    - context: metric\n      statements:\n        - scale_metric(3.0)")
        .unwrap();
    assert!(report.valid);
    assert_eq!(workspace.sync_state(), OtSyncState::Custom);

    workspace
        .pipeline_mut()
        .add_quick_action(OtQuickAction::Mask, "user.email", OtSignal::Log)
        .unwrap();
    workspace.recompute();
    assert!(workspace.export().contains("scale_metric(3.0)"));

    let reverted = workspace.revert();
    assert_eq!(workspace.sync_state(), OtSyncState::Synced);
    assert!(reverted.contains("# Source: checkout (staging)"));
    assert!(reverted.contains(r#"set(log.attributes["user.email"], "********")"#));
}

/// Tests that detection skips what the pipeline already has.
#[test]
fn test_detection_against_pipeline() {
    let mut workspace = OtWorkspace::default();
    workspace.load_samples(SAMPLES).unwrap();
    let before: Vec<String> = workspace.detect().iter().map(|s| s.step_type.to_string()).collect();
    assert!(before.contains(&catalog::HASH_EMAILS.to_string()));

    workspace.pipeline_mut().add_from_catalog(catalog::HASH_EMAILS, None).unwrap();
    let after: Vec<String> = workspace.detect().iter().map(|s| s.step_type.to_string()).collect();
    assert!(!after.contains(&catalog::HASH_EMAILS.to_string()));
    assert_eq!(workspace.detection_summary().total, before.len());
}

/// Tests building a workspace from a configuration file.
#[test]
fn test_workspace_from_config_file() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(file, "compiler:\n  error_mode: silent\n  include_header: false").unwrap();
    let workspace = OtWorkspace::from_config_path(file.path()).unwrap();
    assert_eq!(workspace.config().compiler.error_mode, OtErrorMode::Silent);
    assert!(workspace.export().starts_with("transform:\n  error_mode: silent"));
}
