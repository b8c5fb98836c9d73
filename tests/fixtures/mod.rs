// Shared catalogs for dispatch integration tests
#![allow(dead_code)]

use step_dispatch::workflows::builtin;
use step_dispatch::{Dispatch, DispatchMode, GateConfig, Routing, Step, StepCatalog};
use std::collections::BTreeMap;

pub const MANUAL_GATE_TOML: &str = include_str!("manual_gate.toml");

/// The shipped six-step review loop: gate at 5, work step 3, pass step 6, self-fix
pub fn review_loop() -> StepCatalog {
    builtin::load("review-loop")
        .expect("review-loop is built in")
        .expect("review-loop is valid")
}

/// Doc review: step 2 branches on an outcome outside the gate pattern
pub fn doc_review() -> StepCatalog {
    builtin::load("doc-review")
        .expect("doc-review is built in")
        .expect("doc-review is valid")
}

/// Catalog built in code, with a gate that has no pass step
pub fn terminal_gate_catalog() -> StepCatalog {
    let mut context = BTreeMap::new();
    context.insert("artifact".to_string(), "CHANGELOG.md".to_string());

    StepCatalog::new("release-notes", "notes-run")
        .with_description("Draft release notes and stop once reviewed")
        .with_step(
            1,
            Step::new("Draft notes", Routing::Linear).with_actions(["Collect merged changes."]),
        )
        .with_step(
            2,
            Step::new("Review notes", Routing::Linear).with_dispatch(Dispatch {
                agent: "editor".to_string(),
                script: "notes-review".to_string(),
                total_steps: 2,
                context,
                mode: DispatchMode::Script,
            }),
        )
        .with_step(
            3,
            Step::new("Notes gate", Routing::Linear).with_gate(GateConfig {
                review_name: "release-notes".to_string(),
                work_step: 1,
                pass_step: None,
                pass_message: "Release notes approved.".to_string(),
                self_fix: true,
                fix_target: None,
            }),
        )
}
