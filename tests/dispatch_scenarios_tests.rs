//! Dispatch scenario tests
//!
//! Walks the shipped workflows through the calls a caller actually makes:
//! linear advance, review pass, self-fix retry, escalation at the iteration
//! limit, and the caller mistakes that must be rejected instead of defaulted.

use step_dispatch::workflows::render::{render, OutputFormat};
use step_dispatch::workflows::{parse_catalog, FixRoute};
use step_dispatch::{
    ContractViolation, DispatchError, Dispatcher, Invocation, NextInvocation, QrState, QrStatus,
    StepCatalog, ITERATION_LIMIT,
};

mod fixtures;

#[test]
fn test_linear_step_advances_to_next() {
    let payload = Dispatcher::default()
        .dispatch(&fixtures::review_loop(), 1, 6, &QrState::fresh())
        .unwrap();

    assert_eq!(payload.title, "Gather context");
    assert!(payload.is_first_step);
    assert_eq!(
        payload.next,
        NextInvocation::Step {
            invocation: Invocation::new(2, 6),
        }
    );
}

#[test]
fn test_gate_pass_advances_to_pass_step() {
    let qr = QrState::fresh().with_status(QrStatus::Pass);
    let payload = Dispatcher::default()
        .dispatch(&fixtures::review_loop(), 5, 6, &qr)
        .unwrap();

    assert_eq!(
        payload.gate_message.as_deref(),
        Some("Plan review passed. Continue to finalization.")
    );
    assert_eq!(payload.fix_route, None);
    assert_eq!(
        payload.next,
        NextInvocation::Step {
            invocation: Invocation::new(6, 6),
        }
    );
}

#[test]
fn test_gate_fail_routes_to_fix_target() {
    let qr = QrState::fresh().with_status(QrStatus::Fail);
    let payload = Dispatcher::default()
        .dispatch(&fixtures::review_loop(), 5, 6, &qr)
        .unwrap();

    assert_eq!(
        payload.fix_route,
        Some(FixRoute::SelfFix {
            role: "architect".to_string()
        })
    );
    match payload.next {
        NextInvocation::Step { invocation } => {
            assert_eq!(invocation.step, 3);
            assert_eq!(invocation.qr_iteration, Some(2));
            assert!(invocation.qr_fail);
            assert_eq!(invocation.qr_status, None);
        }
        other => panic!("expected a retry invocation, got {other:?}"),
    }
}

#[test]
fn test_gate_fail_at_limit_escalates() {
    let qr = QrState::fresh()
        .with_iteration(ITERATION_LIMIT)
        .with_status(QrStatus::Fail);
    let payload = Dispatcher::default()
        .dispatch(&fixtures::review_loop(), 5, 6, &qr)
        .unwrap();

    assert_eq!(
        payload.next,
        NextInvocation::Escalate {
            review_name: "plan-completeness".to_string(),
            iterations: ITERATION_LIMIT,
        }
    );
    assert!(payload.next.is_terminal());
    assert_eq!(payload.fix_route, None);
}

#[test]
fn test_branch_step_without_status_is_contract_violation() {
    let err = Dispatcher::default()
        .dispatch(&fixtures::doc_review(), 2, 7, &QrState::fresh())
        .unwrap_err();
    assert_eq!(
        err,
        DispatchError::Contract(ContractViolation::MissingOutcome { step: 2 })
    );
}

#[test]
fn test_step_zero_is_contract_violation() {
    let err = Dispatcher::default()
        .dispatch(&fixtures::review_loop(), 0, 6, &QrState::fresh())
        .unwrap_err();
    assert!(err.is_contract_violation());
    assert_eq!(
        err,
        DispatchError::Contract(ContractViolation::StepOutOfRange {
            step: 0,
            total_steps: 6
        })
    );
}

#[test]
fn test_step_beyond_total_is_contract_violation() {
    let err = Dispatcher::default()
        .dispatch(&fixtures::review_loop(), 7, 6, &QrState::fresh())
        .unwrap_err();
    assert!(matches!(
        err,
        DispatchError::Contract(ContractViolation::StepOutOfRange { step: 7, .. })
    ));
}

#[test]
fn test_gate_without_status_is_contract_violation() {
    let err = Dispatcher::default()
        .dispatch(&fixtures::review_loop(), 5, 6, &QrState::fresh().fix_pass())
        .unwrap_err();
    assert!(matches!(
        err,
        DispatchError::Contract(ContractViolation::MissingGateStatus { step: 5, .. })
    ));
}

#[test]
fn test_branch_step_follows_outcome() {
    let dispatcher = Dispatcher::default();
    let catalog = fixtures::doc_review();

    let found = dispatcher
        .dispatch(&catalog, 2, 7, &QrState::fresh().with_status(QrStatus::Pass))
        .unwrap();
    let missing = dispatcher
        .dispatch(&catalog, 2, 7, &QrState::fresh().with_status(QrStatus::Fail))
        .unwrap();

    assert_eq!(found.next, NextInvocation::Step { invocation: Invocation::new(4, 7) });
    assert_eq!(missing.next, NextInvocation::Step { invocation: Invocation::new(3, 7) });
}

#[test]
fn test_inventory_step_offers_outcomes_for_branch() {
    let payload = Dispatcher::default()
        .dispatch(&fixtures::doc_review(), 1, 7, &QrState::fresh())
        .unwrap();
    assert_eq!(
        payload.next,
        NextInvocation::Branch {
            if_pass: Invocation::new(2, 7).with_status(QrStatus::Pass),
            if_fail: Invocation::new(2, 7).with_status(QrStatus::Fail),
        }
    );
}

/// Follow the engine's own invocations from step 1 until the workflow ends.
///
/// `choose` picks the outcome whenever a pass/fail pair is offered. Returns
/// the visited steps and the final invocation.
fn walk(
    catalog: &StepCatalog,
    total_steps: u32,
    mut choose: impl FnMut(u32, u32) -> QrStatus,
) -> (Vec<u32>, NextInvocation) {
    let dispatcher = Dispatcher::default();
    let mut step = 1;
    let mut qr = QrState::fresh();
    let mut visited = Vec::new();

    for _ in 0..100 {
        visited.push(step);
        let payload = dispatcher
            .dispatch(catalog, step, total_steps, &qr)
            .unwrap_or_else(|err| panic!("step {step} rejected its own invocation: {err}"));

        let invocation = match payload.next {
            NextInvocation::Step { invocation } => invocation,
            NextInvocation::Branch { if_pass, if_fail } => {
                let iteration = if_pass.qr_iteration.unwrap_or(1);
                match choose(if_pass.step, iteration) {
                    QrStatus::Pass => if_pass,
                    QrStatus::Fail => if_fail,
                }
            }
            terminal => return (visited, terminal),
        };

        step = invocation.step;
        qr = QrState {
            iteration: invocation.qr_iteration.unwrap_or(1),
            failed: invocation.qr_fail,
            status: invocation.qr_status,
        };
    }
    panic!("workflow '{}' did not finish: {visited:?}", catalog.name());
}

#[test]
fn test_builtin_walks_always_pass_complete() {
    let (visited, end) = walk(&fixtures::review_loop(), 6, |_, _| QrStatus::Pass);
    assert_eq!(visited, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(end, NextInvocation::Complete);

    let (visited, end) = walk(&fixtures::doc_review(), 7, |_, _| QrStatus::Pass);
    assert_eq!(visited, vec![1, 2, 4, 5, 6, 7]);
    assert_eq!(end, NextInvocation::Complete);
}

#[test]
fn test_builtin_walks_always_fail_escalate() {
    for (catalog, total, review) in [
        (fixtures::review_loop(), 6, "plan-completeness"),
        (fixtures::doc_review(), 7, "doc-accuracy"),
    ] {
        let (_, end) = walk(&catalog, total, |_, _| QrStatus::Fail);
        assert_eq!(
            end,
            NextInvocation::Escalate {
                review_name: review.to_string(),
                iterations: ITERATION_LIMIT,
            }
        );
    }
}

#[test]
fn test_walk_recovers_after_failed_reviews() {
    // The doc gate fails twice, then passes on the third review.
    let (visited, end) = walk(&fixtures::doc_review(), 7, |step, iteration| {
        if step == 6 && iteration < 3 {
            QrStatus::Fail
        } else if step == 2 {
            QrStatus::Fail
        } else {
            QrStatus::Pass
        }
    });
    assert_eq!(visited, vec![1, 2, 3, 4, 5, 6, 4, 5, 6, 4, 5, 6, 7]);
    assert_eq!(end, NextInvocation::Complete);
}

#[test]
fn test_review_step_offers_pass_fail_pair_into_gate() {
    let payload = Dispatcher::default()
        .dispatch(&fixtures::review_loop(), 4, 6, &QrState::fresh())
        .unwrap();

    let dispatch = payload.dispatch.as_ref().unwrap();
    assert_eq!(dispatch.agent, "quality-reviewer");
    assert_eq!(dispatch.context.get("artifact").map(String::as_str), Some("plan.md"));
    assert_eq!(
        payload.next,
        NextInvocation::Branch {
            if_pass: Invocation::new(5, 6).with_status(QrStatus::Pass),
            if_fail: Invocation::new(5, 6).with_status(QrStatus::Fail),
        }
    );
}

#[test]
fn test_full_fix_loop_carries_iteration_to_gate() {
    let dispatcher = Dispatcher::default();
    let catalog = fixtures::review_loop();

    // Gate fails on the first review
    let gate = dispatcher
        .dispatch(&catalog, 5, 6, &QrState::fresh().with_status(QrStatus::Fail))
        .unwrap();
    let NextInvocation::Step { invocation: retry } = gate.next else {
        panic!("expected retry");
    };
    assert_eq!(retry.step, 3);

    // Caller re-enters the work step as a fix pass
    let fix_qr = QrState {
        iteration: retry.qr_iteration.unwrap_or(1),
        failed: retry.qr_fail,
        status: None,
    };
    let work = dispatcher.dispatch(&catalog, 3, 6, &fix_qr).unwrap();
    let review = dispatcher.dispatch(&catalog, 4, 6, &fix_qr).unwrap();

    assert_eq!(
        work.next,
        NextInvocation::Step {
            invocation: Invocation::new(4, 6).carrying(&fix_qr),
        }
    );
    match review.next {
        NextInvocation::Branch { if_pass, if_fail } => {
            assert_eq!(if_pass.qr_iteration, Some(2));
            assert_eq!(if_fail.qr_iteration, Some(2));
            assert!(if_fail.qr_fail);
            assert_eq!(if_fail.qr_status, Some(QrStatus::Fail));
        }
        other => panic!("expected pass/fail pair, got {other:?}"),
    }
}

#[test]
fn test_manual_gate_requires_human() {
    let catalog = parse_catalog(fixtures::MANUAL_GATE_TOML).unwrap();
    let payload = Dispatcher::default()
        .dispatch(&catalog, 2, 2, &QrState::fresh().with_status(QrStatus::Fail))
        .unwrap();

    assert_eq!(payload.fix_route, Some(FixRoute::Manual));
    assert!(payload
        .gate_message
        .as_deref()
        .unwrap()
        .contains("A human must correct"));
    assert_eq!(
        payload.next,
        NextInvocation::Step {
            invocation: Invocation::new(1, 2).carrying(&QrState::fresh().with_iteration(2).fix_pass()),
        }
    );
}

#[test]
fn test_gate_without_pass_step_completes() {
    let payload = Dispatcher::default()
        .dispatch(
            &fixtures::terminal_gate_catalog(),
            3,
            3,
            &QrState::fresh().with_status(QrStatus::Pass),
        )
        .unwrap();
    assert_eq!(payload.next, NextInvocation::Complete);

    let text = render(&payload, OutputFormat::Text).unwrap();
    assert!(text.contains("<gate_result>Release notes approved.</gate_result>"));
    assert!(text.contains("<workflow_complete>"));
}

#[test]
fn test_terminal_step_completes_regardless_of_status() {
    let dispatcher = Dispatcher::default();
    let catalog = fixtures::review_loop();
    for status in [None, Some(QrStatus::Pass), Some(QrStatus::Fail)] {
        let qr = QrState {
            iteration: 1,
            failed: false,
            status,
        };
        let payload = dispatcher.dispatch(&catalog, 6, 6, &qr).unwrap();
        assert_eq!(payload.next, NextInvocation::Complete);
    }
}

#[test]
fn test_total_steps_above_catalog_is_accepted() {
    let payload = Dispatcher::default()
        .dispatch(&fixtures::review_loop(), 2, 9, &QrState::fresh())
        .unwrap();
    assert_eq!(
        payload.next,
        NextInvocation::Step {
            invocation: Invocation::new(3, 9),
        }
    );
}

#[test]
fn test_rendering_is_deterministic() {
    let dispatcher = Dispatcher::default();
    let catalog = fixtures::review_loop();
    let cases = [
        (1, QrState::fresh()),
        (4, QrState::fresh().with_iteration(3).fix_pass()),
        (5, QrState::fresh().with_status(QrStatus::Fail)),
        (5, QrState::fresh().with_iteration(ITERATION_LIMIT).with_status(QrStatus::Fail)),
    ];

    for (step, qr) in cases {
        for format in [OutputFormat::Text, OutputFormat::Json] {
            let first = render(&dispatcher.dispatch(&catalog, step, 6, &qr).unwrap(), format).unwrap();
            let second = render(&dispatcher.dispatch(&catalog, step, 6, &qr).unwrap(), format).unwrap();
            assert_eq!(first, second, "step {step} rendered differently in {format}");
        }
    }
}

#[test]
fn test_first_step_text_lists_workflow_overview() {
    let payload = Dispatcher::default()
        .dispatch(&fixtures::review_loop(), 1, 6, &QrState::fresh())
        .unwrap();
    let text = render(&payload, OutputFormat::Text).unwrap();

    assert!(text.contains("<workflow_overview>\n  1. Gather context\n"));
    assert!(text.contains("  6. Finalize\n</workflow_overview>"));
    assert!(text.ends_with(
        "<invoke_after>\n  step-dispatch dispatch --workflow review-loop --step 2 --total-steps 6\n</invoke_after>\n"
    ));
}

#[test]
fn test_escalation_text_has_no_invocation() {
    let qr = QrState::fresh()
        .with_iteration(ITERATION_LIMIT + 1)
        .with_status(QrStatus::Fail);
    let payload = Dispatcher::default()
        .dispatch(&fixtures::review_loop(), 5, 6, &qr)
        .unwrap();
    let text = render(&payload, OutputFormat::Text).unwrap();

    assert!(text.contains(&format!(
        "Review 'plan-completeness' failed {} times; manual intervention required.",
        ITERATION_LIMIT + 1
    )));
    assert!(text.contains("<escalation review=\"plan-completeness\""));
    assert!(!text.contains("--step 3"));
}
