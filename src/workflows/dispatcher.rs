// Dispatch orchestrator - one deterministic pass from caller state to step payload

use super::catalog::StepCatalog;
use super::errors::{CatalogError, ContractViolation, DispatchError};
use super::gate::{GateDecision, GateEvaluator};
use super::routing;
use super::types::{Invocation, NextInvocation, NextStep, QrState, QrStatus, StepPayload};

/// Stateless entry point of the engine.
///
/// Holds only the gate policy; every call receives the catalog and the full
/// caller state, so one dispatcher can serve any number of workflow instances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dispatcher {
    gate: GateEvaluator,
}

impl Dispatcher {
    pub fn new(gate: GateEvaluator) -> Self {
        Self { gate }
    }

    pub fn with_iteration_limit(limit: u32) -> Result<Self, CatalogError> {
        Ok(Self::new(GateEvaluator::new(limit)?))
    }

    pub fn iteration_limit(&self) -> u32 {
        self.gate.iteration_limit()
    }

    pub fn dispatch(
        &self,
        catalog: &StepCatalog,
        step_number: u32,
        total_steps: u32,
        qr: &QrState,
    ) -> Result<StepPayload, DispatchError> {
        tracing::debug!(
            workflow = %catalog.name(),
            step = step_number,
            total_steps,
            iteration = qr.iteration,
            failed = qr.failed,
            status = ?qr.status,
            "Dispatching step"
        );

        check_preconditions(catalog, step_number, total_steps, qr)?;
        let step = catalog
            .get(step_number)
            .ok_or_else(|| ContractViolation::UnknownStep {
                workflow: catalog.name().to_string(),
                step: step_number,
            })?;
        catalog.check_references(step_number)?;

        let mut gate_message = None;
        let mut fix_route = None;

        let next = match &step.gate {
            Some(gate) => match self.gate.evaluate(step_number, gate, qr)? {
                GateDecision::Passed { message, next } => {
                    gate_message = Some(message);
                    // A passed review starts the next phase with a clean slate.
                    forward(catalog, next, total_steps, &QrState::fresh())
                }
                GateDecision::Retry {
                    message,
                    route,
                    work_step,
                    next_qr,
                } => {
                    gate_message = Some(message);
                    fix_route = Some(route);
                    enter(catalog, work_step, total_steps, &next_qr)
                }
                GateDecision::Escalated {
                    message,
                    review_name,
                    iterations,
                } => {
                    gate_message = Some(message);
                    NextInvocation::Escalate {
                        review_name,
                        iterations,
                    }
                }
            },
            None => {
                let next = routing::resolve(step_number, &step.routing, qr.status)?;
                forward(catalog, next, total_steps, qr)
            }
        };

        let is_first_step = step_number == 1;
        let overview = if is_first_step {
            catalog
                .steps()
                .map(|(number, step)| (number, step.title.clone()))
                .collect()
        } else {
            Vec::new()
        };

        Ok(StepPayload {
            workflow: catalog.name().to_string(),
            invoke: catalog.invoke().to_string(),
            step: step_number,
            total_steps,
            is_first_step,
            title: step.title.clone(),
            actions: step.actions.clone(),
            overview,
            gate_message,
            fix_route,
            dispatch: step.dispatch.clone(),
            next,
        })
    }
}

fn check_preconditions(
    catalog: &StepCatalog,
    step_number: u32,
    total_steps: u32,
    qr: &QrState,
) -> Result<(), ContractViolation> {
    if step_number < 1 || step_number > total_steps {
        return Err(ContractViolation::StepOutOfRange {
            step: step_number,
            total_steps,
        });
    }

    let minimum = catalog.min_total_steps();
    if total_steps < minimum {
        return Err(ContractViolation::TotalStepsBelowMinimum {
            workflow: catalog.name().to_string(),
            minimum,
            total_steps,
        });
    }

    if qr.iteration < 1 {
        return Err(ContractViolation::InvalidIteration {
            iteration: qr.iteration,
        });
    }

    Ok(())
}

/// Turn a resolved successor into the call the caller issues next
fn forward(
    catalog: &StepCatalog,
    next: NextStep,
    total_steps: u32,
    qr: &QrState,
) -> NextInvocation {
    match next {
        NextStep::Continue(step) => enter(catalog, step, total_steps, qr),
        NextStep::Complete => NextInvocation::Complete,
    }
}

/// Call into `step`.
///
/// Gates and branch steps reject a call without `--qr-status`, so both
/// outcomes are spelled out for them.
fn enter(catalog: &StepCatalog, step: u32, total_steps: u32, qr: &QrState) -> NextInvocation {
    let invocation = Invocation::new(step, total_steps).carrying(qr);
    match catalog.get(step) {
        Some(successor) if successor.needs_outcome() => NextInvocation::Branch {
            if_pass: invocation.clone().with_status(QrStatus::Pass),
            if_fail: invocation.with_status(QrStatus::Fail),
        },
        _ => NextInvocation::Step { invocation },
    }
}
