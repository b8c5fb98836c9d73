// Gate evaluator - bounded-retry protocol for quality review checkpoints
//
// AwaitingResult --pass--> Passed --> pass_step or Complete
// AwaitingResult --fail--> Escalate | SelfFix(work_step) | ManualFix(work_step)

use serde::{Deserialize, Serialize};

use super::errors::{CatalogError, ContractViolation, DispatchError};
use super::types::{FixRoute, GateConfig, NextStep, QrState, QrStatus};

/// Failed reviews allowed before a gate stops retrying and escalates
pub const ITERATION_LIMIT: u32 = 5;

/// What a gate decided for the current call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GateDecision {
    Passed {
        message: String,
        next: NextStep,
    },
    Retry {
        message: String,
        route: FixRoute,
        work_step: u32,
        /// State the caller must send with the retry
        next_qr: QrState,
    },
    Escalated {
        message: String,
        review_name: String,
        iterations: u32,
    },
}

impl GateDecision {
    pub fn message(&self) -> &str {
        match self {
            GateDecision::Passed { message, .. }
            | GateDecision::Retry { message, .. }
            | GateDecision::Escalated { message, .. } => message,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateEvaluator {
    iteration_limit: u32,
}

impl Default for GateEvaluator {
    fn default() -> Self {
        Self {
            iteration_limit: ITERATION_LIMIT,
        }
    }
}

impl GateEvaluator {
    pub fn new(iteration_limit: u32) -> Result<Self, CatalogError> {
        if iteration_limit == 0 {
            return Err(CatalogError::ZeroIterationLimit);
        }
        Ok(Self { iteration_limit })
    }

    pub fn iteration_limit(&self) -> u32 {
        self.iteration_limit
    }

    /// Evaluate the gate at `step` against the caller's review state.
    ///
    /// Only `qr.status` and `qr.iteration` matter here; `qr.failed` describes
    /// how the previous step was entered and has no say in the gate outcome.
    pub fn evaluate(
        &self,
        step: u32,
        gate: &GateConfig,
        qr: &QrState,
    ) -> Result<GateDecision, DispatchError> {
        let status = qr.status.ok_or_else(|| ContractViolation::MissingGateStatus {
            step,
            review_name: gate.review_name.clone(),
        })?;

        let decision = match status {
            QrStatus::Pass => GateDecision::Passed {
                message: gate.pass_message.clone(),
                next: gate
                    .pass_step
                    .map(NextStep::Continue)
                    .unwrap_or(NextStep::Complete),
            },
            QrStatus::Fail if qr.iteration >= self.iteration_limit => GateDecision::Escalated {
                message: format!(
                    "Review '{}' failed {} times; manual intervention required.",
                    gate.review_name, qr.iteration
                ),
                review_name: gate.review_name.clone(),
                iterations: qr.iteration,
            },
            QrStatus::Fail => {
                let next_qr = QrState {
                    iteration: qr.iteration + 1,
                    failed: true,
                    status: None,
                };
                let (route, message) = if gate.self_fix {
                    let role = gate.fix_role().to_string();
                    let message = format!(
                        "Review '{}' failed (iteration {}). Hand the reported issues to the {} agent, then re-run the review.",
                        gate.review_name, qr.iteration, role
                    );
                    (FixRoute::SelfFix { role }, message)
                } else {
                    let message = format!(
                        "Review '{}' failed (iteration {}). A human must correct the reported issues before the review runs again.",
                        gate.review_name, qr.iteration
                    );
                    (FixRoute::Manual, message)
                };
                GateDecision::Retry {
                    message,
                    route,
                    work_step: gate.work_step,
                    next_qr,
                }
            }
        };

        tracing::info!(
            step,
            review = %gate.review_name,
            iteration = qr.iteration,
            status = %status,
            decision = decision_kind(&decision),
            "Gate evaluated"
        );
        Ok(decision)
    }
}

fn decision_kind(decision: &GateDecision) -> &'static str {
    match decision {
        GateDecision::Passed { .. } => "passed",
        GateDecision::Retry {
            route: FixRoute::SelfFix { .. },
            ..
        } => "self_fix",
        GateDecision::Retry { .. } => "manual_fix",
        GateDecision::Escalated { .. } => "escalated",
    }
}
