// Routing resolver - maps a step's routing rule and review outcome to its successor

use super::errors::{CatalogError, ContractViolation, DispatchError};
use super::types::{NextStep, QrStatus, Routing};

/// Resolve the successor of `step`.
///
/// `outcome` only matters for `Branch`; a branch without an outcome is the
/// caller's mistake and is reported, never defaulted.
pub fn resolve(
    step: u32,
    routing: &Routing,
    outcome: Option<QrStatus>,
) -> Result<NextStep, DispatchError> {
    match routing {
        Routing::Linear => step
            .checked_add(1)
            .map(NextStep::Continue)
            .ok_or_else(|| CatalogError::NoLinearSuccessor { step }.into()),
        Routing::Branch { if_pass, if_fail } => match outcome {
            Some(QrStatus::Pass) => Ok(NextStep::Continue(*if_pass)),
            Some(QrStatus::Fail) => Ok(NextStep::Continue(*if_fail)),
            None => Err(ContractViolation::MissingOutcome { step }.into()),
        },
        Routing::Terminal => Ok(NextStep::Complete),
    }
}
