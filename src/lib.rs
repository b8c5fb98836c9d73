// step-dispatch library - deterministic workflow step dispatch
// The engine lives in `workflows`; `cli`, `config` and `telemetry` embed it.

pub mod cli;
pub mod config;
pub mod telemetry;
pub mod workflows;

// Re-export key types for easy access
pub use config::StepDispatchConfig;
pub use telemetry::{create_dispatch_span, generate_correlation_id, init_telemetry};
pub use workflows::{
    CatalogError, ContractViolation, Dispatch, DispatchError, DispatchMode, Dispatcher, GateConfig,
    GateDecision, GateEvaluator, Invocation, NextInvocation, NextStep, OutputFormat, QrState,
    QrStatus, Routing, Step, StepCatalog, StepPayload, ITERATION_LIMIT,
};
