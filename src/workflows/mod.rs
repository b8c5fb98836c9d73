// Workflow step dispatch
//
// Catalog lookup -> gate evaluation (gate steps) or routing -> payload -> render.
// Nothing here keeps state between calls.

pub mod builtin;
pub mod catalog;
pub mod dispatcher;
pub mod errors;
pub mod gate;
pub mod loader;
pub mod render;
pub mod routing;
pub mod types;

pub use catalog::StepCatalog;
pub use dispatcher::Dispatcher;
pub use errors::{CatalogError, ContractViolation, DispatchError};
pub use gate::{GateDecision, GateEvaluator, ITERATION_LIMIT};
pub use loader::{load_catalog, parse_catalog};
pub use render::{render, OutputFormat, RenderError, Renderer};
pub use types::{
    Dispatch, DispatchMode, FixRoute, GateConfig, Invocation, NextInvocation, NextStep, QrState,
    QrStatus, Routing, Step, StepPayload,
};
