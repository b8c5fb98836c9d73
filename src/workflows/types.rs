// Core types for the step dispatch engine

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Role that performs fixes when a self-fix gate names no explicit target
pub const DEFAULT_FIX_ROLE: &str = "developer";

/// How a step hands control to its successor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Routing {
    /// Advance to step + 1
    #[default]
    Linear,
    /// Pick a successor from the pass/fail outcome of the current call
    Branch { if_pass: u32, if_fail: u32 },
    /// No successor, the workflow ends here
    Terminal,
}

/// Whether a delegated sub-agent must follow its script or may work free-form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    #[default]
    Script,
    FreeForm,
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchMode::Script => write!(f, "script"),
            DispatchMode::FreeForm => write!(f, "free_form"),
        }
    }
}

/// Delegation of a step to a specialized sub-agent.
///
/// The engine never interprets this; it travels verbatim into the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispatch {
    /// Role identifier of the sub-agent
    pub agent: String,
    /// Script or workflow the sub-agent runs
    pub script: String,
    /// Step count of the delegated workflow
    pub total_steps: u32,
    /// Named context values handed to the sub-agent
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    #[serde(default)]
    pub mode: DispatchMode,
}

/// One verification checkpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Which review this gate evaluates
    pub review_name: String,
    /// Step to return to when the review fails
    pub work_step: u32,
    /// Step to advance to when the review passes; absent means the workflow ends
    #[serde(default)]
    pub pass_step: Option<u32>,
    pub pass_message: String,
    /// Route failures to an agent (true) or to a human (false)
    pub self_fix: bool,
    #[serde(default)]
    pub fix_target: Option<String>,
}

impl GateConfig {
    pub fn fix_role(&self) -> &str {
        self.fix_target.as_deref().unwrap_or(DEFAULT_FIX_ROLE)
    }
}

/// One unit of work in a workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub title: String,
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default)]
    pub routing: Routing,
    #[serde(default)]
    pub dispatch: Option<Dispatch>,
    #[serde(default)]
    pub gate: Option<GateConfig>,
}

impl Step {
    pub fn new(title: impl Into<String>, routing: Routing) -> Self {
        Self {
            title: title.into(),
            actions: Vec::new(),
            routing,
            dispatch: None,
            gate: None,
        }
    }

    pub fn with_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions = actions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    pub fn with_gate(mut self, gate: GateConfig) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn is_gate(&self) -> bool {
        self.gate.is_some()
    }

    /// Gates and branch steps can only be entered with `--qr-status`
    pub fn needs_outcome(&self) -> bool {
        self.is_gate() || matches!(self.routing, Routing::Branch { .. })
    }
}

/// Result of a quality review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QrStatus {
    Pass,
    Fail,
}

impl fmt::Display for QrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QrStatus::Pass => write!(f, "pass"),
            QrStatus::Fail => write!(f, "fail"),
        }
    }
}

impl std::str::FromStr for QrStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pass" => Ok(QrStatus::Pass),
            "fail" => Ok(QrStatus::Fail),
            other => Err(format!("invalid QR status '{other}', expected 'pass' or 'fail'")),
        }
    }
}

/// Verification state supplied by the caller on every call.
///
/// `failed` says why a step is being entered (a fix pass after a failed
/// review); `status` is the result the previous review produced. Gate steps
/// only look at `status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrState {
    pub iteration: u32,
    pub failed: bool,
    pub status: Option<QrStatus>,
}

impl Default for QrState {
    fn default() -> Self {
        Self::fresh()
    }
}

impl QrState {
    /// First pass through a workflow: iteration 1, no failure, no result
    pub fn fresh() -> Self {
        Self {
            iteration: 1,
            failed: false,
            status: None,
        }
    }

    pub fn with_status(mut self, status: QrStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_iteration(mut self, iteration: u32) -> Self {
        self.iteration = iteration;
        self
    }

    pub fn fix_pass(mut self) -> Self {
        self.failed = true;
        self
    }
}

/// Successor decided by routing or a gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "step", rename_all = "snake_case")]
pub enum NextStep {
    Continue(u32),
    Complete,
}

/// A concrete call the caller should issue next
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    pub step: u32,
    pub total_steps: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_iteration: Option<u32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub qr_fail: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_status: Option<QrStatus>,
}

impl Invocation {
    pub fn new(step: u32, total_steps: u32) -> Self {
        Self {
            step,
            total_steps,
            qr_iteration: None,
            qr_fail: false,
            qr_status: None,
        }
    }

    /// Carry the caller's loop position forward so the next gate sees the real count
    pub fn carrying(mut self, qr: &QrState) -> Self {
        if qr.iteration > 1 {
            self.qr_iteration = Some(qr.iteration);
        }
        self.qr_fail = qr.failed;
        self
    }

    pub fn with_status(mut self, status: QrStatus) -> Self {
        self.qr_status = Some(status);
        self
    }

    /// Command-line arguments for this invocation, in a fixed order
    pub fn args(&self) -> String {
        let mut args = format!("--step {} --total-steps {}", self.step, self.total_steps);
        if let Some(iteration) = self.qr_iteration {
            args.push_str(&format!(" --qr-iteration {iteration}"));
        }
        if self.qr_fail {
            args.push_str(" --qr-fail");
        }
        if let Some(status) = self.qr_status {
            args.push_str(&format!(" --qr-status {status}"));
        }
        args
    }

    pub fn command(&self, invoke: &str) -> String {
        format!("{invoke} {}", self.args())
    }
}

/// What the caller does after finishing the current step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NextInvocation {
    /// Single next-step reference
    Step { invocation: Invocation },
    /// Report a review result by picking one of two calls
    Branch { if_pass: Invocation, if_fail: Invocation },
    /// Workflow finished normally
    Complete,
    /// Iteration limit hit; a human has to take over
    Escalate { review_name: String, iterations: u32 },
}

impl NextInvocation {
    pub fn is_terminal(&self) -> bool {
        matches!(self, NextInvocation::Complete | NextInvocation::Escalate { .. })
    }
}

/// Whether a failed review goes back to an agent or to a human
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FixRoute {
    SelfFix { role: String },
    Manual,
}

/// Everything the caller needs for one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepPayload {
    pub workflow: String,
    pub invoke: String,
    pub step: u32,
    pub total_steps: u32,
    pub is_first_step: bool,
    pub title: String,
    pub actions: Vec<String>,
    /// Step titles in catalog order, filled on the first step only
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub overview: Vec<(u32, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gate_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_route: Option<FixRoute>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispatch: Option<Dispatch>,
    pub next: NextInvocation,
}
