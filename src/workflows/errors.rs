use thiserror::Error;

/// The caller omitted required state or asked for a step that cannot run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    #[error("step {step} is out of range 1..={total_steps}")]
    StepOutOfRange { step: u32, total_steps: u32 },
    #[error("workflow '{workflow}' needs at least {minimum} total steps, got {total_steps}")]
    TotalStepsBelowMinimum {
        workflow: String,
        minimum: u32,
        total_steps: u32,
    },
    #[error("step {step} does not exist in workflow '{workflow}'")]
    UnknownStep { workflow: String, step: u32 },
    #[error("QR iteration must start at 1, got {iteration}")]
    InvalidIteration { iteration: u32 },
    #[error("step {step} is a gate for review '{review_name}' and requires --qr-status pass|fail")]
    MissingGateStatus { step: u32, review_name: String },
    #[error("step {step} branches on a review outcome and requires --qr-status pass|fail")]
    MissingOutcome { step: u32 },
}

/// The step catalog cannot support the requested call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("workflow '{workflow}' has no steps")]
    EmptyCatalog { workflow: String },
    #[error("workflow '{workflow}': step numbers start at 1, found step 0")]
    InvalidStepNumber { workflow: String },
    #[error("workflow '{workflow}': steps must be numbered 1..={count} without gaps, missing step {missing}")]
    NonContiguousSteps {
        workflow: String,
        count: u32,
        missing: u32,
    },
    #[error("workflow '{workflow}': step {step} {field} points to step {target}, which does not exist")]
    DanglingReference {
        workflow: String,
        step: u32,
        field: &'static str,
        target: u32,
    },
    #[error("step {step} routes linearly but no step number follows it")]
    NoLinearSuccessor { step: u32 },
    #[error("workflow '{workflow}': step 1 waits for a reported outcome, so the workflow has no entry call")]
    EntryNeedsOutcome { workflow: String },
    #[error("workflow '{workflow}': gate at step {step} sends fixes back to itself")]
    GateLoopsToItself { workflow: String, step: u32 },
    #[error("workflow '{workflow}': min_total_steps {minimum} exceeds the {count} defined steps")]
    MinimumExceedsCatalog {
        workflow: String,
        minimum: u32,
        count: u32,
    },
    #[error("iteration limit must be at least 1")]
    ZeroIterationLimit,
    #[error("failed to parse workflow catalog: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("caller contract violation: {0}")]
    Contract(#[from] ContractViolation),
    #[error("configuration error: {0}")]
    Configuration(#[from] CatalogError),
}

impl DispatchError {
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, DispatchError::Contract(_))
    }

    pub fn is_configuration_error(&self) -> bool {
        matches!(self, DispatchError::Configuration(_))
    }
}

impl From<toml::de::Error> for CatalogError {
    fn from(err: toml::de::Error) -> Self {
        CatalogError::Parse(err.to_string())
    }
}
