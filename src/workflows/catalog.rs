// Step catalog - the static, read-only step definitions of one workflow

use std::collections::BTreeMap;

use super::errors::CatalogError;
use super::types::{Routing, Step};

/// Ordered step definitions plus the metadata needed to render invocations.
///
/// Built once at startup and shared by reference; nothing mutates it after
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCatalog {
    name: String,
    description: String,
    invoke: String,
    min_total_steps: Option<u32>,
    steps: BTreeMap<u32, Step>,
}

impl StepCatalog {
    pub fn new(name: impl Into<String>, invoke: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            invoke: invoke.into(),
            min_total_steps: None,
            steps: BTreeMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_min_total_steps(mut self, minimum: u32) -> Self {
        self.min_total_steps = Some(minimum);
        self
    }

    pub fn with_step(mut self, number: u32, step: Step) -> Self {
        self.steps.insert(number, step);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Command prefix of every rendered next invocation
    pub fn invoke(&self) -> &str {
        &self.invoke
    }

    pub fn get(&self, number: u32) -> Option<&Step> {
        self.steps.get(&number)
    }

    pub fn contains(&self, number: u32) -> bool {
        self.steps.contains_key(&number)
    }

    /// Steps in ascending step-number order
    pub fn steps(&self) -> impl Iterator<Item = (u32, &Step)> {
        self.steps.iter().map(|(number, step)| (*number, step))
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn last_step(&self) -> Option<u32> {
        self.steps.keys().next_back().copied()
    }

    /// Smallest total step count a caller may pass.
    ///
    /// Falls back to the highest defined step number when the workflow does
    /// not declare one.
    pub fn min_total_steps(&self) -> u32 {
        self.min_total_steps
            .unwrap_or_else(|| self.last_step().unwrap_or(0))
    }

    /// Check that every step number referenced by `number` resolves.
    ///
    /// The dispatcher runs this for the current step on every call, so a
    /// catalog built in code without `validate` still fails loudly.
    pub fn check_references(&self, number: u32) -> Result<(), CatalogError> {
        let Some(step) = self.get(number) else {
            return Ok(());
        };

        if let Some(gate) = &step.gate {
            if gate.work_step == number {
                return Err(CatalogError::GateLoopsToItself {
                    workflow: self.name.clone(),
                    step: number,
                });
            }
            self.require(number, "gate.work_step", gate.work_step)?;
            if let Some(pass_step) = gate.pass_step {
                self.require(number, "gate.pass_step", pass_step)?;
            }
            // Gates decide their own successor; routing is not consulted.
            return Ok(());
        }

        match step.routing {
            Routing::Linear => match number.checked_add(1) {
                Some(successor) => self.require(number, "linear successor", successor),
                None => Err(CatalogError::NoLinearSuccessor { step: number }),
            },
            Routing::Branch { if_pass, if_fail } => {
                self.require(number, "branch.if_pass", if_pass)?;
                self.require(number, "branch.if_fail", if_fail)
            }
            Routing::Terminal => Ok(()),
        }
    }

    /// Whole-catalog validation, run when a catalog is loaded
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.steps.is_empty() {
            return Err(CatalogError::EmptyCatalog {
                workflow: self.name.clone(),
            });
        }
        if self.steps.contains_key(&0) {
            return Err(CatalogError::InvalidStepNumber {
                workflow: self.name.clone(),
            });
        }

        let count = self.steps.len() as u32;
        if let Some(missing) = (1..=count).find(|n| !self.steps.contains_key(n)) {
            return Err(CatalogError::NonContiguousSteps {
                workflow: self.name.clone(),
                count,
                missing,
            });
        }

        if let Some(minimum) = self.min_total_steps {
            if minimum > count {
                return Err(CatalogError::MinimumExceedsCatalog {
                    workflow: self.name.clone(),
                    minimum,
                    count,
                });
            }
        }

        for number in self.steps.keys() {
            self.check_references(*number)?;
        }

        // Nothing emits a call into step 1, so it cannot wait for an outcome.
        if self.get(1).is_some_and(Step::needs_outcome) {
            return Err(CatalogError::EntryNeedsOutcome {
                workflow: self.name.clone(),
            });
        }

        tracing::debug!(workflow = %self.name, steps = count, "Catalog validated");
        Ok(())
    }

    fn require(&self, step: u32, field: &'static str, target: u32) -> Result<(), CatalogError> {
        if self.contains(target) {
            Ok(())
        } else {
            Err(CatalogError::DanglingReference {
                workflow: self.name.clone(),
                step,
                field,
                target,
            })
        }
    }
}
