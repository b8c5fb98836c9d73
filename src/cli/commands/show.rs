use anyhow::Result;

use super::{resolve_workflow, Command};
use crate::config::StepDispatchConfig;
use crate::workflows::{Routing, StepCatalog};

pub struct ShowCommand {
    pub workflow: String,
    pub config: StepDispatchConfig,
}

impl ShowCommand {
    pub fn new(workflow: String, config: StepDispatchConfig) -> Self {
        Self { workflow, config }
    }

    pub fn run(&self) -> Result<String> {
        let catalog = resolve_workflow(&self.workflow, &self.config)?;
        Ok(describe(&catalog))
    }
}

/// Step table of a catalog, one line per step
pub fn describe(catalog: &StepCatalog) -> String {
    let mut out = format!(
        "{} (min {} total steps)\n",
        catalog.name(),
        catalog.min_total_steps()
    );
    if !catalog.description().is_empty() {
        out.push_str(&format!("{}\n", catalog.description()));
    }
    out.push('\n');

    for (number, step) in catalog.steps() {
        let next = match (&step.gate, &step.routing) {
            (Some(gate), _) => {
                let pass = gate
                    .pass_step
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "end".to_string());
                let fix = if gate.self_fix {
                    format!("self-fix by {}", gate.fix_role())
                } else {
                    "manual fix".to_string()
                };
                format!("gate '{}': pass -> {}, fail -> {} ({})", gate.review_name, pass, gate.work_step, fix)
            }
            (None, Routing::Linear) => match number.checked_add(1) {
                Some(successor) => format!("-> {successor}"),
                None => "-> (none)".to_string(),
            },
            (None, Routing::Branch { if_pass, if_fail }) => {
                format!("pass -> {if_pass}, fail -> {if_fail}")
            }
            (None, Routing::Terminal) => "end".to_string(),
        };
        let delegated = step
            .dispatch
            .as_ref()
            .map(|d| format!(" [delegates to {}]", d.agent))
            .unwrap_or_default();
        out.push_str(&format!("{number:>3}. {}{}  {}\n", step.title, delegated, next));
    }
    out
}

impl Command for ShowCommand {
    fn execute(&self) -> Result<()> {
        print!("{}", self.run()?);
        Ok(())
    }
}
