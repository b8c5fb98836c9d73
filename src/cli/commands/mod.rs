use anyhow::{Context, Result};
use std::path::Path;

use crate::config::StepDispatchConfig;
use crate::workflows::{builtin, load_catalog, StepCatalog};

pub mod dispatch;
pub mod list;
pub mod show;
pub mod validate;

pub trait Command {
    fn execute(&self) -> Result<()>;
}

/// Find a workflow by built-in name, then file path, then `<search_dir>/<name>.toml`
pub fn resolve_workflow(workflow: &str, config: &StepDispatchConfig) -> Result<StepCatalog> {
    if let Some(catalog) = builtin::load(workflow) {
        return catalog.with_context(|| format!("Built-in workflow '{workflow}' is invalid"));
    }

    let path = Path::new(workflow);
    if path.is_file() {
        return load_catalog(path);
    }

    let candidate = config.workflows.search_dir.join(format!("{workflow}.toml"));
    if candidate.is_file() {
        return load_catalog(&candidate);
    }

    anyhow::bail!(
        "Unknown workflow '{}'. Built-ins: {}. Also searched {}",
        workflow,
        builtin::names().collect::<Vec<_>>().join(", "),
        candidate.display()
    )
}

pub fn show_how_to_dispatch() -> Result<()> {
    println!("step-dispatch - deterministic workflow step dispatch");
    println!();
    println!("To get started:");
    println!("  step-dispatch list                                   # Available workflows");
    println!("  step-dispatch show -w review-loop                    # Steps of a workflow");
    println!("  step-dispatch dispatch -w review-loop --step 1 --total-steps 6");
    println!();
    println!("Each step prints the command to run next. After a review, pass");
    println!("--qr-status pass|fail; fix passes carry --qr-fail and --qr-iteration.");
    Ok(())
}
