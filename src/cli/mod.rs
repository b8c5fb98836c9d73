use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::workflows::{OutputFormat, QrStatus};

pub mod commands;

#[derive(Parser)]
#[command(name = "step-dispatch")]
#[command(about = "Deterministic step dispatch for looping review workflows")]
#[command(long_about = "step-dispatch prints the instructions for one workflow step and the exact \
                       command to run next, routing failed quality reviews back to their fix step \
                       until they pass or hit the iteration limit. Start with 'step-dispatch list'.")]
pub struct Cli {
    /// Configuration file (defaults to ./step-dispatch.toml when present)
    #[arg(long, global = true, help = "Path to a step-dispatch configuration file")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the current step and the next invocation
    Dispatch {
        /// Built-in workflow name, catalog file path, or name in the search dir
        #[arg(long, short = 'w', help = "Workflow to dispatch")]
        workflow: String,
        /// Current step number (1-based)
        #[arg(long, help = "Step to render")]
        step: u32,
        /// Total steps of this workflow run
        #[arg(long, help = "Total steps of the workflow run")]
        total_steps: u32,
        /// Quality review iteration, starting at 1
        #[arg(long, default_value = "1", help = "Review iteration carried from the previous call")]
        qr_iteration: u32,
        /// This call is a fix pass after a failed review
        #[arg(long, help = "Mark this call as a fix pass after a failed review")]
        qr_fail: bool,
        /// Result of the review that just ran
        #[arg(long, help = "Review result: pass or fail")]
        qr_status: Option<QrStatus>,
        /// Output format override
        #[arg(long, help = "Output format: text or json")]
        format: Option<OutputFormat>,
    },
    /// List built-in workflows and catalogs in the search directory
    List,
    /// Show the steps of a workflow
    Show {
        #[arg(long, short = 'w', help = "Workflow to show")]
        workflow: String,
    },
    /// Load and validate a workflow catalog file
    Validate {
        /// Path to a TOML catalog
        path: PathBuf,
    },
}
