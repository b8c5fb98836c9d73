use anyhow::Result;
use clap::Parser;

use step_dispatch::cli::commands::dispatch::DispatchCommand;
use step_dispatch::cli::commands::list::ListCommand;
use step_dispatch::cli::commands::show::ShowCommand;
use step_dispatch::cli::commands::validate::ValidateCommand;
use step_dispatch::cli::commands::{show_how_to_dispatch, Command};
use step_dispatch::cli::{Cli, Commands};
use step_dispatch::{init_telemetry, StepDispatchConfig};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env before the config so STEP_DISPATCH_* values from it apply
    let env_file_loaded = StepDispatchConfig::load_env_file()?;
    let config = StepDispatchConfig::load(cli.config.as_deref())?;
    init_telemetry(&config.observability)?;
    if env_file_loaded {
        tracing::info!("Loaded environment variables from .env file");
    }

    match cli.command {
        None => show_how_to_dispatch(),
        Some(Commands::Dispatch {
            workflow,
            step,
            total_steps,
            qr_iteration,
            qr_fail,
            qr_status,
            format,
        }) => DispatchCommand::new(workflow, step, total_steps, qr_iteration, qr_fail, qr_status, config)
            .with_format(format)
            .execute(),
        Some(Commands::List) => ListCommand::new(config).execute(),
        Some(Commands::Show { workflow }) => ShowCommand::new(workflow, config).execute(),
        Some(Commands::Validate { path }) => ValidateCommand::new(path).execute(),
    }
}
