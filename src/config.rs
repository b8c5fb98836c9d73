use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::workflows::{Dispatcher, OutputFormat, ITERATION_LIMIT};

/// Main configuration structure for step-dispatch
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StepDispatchConfig {
    /// Gate policy
    pub dispatch: DispatchConfig,
    /// Payload rendering
    pub output: OutputConfig,
    /// Where named workflow catalogs are looked up
    pub workflows: WorkflowsConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Failed reviews allowed before a gate escalates
    pub iteration_limit: u32,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            iteration_limit: ITERATION_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkflowsConfig {
    /// Directory holding `<name>.toml` catalogs
    pub search_dir: PathBuf,
}

impl Default for WorkflowsConfig {
    fn default() -> Self {
        Self {
            search_dir: PathBuf::from("workflows"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level, overridden by RUST_LOG
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            json_logs: false,
        }
    }
}

pub const DEFAULT_CONFIG_FILE: &str = "step-dispatch.toml";

impl StepDispatchConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (`explicit` path, else step-dispatch.toml if present)
    /// 3. Environment variables (prefixed with STEP_DISPATCH_, `__` between sections)
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        match explicit {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Configuration file {} does not exist", path.display());
                }
                builder = builder.add_source(File::from(path));
            }
            None => {
                if Path::new(DEFAULT_CONFIG_FILE).exists() {
                    builder = builder.add_source(File::from(Path::new(DEFAULT_CONFIG_FILE)));
                }
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("STEP_DISPATCH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: StepDispatchConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.dispatch.iteration_limit == 0 {
            anyhow::bail!("dispatch.iteration_limit must be at least 1");
        }
        Ok(())
    }

    /// Dispatcher honoring the configured gate policy
    pub fn dispatcher(&self) -> Result<Dispatcher> {
        Ok(Dispatcher::with_iteration_limit(self.dispatch.iteration_limit)?)
    }

    /// Load .env file if it exists, reporting whether one was read.
    ///
    /// Runs before logging is set up, so the caller logs the result.
    pub fn load_env_file() -> Result<bool> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            return Ok(true);
        }
        Ok(false)
    }
}
