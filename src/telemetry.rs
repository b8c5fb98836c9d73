use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::ObservabilityConfig;

/// Initialize structured logging.
///
/// Logs go to stderr; stdout carries only the rendered payload so callers
/// can pipe it straight into an agent. RUST_LOG wins over the configured level.
pub fn init_telemetry(observability: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&observability.log_level))
        .map_err(|e| anyhow::anyhow!("Invalid log level '{}': {}", observability.log_level, e))?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = if observability.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    result.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!("step-dispatch telemetry initialized");
    Ok(())
}

/// Generate a correlation ID for linking the log lines of one call
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span wrapping one dispatch call
pub fn create_dispatch_span(
    workflow: &str,
    step: u32,
    total_steps: u32,
    correlation_id: &str,
) -> tracing::Span {
    tracing::info_span!(
        "dispatch",
        workflow = workflow,
        step = step,
        total_steps = total_steps,
        correlation.id = correlation_id,
    )
}
