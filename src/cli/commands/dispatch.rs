use anyhow::Result;

use super::{resolve_workflow, Command};
use crate::config::StepDispatchConfig;
use crate::telemetry::{create_dispatch_span, generate_correlation_id};
use crate::workflows::{render, OutputFormat, QrState, QrStatus};

pub struct DispatchCommand {
    pub workflow: String,
    pub step: u32,
    pub total_steps: u32,
    pub qr: QrState,
    pub format: Option<OutputFormat>,
    pub config: StepDispatchConfig,
}

impl DispatchCommand {
    pub fn new(
        workflow: String,
        step: u32,
        total_steps: u32,
        qr_iteration: u32,
        qr_fail: bool,
        qr_status: Option<QrStatus>,
        config: StepDispatchConfig,
    ) -> Self {
        Self {
            workflow,
            step,
            total_steps,
            qr: QrState {
                iteration: qr_iteration,
                failed: qr_fail,
                status: qr_status,
            },
            format: None,
            config,
        }
    }

    pub fn with_format(mut self, format: Option<OutputFormat>) -> Self {
        self.format = format;
        self
    }

    /// Resolve the workflow, dispatch and render without printing
    pub fn run(&self) -> Result<String> {
        let correlation_id = generate_correlation_id();
        let span = create_dispatch_span(&self.workflow, self.step, self.total_steps, &correlation_id);
        let _guard = span.enter();

        let catalog = resolve_workflow(&self.workflow, &self.config)?;
        let dispatcher = self.config.dispatcher()?;
        let payload = dispatcher.dispatch(&catalog, self.step, self.total_steps, &self.qr)?;

        let format = self.format.unwrap_or(self.config.output.format);
        let rendered = render(&payload, format)?;
        tracing::debug!(format = %format, bytes = rendered.len(), "Rendered step payload");
        Ok(rendered)
    }
}

impl Command for DispatchCommand {
    fn execute(&self) -> Result<()> {
        let rendered = self.run()?;
        print!("{rendered}");
        Ok(())
    }
}
