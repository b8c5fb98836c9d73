// Output renderer - turns a step payload into the text the caller reads
//
// Rendering must be byte-for-byte reproducible: no timestamps, no hash-ordered
// iteration, nothing derived from the environment.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::str::FromStr;
use thiserror::Error;

use super::types::{Dispatch, DispatchMode, FixRoute, Invocation, NextInvocation, StepPayload};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to serialize payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to format payload: {0}")]
    Format(#[from] fmt::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{other}', expected 'text' or 'json'")),
        }
    }
}

pub trait Renderer {
    fn render(&self, payload: &StepPayload) -> Result<String, RenderError>;
}

/// Tagged-markup rendering read by agents
#[derive(Debug, Default, Clone, Copy)]
pub struct TextRenderer;

/// Pretty JSON rendering for programmatic callers
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonRenderer;

pub fn render(payload: &StepPayload, format: OutputFormat) -> Result<String, RenderError> {
    match format {
        OutputFormat::Text => TextRenderer.render(payload),
        OutputFormat::Json => JsonRenderer.render(payload),
    }
}

impl Renderer for JsonRenderer {
    fn render(&self, payload: &StepPayload) -> Result<String, RenderError> {
        let mut out = serde_json::to_string_pretty(payload)?;
        out.push('\n');
        Ok(out)
    }
}

impl Renderer for TextRenderer {
    fn render(&self, payload: &StepPayload) -> Result<String, RenderError> {
        let mut out = String::new();

        writeln!(
            out,
            "<step_header workflow=\"{}\" step=\"{}\" total=\"{}\">{}</step_header>",
            escape(&payload.workflow),
            payload.step,
            payload.total_steps,
            escape(&payload.title)
        )?;

        if payload.is_first_step && !payload.overview.is_empty() {
            writeln!(out)?;
            writeln!(out, "<workflow_overview>")?;
            for (number, title) in &payload.overview {
                writeln!(out, "  {number}. {}", escape(title))?;
            }
            writeln!(out, "</workflow_overview>")?;
        }

        if let Some(message) = &payload.gate_message {
            writeln!(out)?;
            render_gate(&mut out, message, payload.fix_route.as_ref())?;
        }

        if !payload.actions.is_empty() {
            writeln!(out)?;
            writeln!(out, "<current_action>")?;
            for action in &payload.actions {
                write_indented(&mut out, action, "  ")?;
            }
            writeln!(out, "</current_action>")?;
        }

        if let Some(dispatch) = &payload.dispatch {
            writeln!(out)?;
            render_dispatch(&mut out, dispatch)?;
        }

        writeln!(out)?;
        render_next(&mut out, &payload.invoke, &payload.next)?;

        Ok(out)
    }
}

fn render_gate(out: &mut String, message: &str, route: Option<&FixRoute>) -> fmt::Result {
    match route {
        Some(FixRoute::SelfFix { role }) => writeln!(
            out,
            "<gate_result fix=\"self\" role=\"{}\">{}</gate_result>",
            escape(role),
            escape(message)
        ),
        Some(FixRoute::Manual) => writeln!(
            out,
            "<gate_result fix=\"manual\">{}</gate_result>",
            escape(message)
        ),
        None => writeln!(out, "<gate_result>{}</gate_result>", escape(message)),
    }
}

fn render_dispatch(out: &mut String, dispatch: &Dispatch) -> fmt::Result {
    writeln!(
        out,
        "<dispatch agent=\"{}\" script=\"{}\" total_steps=\"{}\" mode=\"{}\">",
        escape(&dispatch.agent),
        escape(&dispatch.script),
        dispatch.total_steps,
        dispatch.mode
    )?;
    for (name, value) in &dispatch.context {
        writeln!(
            out,
            "  <context name=\"{}\">{}</context>",
            escape(name),
            escape(value)
        )?;
    }
    let instruction = match dispatch.mode {
        DispatchMode::Script => format!(
            "Launch the {} agent. It must run {} starting at step 1 of {} and follow each step exactly.",
            dispatch.agent, dispatch.script, dispatch.total_steps
        ),
        DispatchMode::FreeForm => format!(
            "Delegate to the {} agent with the context above; it may work free-form.",
            dispatch.agent
        ),
    };
    writeln!(out, "  <instruction>{}</instruction>", escape(&instruction))?;
    writeln!(out, "</dispatch>")
}

fn render_next(out: &mut String, invoke: &str, next: &NextInvocation) -> fmt::Result {
    match next {
        NextInvocation::Step { invocation } => {
            writeln!(out, "<invoke_after>")?;
            writeln!(out, "  {}", command(invoke, invocation))?;
            writeln!(out, "</invoke_after>")
        }
        NextInvocation::Branch { if_pass, if_fail } => {
            writeln!(out, "<invoke_after>")?;
            writeln!(out, "  <if_pass>{}</if_pass>", command(invoke, if_pass))?;
            writeln!(out, "  <if_fail>{}</if_fail>", command(invoke, if_fail))?;
            writeln!(out, "</invoke_after>")
        }
        NextInvocation::Complete => writeln!(
            out,
            "<workflow_complete>No further invocation. The workflow is finished.</workflow_complete>"
        ),
        NextInvocation::Escalate {
            review_name,
            iterations,
        } => writeln!(
            out,
            "<escalation review=\"{}\" iterations=\"{}\">STOP. Do not invoke another step; report to the user and wait for manual intervention.</escalation>",
            escape(review_name),
            iterations
        ),
    }
}

fn command(invoke: &str, invocation: &Invocation) -> String {
    escape(&invocation.command(invoke))
}

fn write_indented(out: &mut String, text: &str, indent: &str) -> fmt::Result {
    for line in text.lines() {
        if line.trim().is_empty() {
            writeln!(out)?;
        } else {
            writeln!(out, "{indent}{}", escape(line.trim_end()))?;
        }
    }
    Ok(())
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
