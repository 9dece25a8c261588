//! Indent-stack renderer (v0.1)
//!
//! Walks the trace log top to bottom and emits one formatted line per
//! event, with indentation tracking call depth. State is a single indent
//! counter, so the same renderer serves both the buffered two-phase flow
//! and streaming (render each event as it is recorded).

use std::io;

use colored::Colorize;
use serde_json::Value;

use crate::error::TraceError;
use crate::event::{Bindings, EventRecord, TraceLog};

/// Indent columns added per call level.
pub const INDENT_STEP: usize = 2;

/// Display form of one value: strings bare, everything else compact JSON.
pub fn fmt_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn fmt_bindings(bindings: &Bindings) -> String {
    bindings
        .iter()
        .map(|(name, value)| format!("{}={}", name, fmt_value(value)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn fmt_return(value: &Option<Value>) -> String {
    match value {
        Some(value) => fmt_value(value),
        None => "<void>".to_string(),
    }
}

/// Stateful event-to-text renderer.
///
/// Indent discipline: a Call line is emitted at the caller's indent and
/// *then* deepens; a Return shallows *first* and is emitted at the
/// decreased indent. Call/Return pairs therefore align at the same
/// column, with the events between them one level deeper.
#[derive(Debug, Default)]
pub struct Renderer {
    indent: usize,
    position: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    /// Render one event and advance the indent state.
    ///
    /// A Return with no open Call is a broken recording, not a render
    /// concern; it surfaces as [`TraceError::IndentUnderflow`] instead of
    /// being clamped, since clamping would hide the capture bug.
    pub fn render_event(&mut self, event: &EventRecord) -> Result<String, TraceError> {
        let rendered = match event {
            EventRecord::Line {
                location,
                source_text,
                bindings,
                ..
            } => format!(
                "{} {}{} {}  {}",
                format!("{:>4}", location.line).yellow(),
                " ".repeat(self.indent),
                "LINE:".green(),
                source_text.trim().blue(),
                format!("locals: ({})", fmt_bindings(bindings)).green(),
            ),

            EventRecord::Call {
                location,
                scope,
                bindings,
            } => {
                let text = format!(
                    "{} {}{} {}{}",
                    format!("{:>4}", location.line).yellow(),
                    " ".repeat(self.indent),
                    "CALL:".magenta(),
                    scope,
                    format!("({})", fmt_bindings(bindings)).red(),
                );
                self.indent += INDENT_STEP;
                text
            }

            EventRecord::Return {
                location,
                scope,
                return_value,
            } => {
                self.indent = self.indent.checked_sub(INDENT_STEP).ok_or_else(|| {
                    TraceError::IndentUnderflow {
                        index: self.position,
                        scope: scope.clone(),
                    }
                })?;
                format!(
                    "{} {}{} {} {}",
                    format!("{:>4}", location.line).yellow(),
                    " ".repeat(self.indent),
                    "RET :".cyan(),
                    scope,
                    format!("({})", fmt_return(return_value)).red(),
                )
            }
        };

        self.position += 1;
        Ok(rendered)
    }

    /// Buffered phase-two driver: render the whole log to `out`.
    pub fn render_all(&mut self, log: &TraceLog, out: &mut impl io::Write) -> Result<(), TraceError> {
        for event in log.events() {
            writeln!(out, "{}", self.render_event(&event)?)?;
        }
        Ok(())
    }
}
