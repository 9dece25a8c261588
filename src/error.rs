//! Error types with fix suggestions (v0.1)

use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TRC-010: Capture parse error: {0}")]
    CaptureParse(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Structural-invariant violations (TRC-020 to TRC-022)
    // ─────────────────────────────────────────────────────────────
    #[error("TRC-020: Indent underflow at event {index}: RET from '{scope}' with no open CALL")]
    IndentUnderflow { index: usize, scope: String },

    #[error("TRC-021: Unbalanced trace: {calls} CALL events vs {returns} RET events")]
    UnbalancedTrace { calls: usize, returns: usize },

    #[error("TRC-022: RET from '{scope}' at event {index} closes no prior CALL")]
    OrphanReturn { index: usize, scope: String },
}

impl FixSuggestion for TraceError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            TraceError::Io(_) => Some("Check the capture file path and permissions"),
            TraceError::CaptureParse(_) => {
                Some("Ensure the capture is a JSON array of raw trace events")
            }
            TraceError::IndentUnderflow { .. } | TraceError::OrphanReturn { .. } => {
                Some("Event capture is corrupt - re-record the trace from a clean run")
            }
            TraceError::UnbalancedTrace { .. } => {
                Some("The observed run was likely truncated - re-record the trace to completion")
            }
        }
    }
}
