//! Trace events and the append-only trace log (v0.1)
//!
//! One observed run produces an ordered sequence of events:
//! - EventRecord: closed sum over the three observed kinds (Line/Call/Return)
//! - TraceLog: append-only log, single writer during recording
//! - verify_balanced: structural Call/Return pairing check

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TraceError;

/// Where an event originated in the traced program's source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

/// Snapshotted variable state: name -> display value, in declaration order.
pub type Bindings = Vec<(String, Value)>;

/// One observed control-flow event, immutable once recorded.
///
/// Bindings are copies taken at the moment the event fired; the live
/// execution context keeps changing afterwards and must never be read
/// again through an already-recorded event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventRecord {
    /// A source line is about to execute.
    ///
    /// `bindings` reflect the state *before* the line runs; an assignment
    /// on this line is not yet visible.
    Line {
        location: SourceLocation,
        /// Enclosing function name, or the `<anonymous>` placeholder.
        scope: String,
        /// Literal source text, trailing newline stripped. Empty when the
        /// source file could not be read.
        source_text: String,
        bindings: Bindings,
    },

    /// A scope (function, method, or synthetic comprehension body) is
    /// being entered. `bindings` are the parameters as bound at entry.
    Call {
        location: SourceLocation,
        scope: String,
        bindings: Bindings,
    },

    /// A scope is being exited. `return_value: None` is the distinguished
    /// "no value" marker, not an omission.
    Return {
        location: SourceLocation,
        scope: String,
        return_value: Option<Value>,
    },
}

impl EventRecord {
    pub fn location(&self) -> &SourceLocation {
        match self {
            Self::Line { location, .. }
            | Self::Call { location, .. }
            | Self::Return { location, .. } => location,
        }
    }

    pub fn scope(&self) -> &str {
        match self {
            Self::Line { scope, .. } | Self::Call { scope, .. } | Self::Return { scope, .. } => {
                scope
            }
        }
    }

    pub fn is_call(&self) -> bool {
        matches!(self, Self::Call { .. })
    }

    pub fn is_return(&self) -> bool {
        matches!(self, Self::Return { .. })
    }
}

/// Counts gathered while walking a trace log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraceStats {
    pub lines: usize,
    pub calls: usize,
    pub returns: usize,
    /// Deepest Call nesting reached, in scopes (not indent columns).
    pub max_depth: usize,
}

/// Append-only trace log, cheap-clone handle.
///
/// Exactly one writer (the recorder, one event at a time) during the
/// observation phase; read afterwards by the renderer. Records are never
/// mutated or reordered after `push`.
#[derive(Clone, Default)]
pub struct TraceLog {
    events: Arc<RwLock<Vec<EventRecord>>>,
}

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record, preserving chronological order.
    pub fn push(&self, event: EventRecord) {
        self.events.write().push(event);
    }

    /// All records, cloned in recording order.
    pub fn events(&self) -> Vec<EventRecord> {
        self.events.read().clone()
    }

    /// Single record by position, cloned.
    pub fn get(&self, index: usize) -> Option<EventRecord> {
        self.events.read().get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serialize to JSON for export/debugging.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self.events()).unwrap_or(Value::Null)
    }

    /// Verify the structural balance invariant: every Return closes a
    /// prior Call, and the totals match.
    ///
    /// A Return at depth 0 means event capture is broken upstream; it is
    /// reported, never clamped.
    pub fn verify_balanced(&self) -> Result<TraceStats, TraceError> {
        let mut stats = TraceStats::default();
        let mut depth = 0usize;

        for (index, event) in self.events.read().iter().enumerate() {
            match event {
                EventRecord::Line { .. } => stats.lines += 1,
                EventRecord::Call { .. } => {
                    stats.calls += 1;
                    depth += 1;
                    stats.max_depth = stats.max_depth.max(depth);
                }
                EventRecord::Return { scope, .. } => {
                    stats.returns += 1;
                    depth = depth.checked_sub(1).ok_or(TraceError::OrphanReturn {
                        index,
                        scope: scope.clone(),
                    })?;
                }
            }
        }

        if stats.calls != stats.returns {
            return Err(TraceError::UnbalancedTrace {
                calls: stats.calls,
                returns: stats.returns,
            });
        }
        Ok(stats)
    }
}

impl std::fmt::Debug for TraceLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceLog").field("len", &self.len()).finish()
    }
}
