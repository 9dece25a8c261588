//! Capture replay facility (v0.1)
//!
//! One concrete implementation of the observation boundary: a capture
//! file holds the raw event stream exactly as a facility saw it, and
//! replaying it fires the same three callbacks in recorded order. This
//! is what makes the CLI usable end-to-end without linking against a
//! live runtime.
//!
//! Capture format: a JSON array of tagged raw events, e.g.
//!
//! ```json
//! [
//!   {"type": "call", "file": "hdbg/demo.py", "line": 1, "scope": "f",
//!    "bindings": [{"name": "x", "kind": "data", "value": 1}]},
//!   {"type": "return", "file": "hdbg/demo.py", "line": 2, "scope": "f",
//!    "value": 1}
//! ]
//! ```

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TraceError;
use crate::event::SourceLocation;
use crate::frame::{BindingValue, ExecutionObserver, FrameView};

/// One raw event as the facility reported it, before filtering and
/// snapshotting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawEvent {
    Line {
        file: String,
        line: u32,
        #[serde(default)]
        scope: Option<String>,
        #[serde(default)]
        bindings: Vec<RawBinding>,
    },
    Call {
        file: String,
        line: u32,
        #[serde(default)]
        scope: Option<String>,
        #[serde(default)]
        bindings: Vec<RawBinding>,
    },
    Return {
        file: String,
        line: u32,
        #[serde(default)]
        scope: Option<String>,
        #[serde(default)]
        value: Option<Value>,
    },
}

/// One recorded live binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawBinding {
    pub name: String,
    #[serde(flatten)]
    pub value: RawValue,
}

impl RawBinding {
    pub fn data(name: &str, value: Value) -> Self {
        Self {
            name: name.into(),
            value: RawValue::Data { value },
        }
    }
}

/// Recorded form of a live value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawValue {
    /// Plain data.
    Data { value: Value },
    /// An invocable; only its display name was recorded. The field is
    /// `display` rather than `name` because `name` is taken by the
    /// enclosing binding.
    Callable { display: String },
    /// A single-use iteration source; replays as one.
    Iter { items: Vec<Value> },
}

enum SlotState {
    Data(Value),
    Callable(String),
    /// `None` once the single-use source has been drained.
    Iter(Option<Vec<Value>>),
}

/// [`FrameView`] over one raw event.
///
/// Iteration sources behave like the live ones they stand in for: they
/// can be drained exactly once, and `materialize_iter` rebinds a
/// replenished copy just as it would against a real runtime.
pub struct ReplayFrame {
    location: SourceLocation,
    scope: Option<String>,
    slots: Vec<(String, SlotState)>,
}

impl ReplayFrame {
    pub fn new(file: &str, line: u32, scope: Option<&str>, bindings: &[RawBinding]) -> Self {
        let slots = bindings
            .iter()
            .map(|binding| {
                let state = match &binding.value {
                    RawValue::Data { value } => SlotState::Data(value.clone()),
                    RawValue::Callable { display } => SlotState::Callable(display.clone()),
                    RawValue::Iter { items } => SlotState::Iter(Some(items.clone())),
                };
                (binding.name.clone(), state)
            })
            .collect();
        Self {
            location: SourceLocation::new(file, line),
            scope: scope.map(str::to_string),
            slots,
        }
    }
}

impl FrameView for ReplayFrame {
    fn location(&self) -> SourceLocation {
        self.location.clone()
    }

    fn scope_name(&self) -> Option<String> {
        self.scope.clone()
    }

    fn bindings(&self) -> Vec<(String, BindingValue)> {
        self.slots
            .iter()
            .map(|(name, state)| {
                let value = match state {
                    SlotState::Data(value) => BindingValue::Data(value.clone()),
                    SlotState::Callable(name) => BindingValue::Callable(name.clone()),
                    SlotState::Iter(_) => BindingValue::IterSource,
                };
                (name.clone(), value)
            })
            .collect()
    }

    fn materialize_iter(&mut self, name: &str) -> Option<Vec<Value>> {
        let slot = self.slots.iter_mut().find(|(n, _)| n == name)?;
        match &mut slot.1 {
            SlotState::Iter(source) => {
                let items = source.take()?;
                // Rebind a replenished copy so the replayed computation
                // can still consume the sequence.
                slot.1 = SlotState::Iter(Some(items.clone()));
                Some(items)
            }
            _ => None,
        }
    }
}

/// A parsed capture: the facility's raw event stream for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capture {
    events: Vec<RawEvent>,
}

impl Capture {
    pub fn from_path(path: &Path) -> Result<Self, TraceError> {
        fs::read_to_string(path)?.parse()
    }

    pub fn events(&self) -> &[RawEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Fire one raw event at the observer, building the frame the
    /// callback sees.
    pub fn fire(event: &RawEvent, observer: &mut dyn ExecutionObserver) {
        match event {
            RawEvent::Line {
                file,
                line,
                scope,
                bindings,
            } => {
                let frame = ReplayFrame::new(file, *line, scope.as_deref(), bindings);
                observer.on_line(&frame);
            }
            RawEvent::Call {
                file,
                line,
                scope,
                bindings,
            } => {
                let mut frame = ReplayFrame::new(file, *line, scope.as_deref(), bindings);
                observer.on_call(&mut frame);
            }
            RawEvent::Return {
                file,
                line,
                scope,
                value,
            } => {
                let frame = ReplayFrame::new(file, *line, scope.as_deref(), &[]);
                observer.on_return(&frame, value.clone());
            }
        }
    }

    /// Replay the whole stream in recorded order.
    pub fn drive(&self, observer: &mut dyn ExecutionObserver) {
        for event in &self.events {
            Self::fire(event, observer);
        }
    }
}

impl FromStr for Capture {
    type Err = TraceError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(text)?)
    }
}
