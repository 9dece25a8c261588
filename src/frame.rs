//! Observation-facility boundary (v0.1)
//!
//! The facility that pauses the traced program and reports control-flow
//! events is an external collaborator. This module is the whole contract
//! with it: a read view over the paused execution context ([`FrameView`])
//! and the three callbacks it fires ([`ExecutionObserver`]).
//!
//! The core never reflects over live program state directly; everything
//! it sees arrives through these two traits as plain name -> value data.

use serde_json::Value;

use crate::event::SourceLocation;

/// What the facility reports for one live binding.
#[derive(Debug, Clone, PartialEq)]
pub enum BindingValue {
    /// Plain displayable data, already copied out of the live context.
    Data(Value),
    /// An invocable (function, method, callable object); only its display
    /// name is surfaced. Excluded from snapshots.
    Callable(String),
    /// A single-use iteration source. Opaque: reading it would consume
    /// it, so it is only reachable through
    /// [`FrameView::materialize_iter`].
    IterSource,
}

/// Read access to the execution context paused at an event.
pub trait FrameView {
    fn location(&self) -> SourceLocation;

    /// Name of the scope being executed, if the facility knows one.
    fn scope_name(&self) -> Option<String>;

    /// Visible bindings in declaration order. Data values are copies;
    /// mutating the live context afterwards must not affect them.
    fn bindings(&self) -> Vec<(String, BindingValue)>;

    /// Drain the named single-use iteration source, rebind a replenished
    /// copy into the live context, and return the materialized items.
    ///
    /// This is the one operation on this boundary that mutates the
    /// observed program's state: without the rebind, inspecting the
    /// source would exhaust it before the traced computation runs.
    /// Returns `None` when the binding is absent or not an iteration
    /// source. Does not terminate on an unbounded source.
    fn materialize_iter(&mut self, name: &str) -> Option<Vec<Value>>;
}

/// The three callback contracts fired synchronously by the facility.
///
/// The traced program is suspended for the duration of each call and
/// resumes when it returns, so implementations must never panic: a
/// tracer failure must not take the observed program down with it.
pub trait ExecutionObserver {
    /// A source line is about to execute in `frame`'s scope.
    fn on_line(&mut self, frame: &dyn FrameView);

    /// A scope is being entered; `frame` exposes the bound arguments.
    /// Mutable because synthetic scopes need their iteration source
    /// materialized and rebound.
    fn on_call(&mut self, frame: &mut dyn FrameView);

    /// A scope is being exited with `value` (`None` = no value produced).
    fn on_return(&mut self, frame: &dyn FrameView, value: Option<Value>);
}
