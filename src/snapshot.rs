//! State snapshotting (v0.1)
//!
//! Turns a paused frame's live bindings into the display-safe copies
//! stored on trace events. Copying is required: the live context keeps
//! mutating after the event fires, and a recorded event must keep showing
//! the values as of its moment.

use serde_json::Value;

use crate::event::Bindings;
use crate::frame::{BindingValue, FrameView};

/// Names starting with this prefix are implementation-reserved and
/// excluded from snapshots.
pub const RESERVED_PREFIX: char = '_';

/// Placeholder scope name when the facility reports none.
pub const ANONYMOUS_SCOPE: &str = "<anonymous>";

/// Sentinel key under which synthetic scopes bind their implicit
/// iteration source.
pub const ITER_SENTINEL: &str = ".0";

/// Synthetic scope names the runtime generates for comprehension and
/// generator-expression bodies.
const SYNTHETIC_SCOPES: [&str; 4] = ["<listcomp>", "<dictcomp>", "<setcomp>", "<genexpr>"];

/// True for compiler-generated comprehension/generator scopes, whose
/// arguments need the special-cased snapshot below.
pub fn is_synthetic_scope(name: &str) -> bool {
    SYNTHETIC_SCOPES.contains(&name)
}

/// Snapshot the frame's visible bindings.
///
/// Reserved-prefix names and callables are dropped: both add noise
/// without diagnostic value. Iteration sources are dropped too; they are
/// only meaningful on synthetic-scope entry, handled by
/// [`snapshot_call_args`].
pub fn snapshot_bindings(frame: &dyn FrameView) -> Bindings {
    frame
        .bindings()
        .into_iter()
        .filter(|(name, _)| !name.starts_with(RESERVED_PREFIX))
        .filter_map(|(name, value)| match value {
            BindingValue::Data(value) => Some((name, value)),
            BindingValue::Callable(_) | BindingValue::IterSource => None,
        })
        .collect()
}

/// Snapshot the arguments of a scope being entered.
///
/// Synthetic scopes have exactly one implicit argument: a single-use
/// iteration source under [`ITER_SENTINEL`]. It is fully materialized
/// and rebound so the traced computation can still consume it, and the
/// materialized sequence becomes the recorded argument value. All other
/// scopes snapshot their declared parameters like any binding set.
pub fn snapshot_call_args(frame: &mut dyn FrameView, scope: &str) -> Bindings {
    if is_synthetic_scope(scope) {
        match frame.materialize_iter(ITER_SENTINEL) {
            Some(items) => vec![(ITER_SENTINEL.to_string(), Value::Array(items))],
            None => {
                tracing::warn!(scope, "synthetic scope without an iteration source");
                Vec::new()
            }
        }
    } else {
        snapshot_bindings(frame)
    }
}
