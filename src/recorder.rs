//! Event recorder (v0.1)
//!
//! The [`ExecutionObserver`] implementation the facility drives. Each
//! callback filters by location, snapshots what the event kind needs,
//! and appends one record to the trace log. Strictly additive: the log
//! is its only observable effect.

use serde_json::Value;

use crate::event::{EventRecord, TraceLog};
use crate::filter::ScopeFilter;
use crate::frame::{ExecutionObserver, FrameView};
use crate::snapshot::{self, ANONYMOUS_SCOPE};
use crate::source::SourceCache;

/// Records filtered control-flow events into a [`TraceLog`].
///
/// The log is an explicit handle, not hidden state: clone it via
/// [`Recorder::log`] before the run and hand it to the renderer after.
#[derive(Debug)]
pub struct Recorder {
    filter: ScopeFilter,
    sources: SourceCache,
    log: TraceLog,
}

impl Recorder {
    pub fn new(filter: ScopeFilter) -> Self {
        Self {
            filter,
            sources: SourceCache::new(),
            log: TraceLog::new(),
        }
    }

    /// Cheap-clone handle to the log this recorder appends to.
    pub fn log(&self) -> TraceLog {
        self.log.clone()
    }

    fn scope_of(frame: &dyn FrameView) -> String {
        match frame.scope_name() {
            Some(name) if !name.is_empty() => name,
            _ => ANONYMOUS_SCOPE.to_string(),
        }
    }
}

impl ExecutionObserver for Recorder {
    fn on_line(&mut self, frame: &dyn FrameView) {
        let location = frame.location();
        if !self.filter.accepts(&location.file) {
            return;
        }
        let source_text = self.sources.line(&location.file, location.line);
        self.log.push(EventRecord::Line {
            scope: Self::scope_of(frame),
            source_text,
            bindings: snapshot::snapshot_bindings(frame),
            location,
        });
    }

    fn on_call(&mut self, frame: &mut dyn FrameView) {
        let location = frame.location();
        if !self.filter.accepts(&location.file) {
            return;
        }
        let scope = Self::scope_of(&*frame);
        let bindings = snapshot::snapshot_call_args(frame, &scope);
        self.log.push(EventRecord::Call {
            location,
            scope,
            bindings,
        });
    }

    fn on_return(&mut self, frame: &dyn FrameView, value: Option<Value>) {
        let location = frame.location();
        if !self.filter.accepts(&location.file) {
            return;
        }
        self.log.push(EventRecord::Return {
            scope: Self::scope_of(frame),
            return_value: value,
            location,
        });
    }
}
