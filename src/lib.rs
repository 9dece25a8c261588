//! Tracetree - execution trace recorder and indent-structured renderer

pub mod error;
pub mod event;
pub mod filter;
pub mod frame;
pub mod recorder;
pub mod render;
pub mod replay;
pub mod snapshot;
pub mod source;

pub use error::{FixSuggestion, TraceError};
pub use event::{Bindings, EventRecord, SourceLocation, TraceLog, TraceStats};
pub use filter::ScopeFilter;
pub use frame::{BindingValue, ExecutionObserver, FrameView};
pub use recorder::Recorder;
pub use render::{fmt_value, Renderer, INDENT_STEP};
pub use replay::{Capture, RawBinding, RawEvent, RawValue, ReplayFrame};
pub use snapshot::{is_synthetic_scope, ANONYMOUS_SCOPE, ITER_SENTINEL, RESERVED_PREFIX};
pub use source::SourceCache;
