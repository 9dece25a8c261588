//! Scope-inclusion filter (v0.1)
//!
//! Decides whether an event's originating file belongs to the program
//! under trace. Deliberately coarse: a substring token match, not a
//! module boundary. Its main job is keeping the tracer's own frames and
//! unrelated library code out of the log.

/// Location filter matched against source file paths.
///
/// Checked before any snapshot work so excluded frames pay nothing.
#[derive(Debug, Clone, Default)]
pub struct ScopeFilter {
    token: String,
}

impl ScopeFilter {
    /// Filter by substring token. An empty token accepts every location
    /// (useful when the capture was already scoped at record time).
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Filter that accepts every location.
    pub fn accept_all() -> Self {
        Self::default()
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// True iff `file` belongs to the program under trace.
    pub fn accepts(&self, file: &str) -> bool {
        file.contains(&self.token)
    }
}
