//! Source line cache (v0.1)
//!
//! Line events show the literal source text being executed. Files are
//! read once and memoized, including negative results, so a missing file
//! costs one failed read per run instead of one per line event.

use std::collections::HashMap;
use std::fs;

/// Per-file memoized line lookup.
#[derive(Debug, Default)]
pub struct SourceCache {
    /// `None` caches a failed read.
    files: HashMap<String, Option<Vec<String>>>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch line `line_no` (1-based) of `file`, trailing newline
    /// stripped. Any miss (unreadable file, out-of-range line) degrades
    /// to an empty string; a lookup failure must never abort the trace.
    pub fn line(&mut self, file: &str, line_no: u32) -> String {
        let lines = self
            .files
            .entry(file.to_string())
            .or_insert_with(|| match fs::read_to_string(file) {
                Ok(text) => Some(text.lines().map(str::to_string).collect()),
                Err(err) => {
                    tracing::debug!(file, %err, "source file unavailable");
                    None
                }
            });

        let index = match line_no.checked_sub(1) {
            Some(i) => i as usize,
            None => return String::new(),
        };
        lines
            .as_ref()
            .and_then(|lines| lines.get(index))
            .cloned()
            .unwrap_or_default()
    }
}
