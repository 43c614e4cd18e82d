//! Diff engine for showing drift between Gate and local definitions
//!
//! Key features:
//! - Pretty-prints both canonical JSON documents before diffing, so each
//!   field lands on its own line
//! - Groups changes into hunks with surrounding context
//! - Renders unified-style text for terminals and reports

use serde::{Deserialize, Serialize};
use serde_json::Value;
use similar::{ChangeTag, TextDiff};

use crate::error::Result;

/// Diff engine for state comparison
pub struct DiffEngine {
    /// Show context lines around changes
    pub context_lines: usize,
}

impl DiffEngine {
    /// Create a new diff engine
    pub fn new() -> Self {
        Self { context_lines: 3 }
    }

    /// Set the number of context lines
    pub fn with_context(mut self, lines: usize) -> Self {
        self.context_lines = lines;
        self
    }

    /// Compare a remote snapshot (old) with a local definition (new)
    ///
    /// An empty remote snapshot diffs as a full addition.
    pub fn diff_states(&self, remote: &[u8], local: &[u8]) -> Result<DiffContent> {
        let old = pretty(remote)?;
        let new = pretty(local)?;
        Ok(self.compute_text_diff(&old, &new))
    }

    /// Compute a text diff between two strings
    pub fn compute_text_diff(&self, old: &str, new: &str) -> DiffContent {
        let diff = TextDiff::from_lines(old, new);
        let mut hunks = Vec::new();

        for group in diff.grouped_ops(self.context_lines) {
            let Some(first) = group.first() else {
                continue;
            };
            let mut hunk = DiffHunk {
                old_start: first.old_range().start,
                new_start: first.new_range().start,
                lines: Vec::new(),
            };

            for op in &group {
                for change in diff.iter_changes(op) {
                    let line_type = match change.tag() {
                        ChangeTag::Delete => LineType::Removed,
                        ChangeTag::Insert => LineType::Added,
                        ChangeTag::Equal => LineType::Context,
                    };

                    hunk.lines.push(DiffLine {
                        line_type,
                        content: change.value().trim_end().to_string(),
                        old_line_no: change.old_index(),
                        new_line_no: change.new_index(),
                    });
                }
            }

            hunks.push(hunk);
        }

        DiffContent { hunks }
    }
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Pretty-print a canonical JSON document, one field per line
fn pretty(state: &[u8]) -> Result<String> {
    if state.is_empty() {
        return Ok(String::new());
    }
    let value: Value = serde_json::from_slice(state)?;
    let mut text = serde_json::to_string_pretty(&value)?;
    text.push('\n');
    Ok(text)
}

/// Detailed diff content
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiffContent {
    /// Groups of changed lines with context
    pub hunks: Vec<DiffHunk>,
}

/// A run of changes and the context around them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffHunk {
    /// First old line covered (0-based)
    pub old_start: usize,

    /// First new line covered (0-based)
    pub new_start: usize,

    /// Lines of the hunk
    pub lines: Vec<DiffLine>,
}

impl DiffContent {
    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.lines()
            .any(|line| line.line_type != LineType::Context)
    }

    /// All lines across hunks
    pub fn lines(&self) -> impl Iterator<Item = &DiffLine> {
        self.hunks.iter().flat_map(|hunk| hunk.lines.iter())
    }

    /// Count lines of a given type
    pub fn count(&self, line_type: LineType) -> usize {
        self.lines().filter(|line| line.line_type == line_type).count()
    }

    /// Generate a unified diff string
    pub fn to_unified_diff(&self) -> String {
        let mut output = String::new();

        for hunk in &self.hunks {
            output.push_str(&format!(
                "@@ -{} +{} @@\n",
                hunk.old_start + 1,
                hunk.new_start + 1
            ));
            for line in &hunk.lines {
                output.push_str(line.line_type.prefix());
                output.push_str(&line.content);
                output.push('\n');
            }
        }

        output
    }

    /// Generate a human-readable summary
    pub fn summary(&self) -> String {
        let added = self.count(LineType::Added);
        let removed = self.count(LineType::Removed);

        let mut parts = Vec::new();
        if added > 0 {
            parts.push(format!("{} added", added));
        }
        if removed > 0 {
            parts.push(format!("{} removed", removed));
        }

        if parts.is_empty() {
            "No changes".to_string()
        } else {
            format!("{} line(s)", parts.join(", "))
        }
    }
}

/// A single line in a diff
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffLine {
    /// Type of line
    pub line_type: LineType,

    /// Content of the line
    pub content: String,

    /// Line number in old version
    pub old_line_no: Option<usize>,

    /// Line number in new version
    pub new_line_no: Option<usize>,
}

/// Type of diff line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    /// Line was added
    Added,

    /// Line was removed
    Removed,

    /// Unchanged context line
    Context,
}

impl LineType {
    /// Unified diff prefix
    pub fn prefix(&self) -> &'static str {
        match self {
            LineType::Added => "+",
            LineType::Removed => "-",
            LineType::Context => " ",
        }
    }
}

/// Split a rendered unified diff back into typed lines, for display
pub fn classify_line(line: &str) -> LineType {
    if line.starts_with('+') {
        LineType::Added
    } else if line.starts_with('-') {
        LineType::Removed
    } else {
        LineType::Context
    }
}
