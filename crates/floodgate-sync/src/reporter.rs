//! Progress reporting for load and sync runs
//!
//! The resource manager never logs on its own. It hands every event to a
//! [`SyncReporter`] supplied by the caller:
//! - `ConsoleReporter`: styled lines on stderr for interactive use
//! - `QuietReporter`: failures only
//! - `TracingReporter`: structured `tracing` events

use console::{Term, style};
use floodgate_core::ResourceKind;

use crate::error::SyncError;

/// Stage of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Fetching remote state and computing drift
    Load,
    /// Pushing local state to Gate
    Sync,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Load => write!(f, "Loading"),
            Phase::Sync => write!(f, "Syncing"),
        }
    }
}

/// Observer for resource manager events
///
/// All methods default to doing nothing.
pub trait SyncReporter: Send + Sync {
    /// A kind is about to be processed
    fn kind_started(&self, _phase: Phase, _kind: ResourceKind, _count: usize) {}

    /// A resource was loaded and compared with Gate
    fn resource_loaded(&self, _kind: ResourceKind, _name: &str, _changed: bool) {}

    /// A resource was already in sync, nothing was sent
    fn resource_skipped(&self, _kind: ResourceKind, _name: &str) {}

    /// A resource was saved to Gate
    fn resource_synced(&self, _kind: ResourceKind, _name: &str) {}

    /// Loading or syncing a resource failed
    fn resource_failed(&self, _phase: Phase, _kind: ResourceKind, _name: &str, _error: &SyncError) {}

    /// A resource was saved but its remote state could not be fetched again
    fn resource_refresh_failed(&self, _kind: ResourceKind, _name: &str, _error: &SyncError) {}
}

/// Progress reporter writing styled lines to stderr
pub struct ConsoleReporter {
    /// Terminal for output
    term: Term,
    /// Whether to show unchanged and skipped resources
    verbose: bool,
}

impl ConsoleReporter {
    /// Create a new console reporter
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
            verbose: false,
        }
    }

    /// Create with verbose output
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    fn line(&self, text: String) {
        // Progress output is best-effort
        let _ = self.term.write_line(&text);
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncReporter for ConsoleReporter {
    fn kind_started(&self, phase: Phase, kind: ResourceKind, count: usize) {
        if count > 0 {
            self.line(format!(
                "{} {} {}",
                style(phase).bold(),
                count,
                kind.plural()
            ));
        }
    }

    fn resource_loaded(&self, kind: ResourceKind, name: &str, changed: bool) {
        if changed {
            self.line(format!("  {} {} {}", style("~").yellow(), kind, style(name).cyan()));
        } else if self.verbose {
            self.line(format!("  {} {} {}", style("=").dim(), kind, style(name).dim()));
        }
    }

    fn resource_skipped(&self, kind: ResourceKind, name: &str) {
        if self.verbose {
            self.line(format!(
                "  {} {} {} (up to date)",
                style("⊘").dim(),
                kind,
                style(name).dim()
            ));
        }
    }

    fn resource_synced(&self, kind: ResourceKind, name: &str) {
        self.line(format!("  {} {} {}", style("✓").green(), kind, style(name).cyan()));
    }

    fn resource_failed(&self, _phase: Phase, kind: ResourceKind, name: &str, error: &SyncError) {
        self.line(format!(
            "  {} {} {}: {}",
            style("✗").red(),
            kind,
            style(name).cyan(),
            style(error).red()
        ));
    }

    fn resource_refresh_failed(&self, kind: ResourceKind, name: &str, error: &SyncError) {
        self.line(format!(
            "  {} {} {}: saved, but not refreshed: {}",
            style("!").yellow(),
            kind,
            style(name).cyan(),
            style(error).yellow()
        ));
    }
}

/// Reporter that only prints failures
pub struct QuietReporter;

impl QuietReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for QuietReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncReporter for QuietReporter {
    fn resource_failed(&self, phase: Phase, kind: ResourceKind, name: &str, error: &SyncError) {
        eprintln!("Error: {} {} {}: {}", phase, kind, name, error);
    }
}

/// Reporter emitting `tracing` events
pub struct TracingReporter;

impl SyncReporter for TracingReporter {
    fn kind_started(&self, phase: Phase, kind: ResourceKind, count: usize) {
        tracing::info!(%phase, %kind, count, "processing {}", kind.plural());
    }

    fn resource_loaded(&self, kind: ResourceKind, name: &str, changed: bool) {
        tracing::info!(%kind, name, changed, "loaded resource");
    }

    fn resource_skipped(&self, kind: ResourceKind, name: &str) {
        tracing::debug!(%kind, name, "no need to save");
    }

    fn resource_synced(&self, kind: ResourceKind, name: &str) {
        tracing::info!(%kind, name, "successfully synced");
    }

    fn resource_failed(&self, phase: Phase, kind: ResourceKind, name: &str, error: &SyncError) {
        tracing::warn!(%phase, %kind, name, %error, "resource failed");
    }

    fn resource_refresh_failed(&self, kind: ResourceKind, name: &str, error: &SyncError) {
        tracing::warn!(%kind, name, %error, "saved, but remote state was not refreshed");
    }
}
