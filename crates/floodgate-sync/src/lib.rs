//! Floodgate Sync - keep Spinnaker resources in line with their file definitions
//!
//! This crate provides:
//! - **Resource model**: Applications, pipelines and pipeline templates with local and remote state
//! - **Gate client**: Trait-based access to the Spinnaker Gate API, with an HTTP and an in-memory implementation
//! - **Diff engine**: Line diffs between remote snapshots and local definitions
//! - **Resource manager**: Load, compare and sync whole collections of resources
//! - **Reporting**: Pluggable observers for load and sync progress

pub mod diff;
pub mod error;
pub mod gate;
pub mod manager;
pub mod reporter;
pub mod resource;

pub use diff::{DiffContent, DiffEngine, DiffHunk, DiffLine, LineType};
pub use error::{Result, SyncError};
pub use gate::{GateClient, GateResponse, HttpGateClient, MockGateClient, OperationCounts};
pub use manager::{ResourceChange, ResourceManager, SpinnakerResources, SyncSummary};
pub use reporter::{ConsoleReporter, Phase, QuietReporter, SyncReporter, TracingReporter};
pub use resource::{Application, Pipeline, PipelineTemplate, Resource, Resourcer, init};

pub use floodgate_core::ResourceKind;
