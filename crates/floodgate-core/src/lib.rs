//! Floodgate Core - Core types for keeping Spinnaker in sync with files
//!
//! This crate provides the foundational types used throughout Floodgate:
//! - `Config`: Gate connection settings and definition search paths
//! - `DefinitionSet`: Raw resource definitions scanned from disk, grouped by `ResourceKind`

pub mod config;
pub mod definitions;
pub mod error;

pub use config::{AuthConfig, BasicAuth, Config};
pub use definitions::{Definition, DefinitionSet, ResourceKind, classify};
pub use error::{CoreError, Result};
