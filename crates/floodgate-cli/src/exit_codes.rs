//! Exit codes for CLI operations
//!
//! `compare` follows diff(1): 0 in sync, 1 drift found, higher on trouble.
//! Argument errors are reported by clap with its own code.

/// Drift found - at least one resource differs from Gate
pub const OUT_OF_SYNC: i32 = 1;

/// General error - unspecified failure
pub const ERROR: i32 = 2;

/// Config error - missing or invalid config file
pub const CONFIG_ERROR: i32 = 3;

/// Definition error - unreadable or malformed resource definition
pub const DEFINITION_ERROR: i32 = 4;

/// Gate error - a fetch or save failed, or Gate was unreachable
pub const GATE_ERROR: i32 = 5;

/// Sync error - one or more resources failed to sync
pub const SYNC_FAILED: i32 = 6;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 7;

