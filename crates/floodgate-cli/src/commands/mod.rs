//! CLI commands

pub mod compare;
pub mod inspect;
pub mod sync;
