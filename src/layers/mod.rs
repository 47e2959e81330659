//! Configuration layers.
//!
//! Each layer reads one source into a [`Layer`](crate::store::Layer) whose entries carry
//! provenance. The driver stacks them in increasing precedence:
//! - `env`: Environment variables
//! - `file`: Properties file
//! - explicit overrides, passed to the builder directly

pub mod env;
pub mod file;
