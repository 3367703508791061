//! Core copy operation.
//!
//! This module provides the consolidating single-file copy, which uses
//! content digests to resolve destination name collisions without losing
//! either file.

mod file;
mod utils;

// Re-export public API
pub use file::{CopyDecision, CopyOutcome, copy_file};
