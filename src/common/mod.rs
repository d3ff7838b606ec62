//! Common types and utilities shared across the writer.
//!
//! This module provides the unified error type and the XML escaping helpers
//! used by the worksheet, shared string and package writers.

// Submodule declarations
pub mod error;
pub mod xml;

// Re-exports for convenience
pub use error::{Error, Result};
