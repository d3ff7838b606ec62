//! Unified error types for Longan.
//!
//! This module provides a single error type shared by the value model, the
//! worksheet stream writer and the writer lifecycle controller.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};
