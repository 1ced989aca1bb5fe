//! # Hostlink Utilities
//!
//! Shared utilities and helpers for hostlink.
//!
//! This crate provides common functionality used across the hostlink
//! workspace, most importantly logging infrastructure built on `tracing`
//! with a file-only mode for running embedded inside a host process.

pub mod logging;

// Re-export commonly used logging functions for convenience
pub use logging::{init_embedded_logging, init_logging, init_logging_with_level, LogFormat, LogLevel};
pub use tracing::{debug, error, info, trace, warn};
