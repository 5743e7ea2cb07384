//! Shared library for the anime catalogue workspace.
//!
//! This crate provides common functionality used by the API client and the
//! catalogue binary:
//! - Configuration management
//! - Logging infrastructure

pub mod config;
pub mod logging;

// Re-export commonly used types
pub use config::Config;
pub use logging::LogConfig;

/// Common result type using anyhow::Error
pub type Result<T> = anyhow::Result<T>;
