//! Configuration utilities.

/// Environment-based process configuration.
pub mod config;
