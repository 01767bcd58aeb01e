//! API request handlers.
//!
//! This module contains all HTTP request handlers organized by functionality.

/// Authentication handlers (register, login).
pub mod auth;
/// Journal-entry CRUD handlers.
pub mod entries;
/// User listing, provisioning, and lookup handlers.
pub mod users;
