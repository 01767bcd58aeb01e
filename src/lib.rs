//! # Chronicle
//!
//! A personal-journal API where entries are authored by registered users or
//! left anonymously. The interesting part is the authentication and
//! authorization core: a chain of pluggable credential-verification
//! strategies, a stateless signed-token codec, and a per-request ownership
//! guard over journal entries.
//!
//! ## Overview
//!
//! Chronicle can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `chronicle-server` binary
//! 2. **As a library** - Import the auth core into your own Rust project
//!
//! ## Request flow
//!
//! ```text
//! HTTP request -> StrategyChain (per-route strategies) -> Principal
//!              -> OwnershipGuard (entry routes) -> entry CRUD -> store
//! ```
//!
//! Every request is authenticated from scratch: there are no sessions, and
//! tokens carry no expiry - a token stays valid until the signing secret
//! changes. See [`auth`] for the details.
//!
//! ## Modules
//!
//! - [`api`] - REST API handlers and routes
//! - [`auth`] - strategy chain, token codec, gateway, ownership guard
//! - [`db`] - libsql persistence for users and entries
//! - [`types`] - principals, claims, entities, error taxonomy
//! - [`utils`] - environment-based configuration

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// The authentication and authorization core.
pub mod auth;
/// Persistence for users and journal entries.
pub mod db;
/// Core types and error handling.
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use auth::gateway::AuthenticationGateway;
pub use auth::strategy::Authenticator;
pub use auth::token::TokenCodec;
pub use db::JournalStore;
pub use types::{AppError, Principal, Result};
pub use utils::config::Config;

use std::sync::Arc;

/// Application state shared across handlers.
///
/// Everything here is read-only after startup; concurrent requests share it
/// through cheap `Arc` clones.
#[derive(Clone)]
pub struct AppState {
    /// Process configuration
    pub config: Arc<Config>,
    /// Persistence for users and entries
    pub store: Arc<JournalStore>,
    /// The immutable strategy registry
    pub authenticator: Arc<Authenticator>,
    /// Register/login flows
    pub gateway: Arc<AuthenticationGateway>,
}

impl AppState {
    /// Wires the auth core over a store using the configured signing secret.
    pub fn new(config: Arc<Config>, store: Arc<JournalStore>) -> Self {
        let codec = TokenCodec::new(config.auth.token_secret.clone());
        let credential_store: Arc<dyn db::CredentialStore> = store.clone();
        let authenticator = Arc::new(Authenticator::new(credential_store.clone(), codec.clone()));
        let gateway = Arc::new(AuthenticationGateway::new(
            credential_store,
            authenticator.clone(),
            codec,
        ));

        Self {
            config,
            store,
            authenticator,
            gateway,
        }
    }
}
