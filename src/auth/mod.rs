//! The authentication and authorization core.
//!
//! # Module Structure
//!
//! - [`auth::token`](crate::auth::token) - stateless signed-token codec (HS256, no expiry)
//! - [`auth::password`](crate::auth::password) - Argon2id hashing and verification
//! - [`auth::strategy`](crate::auth::strategy) - the strategy chain: Local, Bearer, Anonymous
//! - [`auth::gateway`](crate::auth::gateway) - register and login flows
//! - [`auth::guard`](crate::auth::guard) - per-request ownership decisions for entry routes
//!
//! # How a request is authenticated
//!
//! Each route declares an ordered chain of strategies
//! ([`strategy::chains`]). The handler builds an [`strategy::AuthRequest`]
//! view from the parts it has extracted and asks the shared
//! [`strategy::Authenticator`] to evaluate the chain; the first strategy to
//! succeed yields the request's [`crate::types::Principal`]. Entry routes
//! then pass that principal through the ownership guard before touching the
//! store.
//!
//! Authentication is deliberately stateless: no sessions, no token expiry,
//! no revocation. A token stays valid until the signing secret changes.

/// Register and login flows coupled to token issuance.
pub mod gateway;
/// Ownership decisions for journal-entry routes.
pub mod guard;
/// Password hashing with Argon2id.
pub mod password;
/// Strategy chain evaluation and the per-route chain tables.
pub mod strategy;
/// Signed-token encoding and decoding.
pub mod token;
