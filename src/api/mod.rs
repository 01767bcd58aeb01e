//! HTTP API handlers and routes, built on Axum.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//!
//! # API Endpoints
//!
//! ## Authentication (`/auth/local`)
//! - `POST /auth/local/register` - Register and receive a token
//! - `POST /auth/local/login` - Login and receive a token
//!
//! ## Users (`/user`)
//! - `GET /user` - Ten newest usernames (bearer)
//! - `POST /user` - Provision a username without a credential (bearer)
//! - `GET /user/{username}` - Look up a user
//!
//! ## Entries (`/entry`)
//! - `GET /entry/user/{user}` - A user's entries, ordered by update time
//! - `POST /entry/user/{user}` - Create an entry (bearer, anonymous fallback)
//! - `GET /entry/user/{user}/entry/{entry}` - Read an entry by alias
//! - `PUT /entry/user/{user}/entry/{entry}` - Update an entry (bearer)
//! - `DELETE /entry/user/{user}/entry/{entry}` - Delete an entry (bearer)
//!
//! # Authentication
//!
//! Authenticated routes expect a token in the `Authorization` header:
//! ```text
//! Authorization: Bearer <token>
//! ```
//! Entry creation additionally accepts unauthenticated requests under the
//! reserved `anon` user segment.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;
