//! Core types: principals, claims, domain entities, and the error taxonomy.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============= Identity Types =============

/// The identity attached to a request after the strategy chain has run.
///
/// A principal is constructed per request and discarded when the request
/// completes - authentication is stateless and no session is ever stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    /// A verified identity derived from the Local or Bearer strategy.
    Registered {
        /// The user's id in the store
        id: String,
        /// The user's username
        username: String,
    },
    /// No identity - produced by the Anonymous fallback strategy.
    Anonymous,
}

impl Principal {
    /// The claims this principal would carry in a token.
    ///
    /// Only registered principals produce claims; an anonymous principal
    /// never receives a token.
    pub fn claims(&self) -> Option<Claims> {
        match self {
            Principal::Registered { id, username } => Some(Claims {
                id: id.clone(),
                username: username.clone(),
            }),
            Principal::Anonymous => None,
        }
    }

    /// Whether this principal carries a verified identity.
    pub fn is_registered(&self) -> bool {
        matches!(self, Principal::Registered { .. })
    }
}

/// The identity fields embedded in a signed token.
///
/// Deliberately minimal: no `exp` or `iat` - a token stays valid until the
/// signing secret changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The user's id in the store
    pub id: String,
    /// The user's username at issue time
    pub username: String,
}

// ============= Domain Entities =============

/// A registered (or username-only provisioned) user.
///
/// `password_hash` is `None` for users created through `POST /user`, which
/// provisions a username without a credential; such users appear in listings
/// but cannot log in.
#[derive(Debug, Clone)]
pub struct User {
    /// UUIDv4 identifier
    pub id: String,
    /// Natural key, unique at the schema level
    pub username: String,
    /// PHC-formatted Argon2id hash, if a credential has been set
    pub password_hash: Option<String>,
    /// Unix timestamp of creation
    pub created_at: i64,
}

/// A journal entry, addressed externally by its `alias` rather than its id.
#[derive(Debug, Clone)]
pub struct JournalEntry {
    /// UUIDv4 identifier (internal)
    pub id: String,
    /// Entry title; defaults to "Entry on <timestamp>" when absent
    pub title: String,
    /// Entry body; never blank
    pub content: String,
    /// Slugified title plus timestamp, set at creation and never recomputed
    pub alias: String,
    /// Owning user id; `None` for entries created under the `anon` segment
    pub owner_id: Option<String>,
    /// Unix timestamp of creation
    pub created: i64,
    /// Unix timestamp of last update
    pub updated: i64,
}

// ============= API Request/Response Types =============

/// Credentials submitted to register.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Desired username
    #[serde(default)]
    pub username: String,
    /// Plaintext password, hashed before storage
    #[serde(default)]
    pub password: String,
}

/// Credentials submitted to login.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Username
    #[serde(default)]
    pub username: String,
    /// Plaintext password
    #[serde(default)]
    pub password: String,
}

/// A freshly issued bearer token.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Opaque signed token to present in the Authorization header
    pub token: String,
}

// ============= Validation =============

/// Validates and normalizes a username, rejecting blank input.
pub fn validate_username(raw: &str) -> Result<&str> {
    let username = raw.trim();
    if username.is_empty() {
        return Err(AppError::Validation("No username specified".to_string()));
    }
    Ok(username)
}

/// Validates a registration password.
pub fn validate_password(raw: &str) -> Result<()> {
    if raw.is_empty() {
        return Err(AppError::Validation("No password specified".to_string()));
    }
    Ok(())
}

/// Reduces a title to a lowercase hyphen-separated slug.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;
    for c in title.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Derives an entry's addressable alias from its title and creation time.
///
/// With a title: `<slug>-<rfc3339>`; without one, the bare timestamp. The
/// timestamp suffix disambiguates entries sharing a title.
pub fn derive_alias(title: Option<&str>, created: DateTime<Utc>) -> String {
    let stamp = created.to_rfc3339_opts(SecondsFormat::Millis, true);
    match title.map(slugify) {
        Some(slug) if !slug.is_empty() => format!("{}-{}", slug, stamp),
        _ => stamp,
    }
}

// ============= Error Types =============

/// Crate-wide error taxonomy, mapped onto HTTP statuses by `IntoResponse`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed or missing input (400)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Uniqueness conflict, e.g. a duplicate username (400)
    #[error("Conflict: {0}")]
    Duplicate(String),

    /// Bad credentials, undecodable token, or ownership mismatch (401)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Unknown user or entry (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Persistence failure (500)
    #[error("Database error: {0}")]
    Database(String),

    /// Anything else that should not reach the caller in detail (500)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Validation(msg) => (axum::http::StatusCode::BAD_REQUEST, msg),
            AppError::Duplicate(msg) => (axum::http::StatusCode::BAD_REQUEST, msg),
            AppError::Auth(msg) => (axum::http::StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (axum::http::StatusCode::NOT_FOUND, msg),
            AppError::Database(msg) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Internal(msg) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AppError>;
