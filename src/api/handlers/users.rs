//! User listing, provisioning, and lookup handlers.

use crate::{
    auth::strategy::{chains, AuthRequest},
    db::CredentialStore,
    types::{validate_username, AppError, Result, User},
    AppState,
};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{DateTime, SecondsFormat};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A username as it appears in listings.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserSummary {
    /// The username
    pub username: String,
}

/// A user record as returned by provisioning and lookup.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserRecord {
    /// The username
    pub username: String,
    /// RFC3339 formatted creation timestamp
    pub created_at: String,
}

impl From<User> for UserRecord {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            created_at: DateTime::from_timestamp(user.created_at, 0)
                .unwrap_or_default()
                .to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Request to provision a username without a credential.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    /// The username to reserve
    #[serde(default)]
    pub username: String,
}

/// List the ten newest usernames
#[utoipa::path(
    get,
    path = "/user",
    responses(
        (status = 200, description = "Usernames, newest first", body = Vec<UserSummary>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "users",
    security(("bearer" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<UserSummary>>> {
    let request = AuthRequest::from_headers(&headers);
    state
        .authenticator
        .authenticate(chains::USER_ADMIN, &request)
        .await?;

    let usernames = state.store.list_usernames(10).await?;
    let summaries = usernames
        .into_iter()
        .map(|username| UserSummary { username })
        .collect();

    Ok(Json(summaries))
}

/// Provision a username without a credential
///
/// The resulting user appears in listings but cannot log in; it owns
/// nothing until a credential is registered for it.
#[utoipa::path(
    post,
    path = "/user",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserRecord),
        (status = 400, description = "Missing or duplicate username"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "users",
    security(("bearer" = []))
)]
pub async fn create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserRecord>)> {
    let request = AuthRequest::from_headers(&headers);
    state
        .authenticator
        .authenticate(chains::USER_ADMIN, &request)
        .await?;

    let username = validate_username(&payload.username)?;
    let user = User {
        id: Uuid::new_v4().to_string(),
        username: username.to_string(),
        password_hash: None,
        created_at: chrono::Utc::now().timestamp(),
    };
    state.store.create_user(&user).await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Look up a user by username
#[utoipa::path(
    get,
    path = "/user/{username}",
    params(
        ("username" = String, Path, description = "Username to look up")
    ),
    responses(
        (status = 200, description = "User found", body = UserRecord),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserRecord>> {
    let user = state
        .store
        .find_user_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

    Ok(Json(user.into()))
}
