use crate::{
    types::{LoginRequest, RegisterRequest, Result, TokenResponse},
    AppState,
};
use axum::{extract::State, http::StatusCode, Json};

/// Register a new user and issue a token
///
/// Registration implies login: the response already carries a usable token.
#[utoipa::path(
    post,
    path = "/auth/local/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered, token issued", body = TokenResponse),
        (status = 400, description = "Missing input or duplicate username")
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>)> {
    let token = state
        .gateway
        .register(&payload.username, &payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

/// Login with username and password
#[utoipa::path(
    post,
    path = "/auth/local/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    let token = state
        .gateway
        .login(&payload.username, &payload.password)
        .await?;

    Ok(Json(TokenResponse { token }))
}
