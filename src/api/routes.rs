use crate::AppState;
use axum::{
    routing::{get, post},
    Json, Router,
};

/// Builds the application router.
///
/// Authentication is not layered here: each handler runs its route's
/// declared strategy chain itself, so public and protected routes share one
/// router. The caller supplies the [`AppState`] via `with_state`.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route(
            "/auth/local/register",
            post(crate::api::handlers::auth::register),
        )
        .route("/auth/local/login", post(crate::api::handlers::auth::login))
        .route(
            "/user",
            get(crate::api::handlers::users::list_users)
                .post(crate::api::handlers::users::create_user),
        )
        .route("/user/{username}", get(crate::api::handlers::users::get_user))
        .route(
            "/entry/user/{user}",
            get(crate::api::handlers::entries::list_entries)
                .post(crate::api::handlers::entries::create_entry),
        )
        .route(
            "/entry/user/{user}/entry/{entry}",
            get(crate::api::handlers::entries::get_entry)
                .put(crate::api::handlers::entries::update_entry)
                .delete(crate::api::handlers::entries::delete_entry),
        )
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
