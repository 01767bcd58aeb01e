//! Journal-entry CRUD handlers.
//!
//! Entry routes are parameterized by a `:user` path segment; the reserved
//! segment `anon` addresses unowned entries. Reads are unauthenticated;
//! creation accepts a bearer identity with an anonymous fallback; mutation
//! and deletion require a bearer identity matching the segment.

use crate::{
    auth::{
        guard::{self, ANON_SEGMENT},
        strategy::{chains, AuthRequest},
    },
    db::CredentialStore,
    types::{derive_alias, AppError, JournalEntry, Result},
    AppState,
};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// An entry as returned by list and create endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct EntryResponse {
    /// Internal entry id
    pub id: String,
    /// Entry title
    pub title: String,
    /// Entry body
    pub content: String,
    /// Addressable alias
    pub alias: String,
    /// Owning user id; absent for anonymous entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    /// RFC3339 formatted creation timestamp
    pub created: String,
    /// RFC3339 formatted last-update timestamp
    pub updated: String,
}

/// An entry as returned by alias-addressed reads; omits the internal id.
#[derive(Debug, Serialize, ToSchema)]
pub struct EntryDetail {
    /// Entry title
    pub title: String,
    /// Entry body
    pub content: String,
    /// Addressable alias
    pub alias: String,
    /// Owning user id; absent for anonymous entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    /// RFC3339 formatted creation timestamp
    pub created: String,
    /// RFC3339 formatted last-update timestamp
    pub updated: String,
}

fn rfc3339(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl From<JournalEntry> for EntryResponse {
    fn from(entry: JournalEntry) -> Self {
        Self {
            id: entry.id,
            title: entry.title,
            content: entry.content,
            alias: entry.alias,
            owner_id: entry.owner_id,
            created: rfc3339(entry.created),
            updated: rfc3339(entry.updated),
        }
    }
}

impl From<JournalEntry> for EntryDetail {
    fn from(entry: JournalEntry) -> Self {
        Self {
            title: entry.title,
            content: entry.content,
            alias: entry.alias,
            owner_id: entry.owner_id,
            created: rfc3339(entry.created),
            updated: rfc3339(entry.updated),
        }
    }
}

/// Request to create an entry.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEntryRequest {
    /// Optional title; defaults to "Entry on <timestamp>"
    pub title: Option<String>,
    /// Entry body; must not be blank
    #[serde(default)]
    pub content: String,
}

/// Request to update an entry; at least one field must be present.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateEntryRequest {
    /// Replacement title
    pub title: Option<String>,
    /// Replacement body
    pub content: Option<String>,
}

/// List a user's entries, ordered by last update
#[utoipa::path(
    get,
    path = "/entry/user/{user}",
    params(
        ("user" = String, Path, description = "Owner's username")
    ),
    responses(
        (status = 200, description = "Entries ordered by update time", body = Vec<EntryResponse>),
        (status = 400, description = "Unknown user, or the anon segment")
    ),
    tag = "entries"
)]
pub async fn list_entries(
    State(state): State<AppState>,
    Path(user): Path<String>,
) -> Result<Json<Vec<EntryResponse>>> {
    // Anonymous entries have no owner to list under; they are only
    // addressable individually by alias.
    if user == ANON_SEGMENT {
        return Err(AppError::Validation("Not Allowed for anon.".to_string()));
    }

    let owner = state
        .store
        .find_user_by_username(&user)
        .await?
        .ok_or_else(|| AppError::Validation("Invalid Username specified".to_string()))?;

    let entries = state.store.entries_for_owner(&owner.id).await?;
    Ok(Json(entries.into_iter().map(EntryResponse::from).collect()))
}

/// Create an entry under a user or the anon segment
#[utoipa::path(
    post,
    path = "/entry/user/{user}",
    params(
        ("user" = String, Path, description = "Owner's username, or \"anon\"")
    ),
    request_body = CreateEntryRequest,
    responses(
        (status = 201, description = "Entry created", body = EntryResponse),
        (status = 400, description = "Blank content"),
        (status = 401, description = "Principal does not match the user segment")
    ),
    tag = "entries",
    security(("bearer" = []))
)]
pub async fn create_entry(
    State(state): State<AppState>,
    Path(user): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<CreateEntryRequest>,
) -> Result<(StatusCode, Json<EntryResponse>)> {
    let request = AuthRequest::from_headers(&headers);
    let principal = state
        .authenticator
        .authenticate(chains::ENTRY_CREATE, &request)
        .await?;

    if payload.content.trim().is_empty() {
        return Err(AppError::Validation("Content can not be blank!".to_string()));
    }

    let ownership = guard::authorize_create(&principal, &user)?;

    let now = Utc::now();
    let alias = derive_alias(payload.title.as_deref(), now);
    let title = payload.title.unwrap_or_else(|| {
        format!("Entry on {}", now.to_rfc3339_opts(SecondsFormat::Secs, true))
    });
    let entry = JournalEntry {
        id: Uuid::new_v4().to_string(),
        title,
        content: payload.content,
        alias,
        owner_id: ownership.owner_id(),
        created: now.timestamp(),
        updated: now.timestamp(),
    };
    state.store.insert_entry(&entry).await?;
    tracing::info!(alias = %entry.alias, anonymous = entry.owner_id.is_none(), "entry created");

    Ok((StatusCode::CREATED, Json(entry.into())))
}

/// Read an entry by alias
#[utoipa::path(
    get,
    path = "/entry/user/{user}/entry/{entry}",
    params(
        ("user" = String, Path, description = "Owner's username, or \"anon\""),
        ("entry" = String, Path, description = "Entry alias")
    ),
    responses(
        (status = 200, description = "The entry", body = EntryDetail),
        (status = 400, description = "Unknown user"),
        (status = 404, description = "No entry under that alias")
    ),
    tag = "entries"
)]
pub async fn get_entry(
    State(state): State<AppState>,
    Path((user, entry_alias)): Path<(String, String)>,
) -> Result<Json<EntryDetail>> {
    let entry = if user == ANON_SEGMENT {
        // Anonymous reads resolve by alias alone, with no ownership filter.
        state.store.find_entry_by_alias(&entry_alias).await?
    } else {
        let owner = state
            .store
            .find_user_by_username(&user)
            .await?
            .ok_or_else(|| AppError::Validation("Invalid user".to_string()))?;
        state
            .store
            .find_entry_for_owner(&entry_alias, &owner.id)
            .await?
    };

    let entry = entry.ok_or_else(|| AppError::NotFound("Entry not found.".to_string()))?;
    Ok(Json(entry.into()))
}

/// Update an entry's title or content
#[utoipa::path(
    put,
    path = "/entry/user/{user}/entry/{entry}",
    params(
        ("user" = String, Path, description = "Owner's username"),
        ("entry" = String, Path, description = "Entry alias")
    ),
    request_body = UpdateEntryRequest,
    responses(
        (status = 200, description = "Updated entry", body = EntryResponse),
        (status = 400, description = "Neither title nor content supplied"),
        (status = 401, description = "Principal does not match the user segment"),
        (status = 404, description = "No such entry for this owner")
    ),
    tag = "entries",
    security(("bearer" = []))
)]
pub async fn update_entry(
    State(state): State<AppState>,
    Path((user, entry_alias)): Path<(String, String)>,
    headers: HeaderMap,
    Json(payload): Json<UpdateEntryRequest>,
) -> Result<Json<EntryResponse>> {
    let request = AuthRequest::from_headers(&headers);
    let principal = state
        .authenticator
        .authenticate(chains::ENTRY_MUTATE, &request)
        .await?;
    let owner_id = guard::authorize_mutation(&principal, &user)?;

    if payload.title.is_none() && payload.content.is_none() {
        return Err(AppError::Validation("Title or content required!".to_string()));
    }

    let entry = state
        .store
        .update_entry(
            &entry_alias,
            &owner_id,
            payload.title.as_deref(),
            payload.content.as_deref(),
            Utc::now().timestamp(),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Entry not found.".to_string()))?;

    Ok(Json(entry.into()))
}

/// Delete an entry
#[utoipa::path(
    delete,
    path = "/entry/user/{user}/entry/{entry}",
    params(
        ("user" = String, Path, description = "Owner's username"),
        ("entry" = String, Path, description = "Entry alias")
    ),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 401, description = "Principal does not match the user segment"),
        (status = 404, description = "No such entry for this owner")
    ),
    tag = "entries",
    security(("bearer" = []))
)]
pub async fn delete_entry(
    State(state): State<AppState>,
    Path((user, entry_alias)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<StatusCode> {
    let request = AuthRequest::from_headers(&headers);
    let principal = state
        .authenticator
        .authenticate(chains::ENTRY_MUTATE, &request)
        .await?;
    let owner_id = guard::authorize_mutation(&principal, &user)?;

    let removed = state.store.delete_entry(&entry_alias, &owner_id).await?;
    if !removed {
        return Err(AppError::NotFound("Entry not found.".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
