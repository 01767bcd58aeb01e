//! Persistence seams consumed by the authentication core.
//!
//! The strategy chain and the authentication gateway never talk to libsql
//! directly; they go through [`CredentialStore`], which [`super::store::JournalStore`]
//! implements. Tests substitute a mock.

use crate::types::{Result, User};
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

/// User lookup and persistence as seen by the auth core.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Looks up a user by their natural key.
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Looks up a user by id, as decoded from a bearer token.
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>>;

    /// Persists a new user.
    ///
    /// Insertion is atomic with respect to the username uniqueness check:
    /// a concurrent duplicate surfaces as [`crate::types::AppError::Duplicate`],
    /// never as a second winner.
    async fn create_user(&self, user: &User) -> Result<()>;
}
