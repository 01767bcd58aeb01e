use crate::auth::{
    password,
    strategy::{chains, AuthRequest, Authenticator},
    token::TokenCodec,
};
use crate::db::traits::CredentialStore;
use crate::types::{validate_password, validate_username, AppError, Principal, Result, User};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Register and login flows: credential verification coupled to token issue.
///
/// Registration implies login - the caller receives a token without a
/// separate login call. Neither flow creates any session state; every later
/// request must present the token itself.
pub struct AuthenticationGateway {
    store: Arc<dyn CredentialStore>,
    authenticator: Arc<Authenticator>,
    codec: TokenCodec,
}

impl AuthenticationGateway {
    /// Creates the gateway over the shared store, authenticator, and codec.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        authenticator: Arc<Authenticator>,
        codec: TokenCodec,
    ) -> Self {
        Self {
            store,
            authenticator,
            codec,
        }
    }

    /// Creates a user and returns a freshly issued token.
    ///
    /// The username uniqueness check is the store's atomic constraint; a
    /// conflict surfaces as a duplicate-username error rather than racing a
    /// separate lookup. The stored credential is then authenticated through
    /// the Local strategy exactly as a login would be.
    pub async fn register(&self, username: &str, password: &str) -> Result<String> {
        let username = validate_username(username)?;
        validate_password(password)?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            password_hash: Some(password::hash_password(password)?),
            created_at: Utc::now().timestamp(),
        };
        self.store.create_user(&user).await?;
        tracing::info!(username, "registered new user");

        let request = AuthRequest::with_credentials(username, password);
        let principal = self.authenticator.authenticate(chains::LOGIN, &request).await?;
        self.issue(&principal)
    }

    /// Verifies a credential through the Local strategy and issues a token.
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let request = AuthRequest::with_credentials(username, password);
        let principal = self.authenticator.authenticate(chains::LOGIN, &request).await?;
        tracing::info!(username, "login succeeded");
        self.issue(&principal)
    }

    fn issue(&self, principal: &Principal) -> Result<String> {
        let claims = principal
            .claims()
            .ok_or_else(|| AppError::Auth("Cannot issue a token without an identity".to_string()))?;
        self.codec.encode(&claims)
    }
}
