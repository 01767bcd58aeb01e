use crate::auth::{password, token::TokenCodec};
use crate::db::traits::CredentialStore;
use crate::types::{AppError, Principal, Result};
use axum::http::{header, HeaderMap};
use std::sync::Arc;

/// The closed set of credential-verification strategies.
///
/// Strategies are registered once into an immutable [`Authenticator`] at
/// process start; there is no runtime registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Username and password from the request body, verified against the store.
    Local,
    /// Signed token from the Authorization header, re-resolved against the store.
    Bearer,
    /// Unconditional fallback yielding [`Principal::Anonymous`].
    Anonymous,
}

/// Per-route strategy orderings.
///
/// A route declares which subset of strategies may authenticate it and in
/// what order; evaluation is left to right.
pub mod chains {
    use super::Strategy;

    /// Login and register verify the submitted credential only.
    pub const LOGIN: &[Strategy] = &[Strategy::Local];
    /// Entry creation accepts a bearer identity, falling back to anonymous.
    pub const ENTRY_CREATE: &[Strategy] = &[Strategy::Bearer, Strategy::Anonymous];
    /// Entry mutation and deletion require a real identity.
    pub const ENTRY_MUTATE: &[Strategy] = &[Strategy::Bearer];
    /// User listing and provisioning require a real identity.
    pub const USER_ADMIN: &[Strategy] = &[Strategy::Bearer];
}

/// The credential material a strategy may read from a request.
///
/// Handlers build this view from whichever parts they have already
/// extracted; strategies never touch the raw request.
#[derive(Debug, Default, Clone, Copy)]
pub struct AuthRequest<'a> {
    /// Token from an `Authorization: Bearer <token>` header, if present
    pub bearer: Option<&'a str>,
    /// Username and password from the request body, if the route carries them
    pub credentials: Option<Credentials<'a>>,
}

/// Body-submitted credentials consumed by the Local strategy.
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    /// Submitted username
    pub username: &'a str,
    /// Submitted plaintext password
    pub password: &'a str,
}

impl<'a> AuthRequest<'a> {
    /// Builds a view carrying only the bearer token, if any.
    pub fn from_headers(headers: &'a HeaderMap) -> Self {
        Self {
            bearer: bearer_token(headers),
            credentials: None,
        }
    }

    /// Builds a view carrying body credentials for the Local strategy.
    pub fn with_credentials(username: &'a str, password: &'a str) -> Self {
        Self {
            bearer: None,
            credentials: Some(Credentials { username, password }),
        }
    }
}

/// Extracts the opaque token from an `Authorization: Bearer` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// The result of one strategy's attempt against a request.
#[derive(Debug)]
pub enum Outcome {
    /// The strategy verified an identity (or, for Anonymous, the lack of one).
    Success(Principal),
    /// The strategy had nothing to evaluate; the chain moves on.
    Deferred,
    /// The strategy saw a credential and rejected it.
    Failure(&'static str),
}

/// Evaluates strategy chains against requests.
///
/// Holds the immutable strategy registry's collaborators: the credential
/// store and the token codec. Read-only after construction, shared across
/// request tasks.
pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    codec: TokenCodec,
}

impl Authenticator {
    /// Creates the process-wide authenticator.
    pub fn new(store: Arc<dyn CredentialStore>, codec: TokenCodec) -> Self {
        Self { store, codec }
    }

    /// Runs a single strategy against the request.
    ///
    /// Store failures propagate as errors (they are server faults, not
    /// authentication verdicts); undecodable tokens and bad credentials
    /// are verdicts and come back as [`Outcome::Failure`].
    pub async fn attempt(&self, strategy: Strategy, request: &AuthRequest<'_>) -> Result<Outcome> {
        match strategy {
            Strategy::Local => {
                let Some(credentials) = request.credentials else {
                    return Ok(Outcome::Failure("Missing credentials"));
                };
                let Some(user) = self
                    .store
                    .find_user_by_username(credentials.username)
                    .await?
                else {
                    return Ok(Outcome::Failure("Invalid credentials"));
                };
                // Users provisioned without a credential cannot log in.
                let Some(hash) = user.password_hash.as_deref() else {
                    return Ok(Outcome::Failure("Invalid credentials"));
                };
                match password::verify_password(credentials.password, hash) {
                    Ok(true) => Ok(Outcome::Success(Principal::Registered {
                        id: user.id,
                        username: user.username,
                    })),
                    _ => Ok(Outcome::Failure("Invalid credentials")),
                }
            }
            Strategy::Bearer => {
                let Some(token) = request.bearer else {
                    return Ok(Outcome::Deferred);
                };
                let claims = match self.codec.decode(token) {
                    Ok(claims) => claims,
                    Err(_) => return Ok(Outcome::Failure("Invalid token")),
                };
                // The decoded claims are not trusted outright: the user must
                // still exist, and the stored identity wins over the claims.
                match self.store.find_user_by_id(&claims.id).await? {
                    Some(user) => Ok(Outcome::Success(Principal::Registered {
                        id: user.id,
                        username: user.username,
                    })),
                    None => Ok(Outcome::Failure("Unknown user")),
                }
            }
            Strategy::Anonymous => Ok(Outcome::Success(Principal::Anonymous)),
        }
    }

    /// Evaluates an ordered chain, yielding the first successful principal.
    ///
    /// `Deferred` and `Failure` both fall through to the next strategy, so a
    /// trailing Anonymous catches requests whose earlier credentials did not
    /// hold up. A chain that exhausts without a success is an authentication
    /// error carrying the last failure reason.
    pub async fn authenticate(
        &self,
        chain: &[Strategy],
        request: &AuthRequest<'_>,
    ) -> Result<Principal> {
        let mut last_failure = None;
        for strategy in chain {
            match self.attempt(*strategy, request).await? {
                Outcome::Success(principal) => {
                    tracing::debug!(?strategy, registered = principal.is_registered(), "authenticated");
                    return Ok(principal);
                }
                Outcome::Deferred => continue,
                Outcome::Failure(reason) => {
                    tracing::debug!(?strategy, reason, "strategy rejected request");
                    last_failure = Some(reason);
                }
            }
        }
        Err(AppError::Auth(
            last_failure.unwrap_or("Authentication required").to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::traits::MockCredentialStore;
    use crate::types::{Claims, User};
    use axum::http::HeaderValue;
    use mockall::predicate::eq;

    fn test_codec() -> TokenCodec {
        TokenCodec::new("test-secret-key-that-is-at-least-32-chars")
    }

    fn stored_user(id: &str, username: &str, password: Option<&str>) -> User {
        User {
            id: id.to_string(),
            username: username.to_string(),
            password_hash: password.map(|p| password::hash_password(p).unwrap()),
            created_at: 0,
        }
    }

    fn authenticator(store: MockCredentialStore) -> Authenticator {
        Authenticator::new(Arc::new(store), test_codec())
    }

    #[tokio::test]
    async fn local_accepts_matching_credentials() {
        let mut store = MockCredentialStore::new();
        let user = stored_user("u-1", "alice", Some("pw"));
        store
            .expect_find_user_by_username()
            .with(eq("alice"))
            .returning(move |_| Ok(Some(user.clone())));

        let auth = authenticator(store);
        let request = AuthRequest::with_credentials("alice", "pw");
        let principal = auth.authenticate(chains::LOGIN, &request).await.unwrap();

        assert_eq!(
            principal,
            Principal::Registered {
                id: "u-1".to_string(),
                username: "alice".to_string()
            }
        );
    }

    #[tokio::test]
    async fn local_rejects_wrong_password() {
        let mut store = MockCredentialStore::new();
        let user = stored_user("u-1", "alice", Some("pw"));
        store
            .expect_find_user_by_username()
            .returning(move |_| Ok(Some(user.clone())));

        let auth = authenticator(store);
        let request = AuthRequest::with_credentials("alice", "wrong");

        assert!(matches!(
            auth.authenticate(chains::LOGIN, &request).await,
            Err(AppError::Auth(_))
        ));
    }

    #[tokio::test]
    async fn local_rejects_unknown_user() {
        let mut store = MockCredentialStore::new();
        store
            .expect_find_user_by_username()
            .returning(|_| Ok(None));

        let auth = authenticator(store);
        let request = AuthRequest::with_credentials("ghost", "pw");

        assert!(auth.authenticate(chains::LOGIN, &request).await.is_err());
    }

    #[tokio::test]
    async fn local_rejects_user_without_credential() {
        // Provisioned through POST /user: listed, but cannot log in.
        let mut store = MockCredentialStore::new();
        let user = stored_user("u-2", "bob", None);
        store
            .expect_find_user_by_username()
            .returning(move |_| Ok(Some(user.clone())));

        let auth = authenticator(store);
        let request = AuthRequest::with_credentials("bob", "anything");

        assert!(auth.authenticate(chains::LOGIN, &request).await.is_err());
    }

    #[tokio::test]
    async fn bearer_resolves_existing_user() {
        let mut store = MockCredentialStore::new();
        let user = stored_user("u-1", "alice", Some("pw"));
        store
            .expect_find_user_by_id()
            .with(eq("u-1"))
            .returning(move |_| Ok(Some(user.clone())));

        let auth = authenticator(store);
        let token = test_codec()
            .encode(&Claims {
                id: "u-1".to_string(),
                username: "alice".to_string(),
            })
            .unwrap();
        let request = AuthRequest {
            bearer: Some(&token),
            credentials: None,
        };

        let principal = auth
            .authenticate(chains::ENTRY_MUTATE, &request)
            .await
            .unwrap();
        assert!(principal.is_registered());
    }

    #[tokio::test]
    async fn bearer_uses_stored_identity_over_claims() {
        // The username in the token is only a hint; the store is the source
        // of truth once the user is re-resolved.
        let mut store = MockCredentialStore::new();
        let user = stored_user("u-1", "alice-renamed", Some("pw"));
        store
            .expect_find_user_by_id()
            .returning(move |_| Ok(Some(user.clone())));

        let auth = authenticator(store);
        let token = test_codec()
            .encode(&Claims {
                id: "u-1".to_string(),
                username: "alice".to_string(),
            })
            .unwrap();
        let request = AuthRequest {
            bearer: Some(&token),
            credentials: None,
        };

        let principal = auth
            .authenticate(chains::ENTRY_MUTATE, &request)
            .await
            .unwrap();
        assert_eq!(
            principal,
            Principal::Registered {
                id: "u-1".to_string(),
                username: "alice-renamed".to_string()
            }
        );
    }

    #[tokio::test]
    async fn bearer_rejects_deleted_user() {
        let mut store = MockCredentialStore::new();
        store.expect_find_user_by_id().returning(|_| Ok(None));

        let auth = authenticator(store);
        let token = test_codec()
            .encode(&Claims {
                id: "gone".to_string(),
                username: "ghost".to_string(),
            })
            .unwrap();
        let request = AuthRequest {
            bearer: Some(&token),
            credentials: None,
        };

        assert!(auth
            .authenticate(chains::ENTRY_MUTATE, &request)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn bearer_rejects_undecodable_token_without_store_lookup() {
        // No expectations set on the mock: a decode failure never reaches it.
        let store = MockCredentialStore::new();
        let auth = authenticator(store);
        let request = AuthRequest {
            bearer: Some("not.a.token"),
            credentials: None,
        };

        assert!(matches!(
            auth.authenticate(chains::ENTRY_MUTATE, &request).await,
            Err(AppError::Auth(_))
        ));
    }

    #[tokio::test]
    async fn missing_bearer_defers_then_chain_fails() {
        let store = MockCredentialStore::new();
        let auth = authenticator(store);
        let request = AuthRequest::default();

        assert!(auth
            .authenticate(chains::ENTRY_MUTATE, &request)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn anonymous_fallback_catches_missing_credential() {
        let store = MockCredentialStore::new();
        let auth = authenticator(store);
        let request = AuthRequest::default();

        let principal = auth
            .authenticate(chains::ENTRY_CREATE, &request)
            .await
            .unwrap();
        assert_eq!(principal, Principal::Anonymous);
    }

    #[tokio::test]
    async fn anonymous_fallback_catches_rejected_bearer() {
        // An undecodable token fails the Bearer strategy, but the trailing
        // Anonymous strategy still admits the request without an identity.
        let store = MockCredentialStore::new();
        let auth = authenticator(store);
        let request = AuthRequest {
            bearer: Some("garbage"),
            credentials: None,
        };

        let principal = auth
            .authenticate(chains::ENTRY_CREATE, &request)
            .await
            .unwrap();
        assert_eq!(principal, Principal::Anonymous);
    }

    #[tokio::test]
    async fn store_errors_propagate_as_server_faults() {
        let mut store = MockCredentialStore::new();
        store
            .expect_find_user_by_username()
            .returning(|_| Err(AppError::Database("connection lost".to_string())));

        let auth = authenticator(store);
        let request = AuthRequest::with_credentials("alice", "pw");

        assert!(matches!(
            auth.authenticate(chains::LOGIN, &request).await,
            Err(AppError::Database(_))
        ));
    }

    #[test]
    fn bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert_eq!(bearer_token(&headers), None);
    }
}
