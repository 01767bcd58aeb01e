use crate::types::{AppError, Claims, Result};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

/// Stateless signed-token codec.
///
/// Encodes a principal's [`Claims`] into an HS256-signed JWT and back. The
/// payload carries no `exp` or `iat` claim: a token remains valid for as long
/// as the signing secret is unchanged. The secret is injected at construction
/// and must come from deployment configuration, never a compiled-in constant.
#[derive(Clone)]
pub struct TokenCodec {
    secret: String,
}

impl TokenCodec {
    /// Creates a codec signing with the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Serializes and signs claims into an opaque token string.
    ///
    /// Deterministic for a fixed secret and invertible by [`decode`](Self::decode).
    pub fn encode(&self, claims: &Claims) -> Result<String> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Verifies a token's signature and recovers its claims.
    ///
    /// Every failure mode - malformed structure, signature mismatch, parse
    /// error - collapses into a single authentication error. Callers must
    /// treat it as "could not authenticate", never as a server fault.
    pub fn decode(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        // The claims carry no exp by design.
        validation.validate_exp = false;
        validation.required_spec_claims = std::collections::HashSet::new();

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| AppError::Auth(format!("Invalid token: {}", e)))
    }
}
