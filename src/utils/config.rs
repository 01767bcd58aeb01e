use crate::types::{AppError, Result};
use serde::Deserialize;
use std::env;

/// Process configuration, assembled from environment variables (a `.env`
/// file is honored in development).
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Bind address and port
    pub server: ServerConfig,
    /// Database location
    pub database: DatabaseConfig,
    /// Token signing configuration
    pub auth: AuthConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
}

/// Persistence settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the libsql database file
    pub path: String,
}

/// Authentication settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Token signing secret. Required: tokens never expire, so the secret is
    /// the only thing standing between a leaked database and valid tokens.
    pub token_secret: String,
}

impl Config {
    /// Reads configuration from the environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8081".to_string())
                    .parse()
                    .map_err(|e| AppError::Internal(format!("Invalid PORT: {}", e)))?,
            },
            database: DatabaseConfig {
                path: env::var("CHRONICLE_DB").unwrap_or_else(|_| "chronicle.db".to_string()),
            },
            auth: AuthConfig {
                token_secret: env::var("TOKEN_SECRET")
                    .map_err(|_| AppError::Internal("TOKEN_SECRET must be set".to_string()))?,
            },
        })
    }
}
