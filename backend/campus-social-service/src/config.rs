/// Configuration management for Campus Social Service
///
/// Loads configuration from environment variables (optionally seeded from a `.env` file).
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::comment_tree::OrphanPolicy;

/// Minimum accepted length for the HS256 signing secret
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Token validation settings
    pub auth: AuthConfig,
    /// Social graph and comment rules
    pub social: SocialConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// HTTP port
    pub port: u16,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Database configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Min connections in pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds to wait for a pooled connection
    pub acquire_timeout_secs: u64,
    /// Apply bundled migrations at startup
    pub run_migrations: bool,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}

/// Token validation settings
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 secret shared with the token issuer
    pub jwt_secret: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .finish()
    }
}

/// Social graph and comment rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialConfig {
    /// Platform-owner account nobody may unfollow
    pub protected_account_id: Option<Uuid>,
    /// Maximum comment length in characters
    pub max_comment_length: usize,
    /// What to do with replies whose parent is missing from the fetched set
    pub orphan_policy: OrphanPolicy,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            protected_account_id: None,
            max_comment_length: default_max_comment_length(),
            orphan_policy: OrphanPolicy::default(),
        }
    }
}

// Default values
fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    2
}

fn default_max_comment_length() -> usize {
    2000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_env_or("APP_PORT", 8085)?,
        };

        let cors = {
            let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                Ok(value) => value,
                Err(_) if app.is_production() => {
                    bail!("CORS_ALLOWED_ORIGINS must be set in production")
                }
                Err(_) => "http://localhost:3000".to_string(),
            };

            if app.is_production() && allowed_origins.trim() == "*" {
                bail!("CORS_ALLOWED_ORIGINS cannot be '*' in production");
            }

            CorsConfig { allowed_origins }
        };

        let database = DatabaseConfig {
            url: std::env::var("DATABASE_URL")
                .context("DATABASE_URL environment variable not set")?,
            max_connections: parse_env_or("DB_MAX_CONNECTIONS", default_max_connections())?,
            min_connections: parse_env_or("DB_MIN_CONNECTIONS", default_min_connections())?,
            acquire_timeout_secs: parse_env_or("DB_ACQUIRE_TIMEOUT_SECS", 10)?,
            run_migrations: parse_env_or("RUN_MIGRATIONS", true)?,
        };

        let jwt_secret =
            std::env::var("JWT_SECRET").context("JWT_SECRET environment variable not set")?;
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            bail!(
                "JWT_SECRET too short: expected at least {} bytes",
                MIN_JWT_SECRET_LEN
            );
        }
        let auth = AuthConfig { jwt_secret };

        let social = SocialConfig {
            protected_account_id: match std::env::var("PROTECTED_ACCOUNT_ID") {
                Ok(raw) if !raw.trim().is_empty() => Some(
                    Uuid::parse_str(raw.trim())
                        .with_context(|| format!("PROTECTED_ACCOUNT_ID '{}' is not a UUID", raw))?,
                ),
                _ => None,
            },
            max_comment_length: parse_env_or("MAX_COMMENT_LENGTH", default_max_comment_length())?,
            orphan_policy: match std::env::var("COMMENT_ORPHAN_POLICY") {
                Ok(raw) => raw.parse().map_err(|e: String| anyhow!(e))?,
                Err(_) => OrphanPolicy::default(),
            },
        };

        Ok(Config {
            app,
            cors,
            database,
            auth,
            social,
        })
    }
}

fn parse_env_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse()
            .map_err(|e| anyhow!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}
