/**
 * Server Configuration
 *
 * This module loads the server configuration from environment variables
 * once at startup. The result is immutable and injected into the services
 * that need it; nothing reads the environment after this point.
 *
 * # Configuration Sources
 *
 * Environment variables (a `.env` file is loaded by the binary first), with
 * defaults suitable for local development.
 *
 * # Error Handling
 *
 * Values that are present but invalid are `ConfigError`s and stop startup.
 * Optional services that are absent (database, SMTP, detector) are logged
 * and replaced by their development fallbacks.
 */

use std::path::PathBuf;

use chrono::Duration;
use jsonwebtoken::Algorithm;
use sqlx::PgPool;
use thiserror::Error;

/// Secret used when `JWT_SECRET` is not set
const DEV_JWT_SECRET: &str = "super-secret-key";

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_ACCESS_TOKEN_MINUTES: i64 = 15;
pub const DEFAULT_REFRESH_TOKEN_DAYS: i64 = 7;
pub const DEFAULT_RESET_CODE_MINUTES: i64 = 15;
pub const DEFAULT_RESET_LINK_BASE: &str = "http://localhost:8000/reset-password.html";
/// Longest accepted lifetime in minutes (one year)
pub const MAX_TTL_MINUTES: i64 = 525_600;
/// Longest accepted lifetime in days (ten years)
pub const MAX_TTL_DAYS: i64 = 3_650;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Authentication settings
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_algorithm: Algorithm,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub reset_code_ttl: Duration,
    pub bcrypt_cost: u32,
    pub reset_link_base: String,
    /// Deactivate every session of a user when their profile changes
    pub revoke_sessions_on_profile_update: bool,
}

impl AuthConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup
    ///
    /// # Errors
    /// Returns `ConfigError` when a variable is set to an unusable value,
    /// including empty secrets and non-positive lifetimes.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) if secret.is_empty() => return Err(ConfigError::Empty("JWT_SECRET")),
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET not set. Using the development secret; do not run like this in production.");
                DEV_JWT_SECRET.to_string()
            }
        };

        let jwt_algorithm = match lookup("JWT_ALGORITHM") {
            None => Algorithm::HS256,
            Some(value) => parse_hmac_algorithm(&value)?,
        };

        let access_minutes = positive(&lookup, "ACCESS_TOKEN_EXPIRE_MINUTES", DEFAULT_ACCESS_TOKEN_MINUTES, MAX_TTL_MINUTES)?;
        let refresh_days = positive(&lookup, "REFRESH_TOKEN_EXPIRE_DAYS", DEFAULT_REFRESH_TOKEN_DAYS, MAX_TTL_DAYS)?;
        let reset_minutes = positive(&lookup, "RESET_CODE_EXPIRE_MINUTES", DEFAULT_RESET_CODE_MINUTES, MAX_TTL_MINUTES)?;

        let bcrypt_cost = match lookup("BCRYPT_COST") {
            None => bcrypt::DEFAULT_COST,
            Some(value) => match value.parse::<u32>() {
                Ok(cost) if (4..=31).contains(&cost) => cost,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "BCRYPT_COST",
                        value,
                        reason: "expected an integer between 4 and 31".to_string(),
                    })
                }
            },
        };

        let revoke_sessions_on_profile_update = match lookup("REVOKE_SESSIONS_ON_PROFILE_UPDATE") {
            None => false,
            Some(value) => parse_bool("REVOKE_SESSIONS_ON_PROFILE_UPDATE", value)?,
        };

        Ok(Self {
            jwt_secret,
            jwt_algorithm,
            access_token_ttl: Duration::minutes(access_minutes),
            refresh_token_ttl: Duration::days(refresh_days),
            reset_code_ttl: Duration::minutes(reset_minutes),
            bcrypt_cost,
            reset_link_base: lookup("RESET_LINK_BASE").unwrap_or_else(|| DEFAULT_RESET_LINK_BASE.to_string()),
            revoke_sessions_on_profile_update,
        })
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("reset_code_ttl", &self.reset_code_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("reset_link_base", &self.reset_link_base)
            .field("revoke_sessions_on_profile_update", &self.revoke_sessions_on_profile_update)
            .finish()
    }
}

/// SMTP relay settings
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

impl SmtpConfig {
    /// `None` when `SMTP_HOST` is not set
    pub fn from_lookup<F>(lookup: F) -> Result<Option<Self>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = match lookup("SMTP_HOST") {
            Some(host) if !host.is_empty() => host,
            _ => return Ok(None),
        };

        let port = match lookup("SMTP_PORT") {
            None => 587,
            Some(value) => value.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "SMTP_PORT",
                value: value.clone(),
                reason: e.to_string(),
            })?,
        };

        let username = lookup("SMTP_USER");
        let from = lookup("SMTP_FROM")
            .or_else(|| username.clone())
            .ok_or(ConfigError::Empty("SMTP_FROM"))?;

        Ok(Some(Self {
            host,
            port,
            username,
            password: lookup("SMTP_PASS"),
            from,
        }))
    }
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("from", &self.from)
            .finish()
    }
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub auth: AuthConfig,
    pub smtp: Option<SmtpConfig>,
    pub blob_dir: PathBuf,
    pub detector_url: Option<String>,
    pub static_dir: PathBuf,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("SERVER_PORT") {
            None => DEFAULT_PORT,
            Some(value) => value.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "SERVER_PORT",
                value: value.clone(),
                reason: e.to_string(),
            })?,
        };

        Ok(Self {
            port,
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            auth: AuthConfig::from_lookup(&lookup)?,
            smtp: SmtpConfig::from_lookup(&lookup)?,
            blob_dir: lookup("BLOB_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("data/blobs")),
            detector_url: lookup("DETECTOR_URL").filter(|url| !url.is_empty()),
            static_dir: lookup("STATIC_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("static")),
        })
    }
}

fn parse_hmac_algorithm(value: &str) -> Result<Algorithm, ConfigError> {
    match value.to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        _ => Err(ConfigError::Invalid {
            name: "JWT_ALGORITHM",
            value: value.to_string(),
            reason: "expected HS256, HS384 or HS512".to_string(),
        }),
    }
}

fn positive<F>(lookup: &F, name: &'static str, default: i64, max: i64) -> Result<i64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => match value.parse::<i64>() {
            Ok(n) if n > 0 && n <= max => Ok(n),
            _ => Err(ConfigError::Invalid {
                name,
                value,
                reason: format!("expected a positive integer no greater than {}", max),
            }),
        },
    }
}

fn parse_bool(name: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value,
            reason: "expected true or false".to_string(),
        }),
    }
}

/// Connect to PostgreSQL and run migrations
///
/// # Returns
///
/// - `Ok(None)` if `database_url` is `None`
/// - `Ok(Some(pool))` once connected and migrated
///
/// # Errors
///
/// A configured database that cannot be reached or migrated is an error;
/// silently falling back to memory would lose data.
pub async fn load_database(database_url: Option<&str>) -> Result<Option<PgPool>, sqlx::Error> {
    let database_url = match database_url {
        Some(url) => url,
        None => {
            tracing::warn!("DATABASE_URL not set. Using in-memory stores; data will not survive a restart.");
            return Ok(None);
        }
    };

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url).await?;
    tracing::info!("Database connection pool created successfully");

    tracing::info!("Running database migrations...");
    sqlx::migrate!().run(&pool).await?;
    tracing::info!("Database migrations completed successfully");

    Ok(Some(pool))
}
