//! Application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `STORECAST_BASE_URL` - Public URL of the application (used in invite links)
//! - `STORAGE_URL` - Base URL of the hosted object storage service
//! - `STORAGE_SERVICE_KEY` - Service-level storage key (min 32 chars, high entropy)
//!
//! ## Optional
//! - `STORECAST_HOST` - Bind address (default: 127.0.0.1)
//! - `STORECAST_PORT` - Listen port (default: 3000)
//! - `STORAGE_BUCKET` - Bucket holding uploaded media (default: content)
//! - `STORECAST_MAX_UPLOAD_MB` - Upload size limit in megabytes (default: 200)
//! - `STORECAST_INVITE_TTL_HOURS` - Invite lifetime (default: 168)
//! - `STORECAST_LOG_JSON` - Emit JSON logs when set
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SERVICE_KEY_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const BYTES_PER_MB: usize = 1024 * 1024;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the application
    pub base_url: String,
    /// Object storage configuration
    pub storage: StorageConfig,
    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: usize,
    /// Lifetime of newly created invites, in hours
    pub invite_ttl_hours: i64,
    /// Emit JSON formatted logs
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Hosted object storage configuration.
///
/// Implements `Debug` manually to redact the service key.
#[derive(Clone)]
pub struct StorageConfig {
    /// Base URL of the storage service (no trailing slash)
    pub url: String,
    /// Bucket that holds uploaded media
    pub bucket: String,
    /// Service-level key, grants write access to every object
    pub service_key: SecretString,
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("url", &self.url)
            .field("bucket", &self.bucket)
            .field("service_key", &"[REDACTED]")
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_required_secret("DATABASE_URL")?;
        let host = parse_env("STORECAST_HOST", "127.0.0.1")?;
        let port = parse_env("STORECAST_PORT", "3000")?;
        let base_url = get_required_env("STORECAST_BASE_URL")?
            .trim_end_matches('/')
            .to_string();
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STORECAST_BASE_URL".to_string(), e.to_string())
        })?;

        let max_upload_mb: usize = parse_env("STORECAST_MAX_UPLOAD_MB", "200")?;
        let invite_ttl_hours: i64 = parse_env("STORECAST_INVITE_TTL_HOURS", "168")?;
        if invite_ttl_hours <= 0 {
            return Err(ConfigError::InvalidEnvVar(
                "STORECAST_INVITE_TTL_HOURS".to_string(),
                "must be positive".to_string(),
            ));
        }

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            storage: StorageConfig::from_env()?,
            max_upload_bytes: max_upload_mb.saturating_mul(BYTES_PER_MB),
            invite_ttl_hours,
            log_json: get_optional_env("STORECAST_LOG_JSON").is_some(),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the public URL is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl StorageConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let service_key = get_validated_secret("STORAGE_SERVICE_KEY")?;
        validate_key_length(&service_key, "STORAGE_SERVICE_KEY")?;

        Ok(Self {
            url: get_required_env("STORAGE_URL")?
                .trim_end_matches('/')
                .to_string(),
            bucket: get_env_or_default("STORAGE_BUCKET", "content"),
            service_key,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Validate that a key meets minimum length requirements.
fn validate_key_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SERVICE_KEY_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SERVICE_KEY_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        let min = MIN_ENTROPY_BITS_PER_CHAR;
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("entropy {entropy:.2} bits/char is below {min:.1}, use a random key"),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

/// Configuration used by unit tests across the crate.
#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        database_url: SecretString::from("postgres://127.0.0.1:1/storecast_test"),
        host: IpAddr::from([127, 0, 0, 1]),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        storage: StorageConfig {
            url: "http://storage.local".to_string(),
            bucket: "content".to_string(),
            service_key: SecretString::from("k3Y$9vQ!zT2#pL7@wR4^mN8&xB1*cD6%"),
        },
        max_upload_bytes: 10 * BYTES_PER_MB,
        invite_ttl_hours: 168,
        log_json: false,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}
