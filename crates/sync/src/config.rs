//! Sync engine configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TIDEPOOL_API_URL` - Base URL of the backend (the `/api/{collection}`
//!   endpoints live under it)
//! - `TIDEPOOL_API_KEY` - Service key sent with every request (high entropy)
//!
//! ## Optional
//! - `TIDEPOOL_STATE_PATH` - Path of the persisted state snapshot
//!   (default: `tidepool.storefront.v1.json`)
//! - `TIDEPOOL_SESSION_TOKEN` - Seed bearer token for an existing session
//! - `TIDEPOOL_SESSION_EXPIRES` - RFC 3339 expiry for the seed session
//! - `TIDEPOOL_CURRENCY` - Display currency (default: USD)
//! - `TIDEPOOL_LOADING_PAUSE_MS` - Spinner-perceptibility pause before
//!   fetches (default: 250)

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use thiserror::Error;
use tidepool_core::CurrencyCode;
use url::Url;

use crate::auth::Session;
use crate::persist::DEFAULT_STATE_PATH;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

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
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
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

/// Sync engine configuration.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Backend base URL
    pub api_url: Url,
    /// Service key attached to every request
    pub api_key: SecretString,
    /// Path of the persisted state snapshot
    pub state_path: PathBuf,
    /// Seed bearer token for an already-established session
    pub session_token: Option<SecretString>,
    /// Expiry of the seed session
    pub session_expires: Option<DateTime<Utc>>,
    /// Display currency
    pub currency: CurrencyCode,
    /// Pause after flipping the loading flag, so the spinner is perceptible
    pub loading_pause: Duration,
}

impl SyncConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the API key fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = get_required_env("TIDEPOOL_API_URL")?;
        let api_url = Url::parse(&api_url).map_err(|e| {
            ConfigError::InvalidEnvVar("TIDEPOOL_API_URL".to_string(), e.to_string())
        })?;
        let api_key = get_validated_secret("TIDEPOOL_API_KEY")?;
        let state_path =
            PathBuf::from(get_env_or_default("TIDEPOOL_STATE_PATH", DEFAULT_STATE_PATH));

        let session_token = get_optional_env("TIDEPOOL_SESSION_TOKEN").map(SecretString::from);
        let session_expires = get_optional_env("TIDEPOOL_SESSION_EXPIRES")
            .map(|raw| {
                DateTime::parse_from_rfc3339(&raw)
                    .map(|t| t.with_timezone(&Utc))
                    .map_err(|e| {
                        ConfigError::InvalidEnvVar(
                            "TIDEPOOL_SESSION_EXPIRES".to_string(),
                            e.to_string(),
                        )
                    })
            })
            .transpose()?;

        let currency = get_optional_env("TIDEPOOL_CURRENCY")
            .map(|raw| {
                raw.parse::<CurrencyCode>()
                    .map_err(|e| ConfigError::InvalidEnvVar("TIDEPOOL_CURRENCY".to_string(), e))
            })
            .transpose()?
            .unwrap_or_default();

        let loading_pause = get_env_or_default("TIDEPOOL_LOADING_PAUSE_MS", "250")
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|e| {
                ConfigError::InvalidEnvVar("TIDEPOOL_LOADING_PAUSE_MS".to_string(), e.to_string())
            })?;

        Ok(Self {
            api_url,
            api_key,
            state_path,
            session_token,
            session_expires,
            currency,
            loading_pause,
        })
    }

    /// Build the seed [`Session`] from `TIDEPOOL_SESSION_TOKEN`/`_EXPIRES`,
    /// if a token was configured.
    #[must_use]
    pub fn seed_session(&self) -> Option<Session> {
        self.session_token.as_ref().map(|token| Session {
            access_token: token.clone(),
            expires_at: self.session_expires,
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

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
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
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real service keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated key."
            ),
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_high() {
        // Random-looking string should have high entropy
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_seed_session() {
        let config = SyncConfig {
            api_url: Url::parse("https://backend.test").unwrap(),
            api_key: SecretString::from("k"),
            state_path: PathBuf::from("state.json"),
            session_token: Some(SecretString::from("token-123")),
            session_expires: None,
            currency: CurrencyCode::USD,
            loading_pause: Duration::ZERO,
        };

        let session = config.seed_session().unwrap();
        assert_eq!(session.access_token.expose_secret(), "token-123");
        assert!(session.expires_at.is_none());

        let config = SyncConfig {
            session_token: None,
            ..config
        };
        assert!(config.seed_session().is_none());
    }
}
