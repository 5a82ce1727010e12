//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FITTING_ROOM_API_URL` - Base URL of the profile/auth API (`/me`, `/profile`, `/signup`, `/login`)
//! - `FITTING_ROOM_TRYON_URL` - Full URL of the try-on generation endpoint
//!   (e.g. `https://host/fashion-face-swap/`)
//!
//! ## Optional
//! - `FITTING_ROOM_STATE_DIR` - Directory holding local storage (default: `.fitting-room`)
//! - `TRYON_STRATEGY` - `parallel` or `sequential` (default: `sequential`)
//! - `TRYON_CONCURRENCY` - Max in-flight requests for `parallel` (default: 4)
//! - `TRYON_DELAY_SECS` - Pause between requests for `sequential` (default: 20)
//! - `TRYON_REQUEST_TIMEOUT_SECS` - Per-request timeout, 0 disables (default: 120)
//! - `TRYON_SEND_GARMENT_TYPE` - Include `garment_type` in requests (default: true)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::tryon::Strategy;

const DEFAULT_STATE_DIR: &str = ".fitting-room";
const DEFAULT_CONCURRENCY: &str = "4";
const DEFAULT_DELAY_SECS: &str = "20";
const DEFAULT_TIMEOUT_SECS: &str = "120";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the profile/auth API
    pub api_url: Url,
    /// Where local storage lives
    pub state_dir: PathBuf,
    /// Try-on generation settings
    pub tryon: TryOnConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Try-on generation endpoint and pacing.
///
/// The endpoint has moved between hosts repeatedly, so it is never hardcoded.
#[derive(Debug, Clone)]
pub struct TryOnConfig {
    /// Full URL of the generation endpoint
    pub endpoint: Url,
    /// How requests for a category are scheduled
    pub strategy: Strategy,
    /// Per-request timeout; `None` waits indefinitely
    pub request_timeout: Option<Duration>,
    /// Whether requests carry the optional `garment_type` field
    pub send_garment_type: bool,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required keys are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let api_url = env.required_url("FITTING_ROOM_API_URL")?;
        let state_dir = PathBuf::from(env.or_default("FITTING_ROOM_STATE_DIR", DEFAULT_STATE_DIR));
        let tryon = TryOnConfig::from_env(&env)?;

        Ok(Self {
            api_url,
            state_dir,
            tryon,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }
}

impl TryOnConfig {
    fn from_env(env: &Env<'_>) -> Result<Self, ConfigError> {
        let endpoint = env.required_url("FITTING_ROOM_TRYON_URL")?;

        let strategy = match env.or_default("TRYON_STRATEGY", "sequential").as_str() {
            "parallel" => {
                let concurrency = env
                    .parsed::<NonZeroUsize>("TRYON_CONCURRENCY", DEFAULT_CONCURRENCY)?;
                Strategy::Parallel { concurrency }
            }
            "sequential" => {
                let secs = env.parsed::<u64>("TRYON_DELAY_SECS", DEFAULT_DELAY_SECS)?;
                Strategy::Sequential {
                    delay: Duration::from_secs(secs),
                }
            }
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "TRYON_STRATEGY".to_string(),
                    format!("expected 'parallel' or 'sequential', got '{other}'"),
                ));
            }
        };

        let timeout_secs = env.parsed::<u64>("TRYON_REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let request_timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

        let send_garment_type = env.parsed::<bool>("TRYON_SEND_GARMENT_TYPE", "true")?;

        Ok(Self {
            endpoint,
            strategy,
            request_timeout,
            send_garment_type,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get an optional variable, treating blank values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get a required variable and parse it as an http(s) URL.
    fn required_url(&self, key: &str) -> Result<Url, ConfigError> {
        let raw = self.required(key)?;
        let url = Url::parse(raw.trim())
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        Ok(url)
    }

    /// Parse a variable (or its default) into `T`.
    fn parsed<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("FITTING_ROOM_API_URL", "http://localhost:8000"),
        (
            "FITTING_ROOM_TRYON_URL",
            "https://tryon.example.com/fashion-face-swap/",
        ),
    ];

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(config.api_url.as_str(), "http://localhost:8000/");
        assert_eq!(config.state_dir, PathBuf::from(".fitting-room"));
        assert_eq!(
            config.tryon.strategy,
            Strategy::Sequential {
                delay: Duration::from_secs(20)
            }
        );
        assert_eq!(config.tryon.request_timeout, Some(Duration::from_secs(120)));
        assert!(config.tryon.send_garment_type);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_parallel_strategy() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("TRYON_STRATEGY", "parallel"));
        vars.push(("TRYON_CONCURRENCY", "2"));
        vars.push(("TRYON_REQUEST_TIMEOUT_SECS", "0"));

        let config = ClientConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(
            config.tryon.strategy,
            Strategy::Parallel {
                concurrency: NonZeroUsize::new(2).unwrap()
            }
        );
        assert_eq!(config.tryon.request_timeout, None);
    }

    #[test]
    fn test_missing_required() {
        let err = ClientConfig::from_lookup(lookup(&REQUIRED[..1])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "FITTING_ROOM_TRYON_URL"));
    }

    #[test]
    fn test_invalid_values() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("TRYON_STRATEGY", "burst"));
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&vars)),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));

        let mut vars = REQUIRED.to_vec();
        vars.push(("TRYON_STRATEGY", "parallel"));
        vars.push(("TRYON_CONCURRENCY", "0"));
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&vars)),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));

        let vars = [
            ("FITTING_ROOM_API_URL", "ftp://example.com"),
            REQUIRED[1],
        ];
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&vars)),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }
}
