//! Configuration types for applicant-harvest

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, str::FromStr, time::Duration};

/// Retry behavior for outbound API calls
///
/// The backoff schedule is deterministic by contract: the delay before retry
/// `n` (1-based) is `base_delay * 2^(n-1)`, capped at `max_delay`. Jitter is
/// available but off by default.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RetryConfig {
    /// Total number of attempts per call, including the first (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base delay unit for exponential backoff (default: 2 seconds)
    #[serde(default = "default_base_delay", with = "duration_serde")]
    pub base_delay: Duration,

    /// Maximum delay between retries (default: 60 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Add random jitter to delays (default: false)
    #[serde(default)]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
            jitter: false,
        }
    }
}

/// Main configuration for the harvesting engine
///
/// Constructed once at startup and passed by reference into every component;
/// there are no process-wide mutable globals. Every field has a default
/// except the credentials and the base URL, which [`Config::validate`]
/// requires before any network call is made.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Base URL of the recruiting-platform API, e.g.
    /// `https://tenant.example.com/api` (required)
    #[serde(default)]
    pub base_url: String,

    /// API token sent as the `token` header on every call (required)
    #[serde(default)]
    pub api_token: String,

    /// Publisher identifier sent as the `publisher` header on every call
    /// (required)
    #[serde(default)]
    pub api_publisher: String,

    /// Listing page size the remote API serves (default: 100)
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Fixed delay applied after every successful call to throttle request
    /// rate (default: 1 second)
    #[serde(default = "default_call_delay", with = "duration_serde")]
    pub call_delay: Duration,

    /// Per-attempt request timeout (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// Retry behavior for outbound calls
    #[serde(default)]
    pub retry: RetryConfig,

    /// Worker limit for concurrent detail fetches within a page (default: 8)
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Record target for one run; collection stops once reached
    /// (default: 5000)
    #[serde(default = "default_records_per_run")]
    pub records_per_run: usize,

    /// Highest page index a crawl will ever visit; the effective ceiling is
    /// the lesser of this and the total page count (default: 5000)
    #[serde(default = "default_max_page")]
    pub max_page: u32,

    /// Progress state file location (default: "harvest_state.json")
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,

    /// Directory export files are written into (default: "exports")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_token: String::new(),
            api_publisher: String::new(),
            page_size: default_page_size(),
            call_delay: default_call_delay(),
            request_timeout: default_request_timeout(),
            retry: RetryConfig::default(),
            max_workers: default_max_workers(),
            records_per_run: default_records_per_run(),
            max_page: default_max_page(),
            state_file: default_state_file(),
            output_dir: default_output_dir(),
        }
    }
}

impl Config {
    /// Build a configuration from defaults with environment overrides applied.
    ///
    /// Recognized variables: `BASE_URL`, `API_TOKEN`, `API_PUBLISHER`,
    /// `PAGE_SIZE`, `API_CALL_DELAY` (seconds), `MAX_RETRIES`, `MAX_WORKERS`,
    /// `RECORDS_PER_RUN`, `MAX_PAGE`, `STATE_FILE`, `OUTPUT_DIR`.
    ///
    /// # Errors
    ///
    /// Returns a [`Error::Config`] naming the offending variable when a
    /// numeric value does not parse.
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        override_string("BASE_URL", &mut config.base_url);
        override_string("API_TOKEN", &mut config.api_token);
        override_string("API_PUBLISHER", &mut config.api_publisher);
        override_parsed("PAGE_SIZE", &mut config.page_size)?;
        override_secs("API_CALL_DELAY", &mut config.call_delay)?;
        override_parsed("MAX_RETRIES", &mut config.retry.max_attempts)?;
        override_parsed("MAX_WORKERS", &mut config.max_workers)?;
        override_parsed("RECORDS_PER_RUN", &mut config.records_per_run)?;
        override_parsed("MAX_PAGE", &mut config.max_page)?;
        override_path("STATE_FILE", &mut config.state_file);
        override_path("OUTPUT_DIR", &mut config.output_dir);

        Ok(config)
    }

    /// Check the fatal startup conditions: credentials and a usable base URL.
    ///
    /// Called by the run driver before any network activity; a failure here
    /// aborts the run without touching the API.
    ///
    /// # Errors
    ///
    /// Returns a [`Error::Config`] naming the missing or invalid key.
    pub fn validate(&self) -> Result<()> {
        if self.api_token.trim().is_empty() {
            return Err(Error::config("API_TOKEN is not set", "api_token"));
        }
        if self.api_publisher.trim().is_empty() {
            return Err(Error::config("API_PUBLISHER is not set", "api_publisher"));
        }
        if self.base_url.trim().is_empty() {
            return Err(Error::config("BASE_URL is not set", "base_url"));
        }
        url::Url::parse(&self.base_url).map_err(|e| {
            Error::config(format!("BASE_URL is not a valid URL: {e}"), "base_url")
        })?;
        Ok(())
    }
}

fn override_string(key: &str, value: &mut String) {
    if let Ok(raw) = std::env::var(key) {
        *value = raw;
    }
}

fn override_path(key: &str, value: &mut PathBuf) {
    if let Ok(raw) = std::env::var(key) {
        *value = PathBuf::from(raw);
    }
}

fn override_parsed<T>(key: &str, value: &mut T) -> Result<()>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Ok(raw) = std::env::var(key) {
        *value = raw
            .parse()
            .map_err(|e| Error::config(format!("invalid {key} value {raw:?}: {e}"), key))?;
    }
    Ok(())
}

fn override_secs(key: &str, value: &mut Duration) -> Result<()> {
    if let Ok(raw) = std::env::var(key) {
        let secs: u64 = raw
            .parse()
            .map_err(|e| Error::config(format!("invalid {key} value {raw:?}: {e}"), key))?;
        *value = Duration::from_secs(secs);
    }
    Ok(())
}

fn default_page_size() -> usize {
    100
}

fn default_call_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_max_workers() -> usize {
    8
}

fn default_records_per_run() -> usize {
    5000
}

fn default_max_page() -> u32 {
    5000
}

fn default_state_file() -> PathBuf {
    PathBuf::from("harvest_state.json")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("exports")
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay() -> Duration {
    Duration::from_secs(2)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(60)
}

// Duration serialization as whole seconds
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "BASE_URL",
            "API_TOKEN",
            "API_PUBLISHER",
            "PAGE_SIZE",
            "API_CALL_DELAY",
            "MAX_RETRIES",
            "MAX_WORKERS",
            "RECORDS_PER_RUN",
            "MAX_PAGE",
            "STATE_FILE",
            "OUTPUT_DIR",
        ] {
            // SAFETY: tests touching the process environment run under
            // #[serial], so no other thread reads or writes env vars here.
            unsafe { std::env::remove_var(key) };
        }
    }

    #[test]
    fn default_config_matches_documented_values() {
        let config = Config::default();
        assert_eq!(config.page_size, 100);
        assert_eq!(config.call_delay, Duration::from_secs(1));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.max_workers, 8);
        assert_eq!(config.records_per_run, 5000);
        assert_eq!(config.max_page, 5000);
        assert_eq!(config.state_file, PathBuf::from("harvest_state.json"));
        assert_eq!(config.output_dir, PathBuf::from("exports"));
        assert!(!config.retry.jitter);
    }

    #[test]
    fn retry_defaults_use_two_second_base() {
        let retry = RetryConfig::default();
        assert_eq!(retry.base_delay, Duration::from_secs(2));
        assert_eq!(retry.max_delay, Duration::from_secs(60));
    }

    #[test]
    fn config_round_trips_through_json_with_durations_as_seconds() {
        let config = Config {
            call_delay: Duration::from_secs(7),
            ..Config::default()
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["call_delay"], 7);

        let back: Config = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn empty_json_object_deserializes_to_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    #[serial]
    fn from_env_applies_overrides() {
        clear_env();
        unsafe {
            std::env::set_var("API_TOKEN", "tok");
            std::env::set_var("API_PUBLISHER", "pub");
            std::env::set_var("MAX_WORKERS", "4");
            std::env::set_var("API_CALL_DELAY", "0");
            std::env::set_var("MAX_PAGE", "12");
            std::env::set_var("STATE_FILE", "/tmp/state.json");
        }

        let config = Config::from_env().unwrap();
        assert_eq!(config.api_token, "tok");
        assert_eq!(config.api_publisher, "pub");
        assert_eq!(config.max_workers, 4);
        assert_eq!(config.call_delay, Duration::ZERO);
        assert_eq!(config.max_page, 12);
        assert_eq!(config.state_file, PathBuf::from("/tmp/state.json"));
        // Untouched fields keep their defaults
        assert_eq!(config.records_per_run, 5000);

        clear_env();
    }

    #[test]
    #[serial]
    fn from_env_rejects_unparseable_numbers() {
        clear_env();
        unsafe { std::env::set_var("MAX_WORKERS", "many") };

        let err = Config::from_env().unwrap_err();
        match err {
            Error::Config { key, .. } => assert_eq!(key.as_deref(), Some("MAX_WORKERS")),
            other => panic!("expected Config error, got {other}"),
        }

        clear_env();
    }

    #[test]
    fn validate_requires_credentials_before_any_network_call() {
        let mut config = Config {
            base_url: "https://tenant.example.com/api".into(),
            ..Config::default()
        };
        assert!(config.validate().is_err(), "missing token must be fatal");

        config.api_token = "tok".into();
        assert!(config.validate().is_err(), "missing publisher must be fatal");

        config.api_publisher = "pub".into();
        config.validate().unwrap();
    }

    #[test]
    fn validate_rejects_missing_or_malformed_base_url() {
        let mut config = Config {
            api_token: "tok".into(),
            api_publisher: "pub".into(),
            ..Config::default()
        };
        assert!(config.validate().is_err(), "empty base URL must be fatal");

        config.base_url = "not a url".into();
        assert!(config.validate().is_err());
    }
}
