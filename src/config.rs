//! Runtime configuration.
//!
//! Credentials, API endpoint, roster defaults, output location and polling
//! limits. Values come from the environment, optionally seeded from `.env`
//! files, and every operation receives them explicitly through
//! [`SpriteConfig`] rather than reading process-wide state.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, SpriteError};

/// Default Scenario API base URL.
pub const DEFAULT_API_URL: &str = "https://api.cloud.scenario.com/v1";

/// Default model used for img2img sprite generation.
pub const DEFAULT_MODEL_ID: &str = "model_p1dBcEaYQ5jUjB2brcf8bb1W";

/// Default reference sprite sheet asset.
pub const DEFAULT_REFERENCE_ASSET_ID: &str = "asset_aNYJezDQZUtkkikLrnhEkshs";

/// Default delay between job status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default cap on status checks per job (30 minutes at the default interval).
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 360;

/// Default per-request HTTP timeout.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(60);

pub const ENV_API_KEY: &str = "SCENARIO_API_KEY";
pub const ENV_API_SECRET: &str = "SCENARIO_API_SECRET";

/// API key and secret used for HTTP Basic authorization.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Limits for the job status polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay before every status check after the first.
    pub interval: Duration,

    /// Maximum number of status checks. `None` polls until terminal.
    pub max_attempts: Option<u32>,

    /// Maximum wall-clock time spent polling one job.
    pub timeout: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: Some(DEFAULT_MAX_POLL_ATTEMPTS),
            timeout: None,
        }
    }
}

impl PollConfig {
    /// Validates the polling limits.
    ///
    /// Returns an error message if validation fails, None otherwise.
    pub fn validate(&self) -> Option<String> {
        if self.max_attempts == Some(0) {
            return Some("poll max_attempts must be > 0".to_string());
        }
        if self.interval > Duration::from_secs(300) {
            return Some(format!(
                "poll interval too long: {}s (max 300)",
                self.interval.as_secs()
            ));
        }
        None
    }
}

/// Runtime configuration for sprite generation.
#[derive(Debug, Clone)]
pub struct SpriteConfig {
    /// Scenario API credentials.
    pub credentials: Credentials,

    /// API base URL, without a trailing slash.
    pub api_url: String,

    /// Model used for the built-in roster.
    pub model_id: String,

    /// Reference sprite sheet used for the built-in roster.
    pub reference_asset_id: String,

    /// Directory for generated sprite sheets.
    /// If None, uses `./generated`.
    pub output_dir: Option<PathBuf>,

    /// Timeout applied to each individual HTTP request.
    pub http_timeout: Duration,

    /// Polling limits.
    pub poll: PollConfig,
}

impl SpriteConfig {
    /// Creates a config with the given credentials and defaults elsewhere.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            api_url: DEFAULT_API_URL.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            reference_asset_id: DEFAULT_REFERENCE_ASSET_ID.to_string(),
            output_dir: None,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            poll: PollConfig::default(),
        }
    }

    /// Creates a SpriteConfig from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `SCENARIO_API_KEY` - API key (required)
    /// - `SCENARIO_API_SECRET` - API secret (required)
    /// - `SCENARIO_API_URL` - API base URL
    /// - `SCENARIO_MODEL_ID` - Model for the built-in roster
    /// - `SCENARIO_REFERENCE_ASSET_ID` - Reference sprite sheet asset
    /// - `SCENARIO_OUTPUT_DIR` - Output directory
    /// - `SCENARIO_HTTP_TIMEOUT_SECS` - Per-request timeout (1-600)
    /// - `SCENARIO_POLL_INTERVAL_SECS` - Delay between status checks (1-300)
    /// - `SCENARIO_POLL_MAX_ATTEMPTS` - Status checks per job (> 0)
    /// - `SCENARIO_POLL_TIMEOUT_SECS` - Wall-clock polling limit per job (> 0)
    ///
    /// Fails with a configuration error if either credential is missing.
    /// Out-of-range numeric values are ignored in favour of defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = var(ENV_API_KEY).ok_or_else(|| SpriteError::missing_config(ENV_API_KEY))?;
        let api_secret =
            var(ENV_API_SECRET).ok_or_else(|| SpriteError::missing_config(ENV_API_SECRET))?;

        let mut config = Self::new(Credentials::new(api_key, api_secret));

        if let Some(url) = var("SCENARIO_API_URL") {
            config.api_url = url.trim_end_matches('/').to_string();
        }

        if let Some(model_id) = var("SCENARIO_MODEL_ID") {
            config.model_id = model_id;
        }

        if let Some(asset_id) = var("SCENARIO_REFERENCE_ASSET_ID") {
            config.reference_asset_id = asset_id;
        }

        if let Some(dir) = var("SCENARIO_OUTPUT_DIR") {
            config.output_dir = Some(PathBuf::from(dir));
        }

        if let Some(secs) = var("SCENARIO_HTTP_TIMEOUT_SECS").and_then(|s| s.parse::<u64>().ok()) {
            if (1..=600).contains(&secs) {
                config.http_timeout = Duration::from_secs(secs);
            }
        }

        if let Some(secs) = var("SCENARIO_POLL_INTERVAL_SECS").and_then(|s| s.parse::<u64>().ok()) {
            if (1..=300).contains(&secs) {
                config.poll.interval = Duration::from_secs(secs);
            }
        }

        if let Some(attempts) =
            var("SCENARIO_POLL_MAX_ATTEMPTS").and_then(|s| s.parse::<u32>().ok())
        {
            if attempts > 0 {
                config.poll.max_attempts = Some(attempts);
            }
        }

        if let Some(secs) = var("SCENARIO_POLL_TIMEOUT_SECS").and_then(|s| s.parse::<u64>().ok()) {
            if secs > 0 {
                config.poll.timeout = Some(Duration::from_secs(secs));
            }
        }

        Ok(config)
    }

    /// Returns the effective output directory.
    pub fn effective_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("generated"))
    }

    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails, None otherwise.
    pub fn validate(&self) -> Option<String> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Some(format!("api_url must be an http(s) URL, got {}", self.api_url));
        }
        if self.model_id.trim().is_empty() {
            return Some("model_id cannot be empty".to_string());
        }
        if self.reference_asset_id.trim().is_empty() {
            return Some("reference_asset_id cannot be empty".to_string());
        }
        self.poll.validate()
    }
}

/// Loads `.env` files into the process environment.
///
/// Reads `./.env` first, then `.env` in the platform config directory:
/// - macOS: ~/Library/Application Support/scenario-sprites/.env
/// - Linux: ~/.config/scenario-sprites/.env
/// - Windows: C:\Users\<user>\AppData\Roaming\scenario-sprites\config\.env
///
/// Variables already set are never overridden. Returns the files loaded.
pub fn load_dotenv() -> Vec<PathBuf> {
    let mut loaded = Vec::new();

    if let Ok(path) = dotenvy::dotenv() {
        loaded.push(path);
    }

    if let Some(path) = user_dotenv_path() {
        if path.exists() && dotenvy::from_path(&path).is_ok() {
            loaded.push(path);
        }
    }

    loaded
}

fn user_dotenv_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "scenario-sprites")
        .map(|dirs| dirs.config_dir().join(".env"))
}
