use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://api.cloudflare.com/client/v4";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RECORD_TTL: u32 = 120;
pub const DEFAULT_PROPAGATION_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_POLLING_INTERVAL_SECS: u64 = 2;

const REDACTED: &str = "****";

/// Solver configuration, read from `CLOUDFLARE_*` environment variables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Account email, required together with a global API key
    pub email: Option<String>,
    /// Global API key (`X-Auth-Key`)
    pub api_key: Option<String>,
    /// Scoped API token (`Authorization: Bearer`)
    pub api_token: Option<String>,
    /// Base URL of the Cloudflare v4 API
    pub api_url: String,
    /// Per-request HTTP timeout
    pub http_timeout_secs: u64,
    /// TTL of the challenge TXT record
    pub record_ttl: u32,
    /// How long callers should wait for the record to propagate
    pub propagation_timeout_secs: u64,
    /// How often callers should poll while waiting for propagation
    pub polling_interval_secs: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            email: None,
            api_key: None,
            api_token: None,
            api_url: DEFAULT_API_URL.to_string(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            record_ttl: DEFAULT_RECORD_TTL,
            propagation_timeout_secs: DEFAULT_PROPAGATION_TIMEOUT_SECS,
            polling_interval_secs: DEFAULT_POLLING_INTERVAL_SECS,
        }
    }
}

impl SolverConfig {
    /// Reads the configuration from the process environment
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, applying defaults for unset keys.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        config.email = get("CLOUDFLARE_EMAIL");
        config.api_key = get("CLOUDFLARE_API_KEY");
        config.api_token = get("CLOUDFLARE_API_TOKEN");

        if let Some(v) = get("CLOUDFLARE_API_URL") {
            config.api_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = get("CLOUDFLARE_HTTP_TIMEOUT") {
            config.http_timeout_secs = parse_number("CLOUDFLARE_HTTP_TIMEOUT", &v)?;
        }
        if let Some(v) = get("CLOUDFLARE_TTL") {
            config.record_ttl = parse_number("CLOUDFLARE_TTL", &v)?;
        }
        if let Some(v) = get("CLOUDFLARE_PROPAGATION_TIMEOUT") {
            config.propagation_timeout_secs = parse_number("CLOUDFLARE_PROPAGATION_TIMEOUT", &v)?;
        }
        if let Some(v) = get("CLOUDFLARE_POLLING_INTERVAL") {
            config.polling_interval_secs = parse_number("CLOUDFLARE_POLLING_INTERVAL", &v)?;
        }

        Ok(config)
    }

    /// Reads the environment, falling back to values from a `.env` file.
    ///
    /// An explicit `env_file` must exist. Without one, `./.env` is used when present.
    /// Variables already set in the environment take precedence over the file.
    pub fn load(env_file: Option<&Path>) -> AppResult<Self> {
        Self::load_with(env_file, |key| std::env::var(key).ok())
    }

    /// [`SolverConfig::load`] with `env` standing in for the process environment
    pub fn load_with<F>(env_file: Option<&Path>, env: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file_vars = match env_file {
            Some(path) => parse_dotenv(&std::fs::read_to_string(path)?),
            None => {
                let candidate = PathBuf::from(".env");
                if candidate.exists() {
                    debug!(path = %candidate.display(), "Loading variables from .env");
                    parse_dotenv(&std::fs::read_to_string(&candidate)?)
                } else {
                    HashMap::new()
                }
            }
        };

        Self::from_lookup(|key| env(key).or_else(|| file_vars.get(key).cloned()))
    }

    /// Copy of the configuration with secrets masked, for display
    pub fn redacted(&self) -> Self {
        let mask = |v: &Option<String>| v.as_ref().map(|_| REDACTED.to_string());
        Self {
            api_key: mask(&self.api_key),
            api_token: mask(&self.api_token),
            ..self.clone()
        }
    }

    pub fn to_json_redacted(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(&self.redacted())?)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> AppResult<T> {
    value
        .parse()
        .map_err(|_| AppError::Config(format!("{key} must be a non-negative integer, got '{value}'")))
}

/// Parses a basic `.env` file (`KEY=VALUE` per line, `#` comments)
fn parse_dotenv(content: &str) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            let value = value.trim().trim_matches('"').trim_matches('\'');
            vars.insert(key.to_string(), value.to_string());
        }
    }
    vars
}
