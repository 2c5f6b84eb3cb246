use std::env;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";
const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MAX_CHARS: usize = 12_000;
const DEFAULT_MAX_BODY_BYTES: usize = 8 * 1024 * 1024;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,

    #[error("invalid value {value:?} for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Process-wide settings, read once at startup and never mutated afterwards.
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub upstream_base_url: String,
    pub allowed_models: Vec<String>,
    pub default_model: String,
    /// Shared access code. `None` disables the check.
    pub workshop_code: Option<String>,
    pub max_chars: usize,
    /// Transport cap on the raw `/chat` body, independent of `max_chars`.
    pub max_body_bytes: usize,
    pub cors_origins: Vec<String>,
    pub upstream_timeout: Duration,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values are treated the same as unset ones
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = get("OPENAI_API_KEY").ok_or(ConfigError::MissingApiKey)?;

        let upstream_base_url = get("OPENAI_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let allowed_models = parse_list(&get("ALLOWED_MODELS").unwrap_or_else(|| DEFAULT_MODEL.to_string()));
        let default_model = get("DEFAULT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        // Only an empty code disables the gate; whitespace is still a code
        let workshop_code = lookup("WORKSHOP_CODE").filter(|v| !v.is_empty());

        let max_chars = match get("MAX_CHARS") {
            Some(raw) => parse_number("MAX_CHARS", &raw)?,
            None => DEFAULT_MAX_CHARS,
        };

        let max_body_bytes = match get("MAX_BODY_BYTES") {
            Some(raw) => parse_number("MAX_BODY_BYTES", &raw)?,
            None => DEFAULT_MAX_BODY_BYTES,
        };

        let mut cors_origins = parse_list(&get("CORS_ORIGINS").unwrap_or_else(|| "*".to_string()));
        if cors_origins.is_empty() {
            cors_origins.push("*".to_string());
        }

        let timeout_secs: u64 = match get("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => parse_number("UPSTREAM_TIMEOUT_SECS", &raw)?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "UPSTREAM_TIMEOUT_SECS",
                value: "0".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = match get("PORT") {
            Some(raw) => parse_number("PORT", &raw)?,
            None => 8000,
        };

        Ok(Self {
            api_key,
            upstream_base_url,
            allowed_models,
            default_model,
            workshop_code,
            max_chars,
            max_body_bytes,
            cors_origins,
            upstream_timeout: Duration::from_secs(timeout_secs),
            host,
            port,
        })
    }

    pub fn is_model_allowed(&self, model: &str) -> bool {
        self.allowed_models.iter().any(|m| m == model)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("upstream_base_url", &self.upstream_base_url)
            .field("allowed_models", &self.allowed_models)
            .field("default_model", &self.default_model)
            .field("workshop_code", &self.workshop_code.as_ref().map(|_| "<redacted>"))
            .field("max_chars", &self.max_chars)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("cors_origins", &self.cors_origins)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

/// Parse a comma-separated list, trimming whitespace and filtering empties.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_number<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        name,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
