use std::env;
use std::fmt;

use thiserror::Error;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const API_BASE_VAR: &str = "OPENAI_API_BASE";
pub const API_MODEL_VAR: &str = "OPENAI_API_MODEL";
pub const MODEL_TIMEOUT_VAR: &str = "MODEL_TIMEOUT_SECS";

const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing {}", .keys.join(", "))]
    Missing { keys: Vec<&'static str> },
}

#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub model_timeout_secs: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("model_timeout_secs", &self.model_timeout_secs)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|key| env::var(key).ok())
    }

    pub(crate) fn from_env_with(
        mut get_var: impl FnMut(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut missing = Vec::new();
        let mut required = |key: &'static str| {
            let value = non_empty(get_var(key));
            if value.is_none() {
                missing.push(key);
            }
            value.unwrap_or_default()
        };

        let api_key = required(API_KEY_VAR);
        let api_base = required(API_BASE_VAR);
        let model = required(API_MODEL_VAR);
        if !missing.is_empty() {
            return Err(ConfigError::Missing { keys: missing });
        }

        let model_timeout_secs = parse_model_timeout_secs(get_var(MODEL_TIMEOUT_VAR).as_deref());

        Ok(Self {
            api_key,
            api_base,
            model,
            model_timeout_secs,
        })
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_positive_u64(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

fn parse_model_timeout_secs(raw: Option<&str>) -> u64 {
    parse_positive_u64(raw, DEFAULT_MODEL_TIMEOUT_SECS)
}
