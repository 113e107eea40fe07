//! Workbench configuration.

use schemalab_fetch::{BoxedHttpClient, FetchRequestConfig, ReqwestHttpClient};
use schemalab_models::{ModelError, OpenAIChatModel};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Model used by new generators.
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";
/// Model used by the config assistant.
pub const DEFAULT_ASSISTANT_MODEL: &str = "gpt-4o";
/// System message of the initial generator.
pub const DEFAULT_SYSTEM_MESSAGE: &str =
    "You are a helpful assistant that extracts structured data from user input.";
/// System message of generators added later.
pub const NEW_GENERATOR_SYSTEM_MESSAGE: &str =
    "You are an expert data analyst who focuses on conciseness.";
/// Text of the initial input card.
pub const SAMPLE_INPUT: &str = "Vercel is a platform for frontend developers, providing the speed and reliability innovators need to create at the moment of inspiration.";
/// URL of new fetch inputs.
pub const DEFAULT_FETCH_URL: &str = "https://pokeapi.co/api/v2/pokemon/pikachu";
/// Timeout of new fetch inputs and of fetches that set none.
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 10_000;

/// Invalid configuration value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable could not be parsed.
    #[error("Invalid value {value:?} for {var}: {reason}")]
    InvalidVar {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Defaults and credentials for a workbench.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkbenchConfig {
    /// Model of new generators.
    pub default_model: String,
    /// Model used by the config assistant.
    pub assistant_model: String,
    /// System message of the initial generator.
    pub default_system_message: String,
    /// System message of generators added later.
    pub new_generator_system_message: String,
    /// Text of the initial input card.
    pub sample_input: String,
    /// URL of new fetch inputs.
    pub default_fetch_url: String,
    /// Fetch timeout in milliseconds.
    pub fetch_timeout_ms: u64,
    /// OpenAI API key.
    #[serde(skip)]
    pub api_key: Option<String>,
    /// Alternative OpenAI-compatible base URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            default_model: DEFAULT_MODEL.to_string(),
            assistant_model: DEFAULT_ASSISTANT_MODEL.to_string(),
            default_system_message: DEFAULT_SYSTEM_MESSAGE.to_string(),
            new_generator_system_message: NEW_GENERATOR_SYSTEM_MESSAGE.to_string(),
            sample_input: SAMPLE_INPUT.to_string(),
            default_fetch_url: DEFAULT_FETCH_URL.to_string(),
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            api_key: None,
            base_url: None,
        }
    }
}

impl WorkbenchConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read overrides from the environment:
    ///
    /// - `OPENAI_API_KEY`
    /// - `SCHEMALAB_BASE_URL`
    /// - `SCHEMALAB_DEFAULT_MODEL`
    /// - `SCHEMALAB_FETCH_TIMEOUT_MS`
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidVar`] when the timeout is not a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) but reading from `lookup`.
    ///
    /// # Errors
    ///
    /// See [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        config.api_key = non_blank("OPENAI_API_KEY");
        config.base_url = non_blank("SCHEMALAB_BASE_URL");
        if let Some(model) = non_blank("SCHEMALAB_DEFAULT_MODEL") {
            config.default_model = model;
        }
        if let Some(raw) = non_blank("SCHEMALAB_FETCH_TIMEOUT_MS") {
            config.fetch_timeout_ms = match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => ms,
                Ok(_) => {
                    return Err(ConfigError::InvalidVar {
                        var: "SCHEMALAB_FETCH_TIMEOUT_MS",
                        value: raw,
                        reason: "must be greater than zero".to_string(),
                    })
                }
                Err(e) => {
                    return Err(ConfigError::InvalidVar {
                        var: "SCHEMALAB_FETCH_TIMEOUT_MS",
                        value: raw,
                        reason: e.to_string(),
                    })
                }
            };
        }
        Ok(config)
    }

    /// Set the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the model of new generators.
    #[must_use]
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Set the assistant model.
    #[must_use]
    pub fn with_assistant_model(mut self, model: impl Into<String>) -> Self {
        self.assistant_model = model.into();
        self
    }

    /// Set the sample input text.
    #[must_use]
    pub fn with_sample_input(mut self, text: impl Into<String>) -> Self {
        self.sample_input = text.into();
        self
    }

    /// Set the fetch timeout.
    #[must_use]
    pub fn with_fetch_timeout_ms(mut self, ms: u64) -> Self {
        self.fetch_timeout_ms = ms;
        self
    }

    /// Fetch timeout as a duration.
    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Request used by new fetch inputs.
    #[must_use]
    pub fn default_fetch_request(&self) -> FetchRequestConfig {
        FetchRequestConfig::get(&self.default_fetch_url)
            .with_header("Accept", "application/json")
            .with_timeout_ms(self.fetch_timeout_ms)
    }

    /// Build the OpenAI client described by this configuration.
    ///
    /// # Errors
    ///
    /// [`ModelError::Configuration`] when no API key is set.
    pub fn openai_model(&self) -> Result<OpenAIChatModel, ModelError> {
        let key = self.api_key.as_deref().ok_or_else(|| {
            ModelError::configuration("OPENAI_API_KEY environment variable not set")
        })?;
        let model = OpenAIChatModel::new(key);
        Ok(match &self.base_url {
            Some(url) => model.with_base_url(url),
            None => model,
        })
    }

    /// Build the HTTP client used to resolve fetch inputs.
    #[must_use]
    pub fn http_client(&self) -> BoxedHttpClient {
        Arc::new(ReqwestHttpClient::new().with_default_timeout(self.fetch_timeout()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = WorkbenchConfig::default();
        assert_eq!(config.default_model, "gpt-4.1-nano");
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
        let fetch = config.default_fetch_request();
        assert_eq!(fetch.url, DEFAULT_FETCH_URL);
        assert_eq!(fetch.headers.get("Accept").map(String::as_str), Some("application/json"));
        assert_eq!(fetch.timeout_ms, Some(10_000));
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = WorkbenchConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-1"),
            ("SCHEMALAB_DEFAULT_MODEL", "gpt-4o"),
            ("SCHEMALAB_FETCH_TIMEOUT_MS", "2500"),
            ("SCHEMALAB_BASE_URL", " "),
        ]))
        .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("sk-1"));
        assert_eq!(config.default_model, "gpt-4o");
        assert_eq!(config.fetch_timeout_ms, 2500);
        assert_eq!(config.base_url, None);
    }

    #[test]
    fn test_from_lookup_rejects_bad_timeout() {
        let err = WorkbenchConfig::from_lookup(lookup(&[("SCHEMALAB_FETCH_TIMEOUT_MS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVar { var: "SCHEMALAB_FETCH_TIMEOUT_MS", .. }));
        assert!(WorkbenchConfig::from_lookup(lookup(&[("SCHEMALAB_FETCH_TIMEOUT_MS", "0")])).is_err());
    }

    #[test]
    fn test_openai_model_requires_key() {
        let err = WorkbenchConfig::default().openai_model().unwrap_err();
        assert!(matches!(err, ModelError::Configuration(_)));
        assert!(WorkbenchConfig::default().with_api_key("sk").openai_model().is_ok());
    }

    #[test]
    fn test_api_key_never_serialized() {
        let json = serde_json::to_value(WorkbenchConfig::default().with_api_key("sk-secret")).unwrap();
        assert!(json.get("api_key").is_none());
    }
}
