//! Configuration management for Weather Agent.
//!
//! Configuration can be set via environment variables (a `.env` file is loaded first if present):
//! - `OPENROUTER_API_KEY` - Required. Your OpenRouter API key.
//! - `DEFAULT_MODEL` - Optional. The LLM model to use. Defaults to `anthropic/claude-3-sonnet-20240229`.
//! - `LLM_BASE_URL` - Optional. OpenAI-compatible API base. Defaults to `https://openrouter.ai/api/v1`.
//! - `LLM_TEMPERATURE` - Optional. Sampling temperature. Defaults to `0`.
//! - `MAX_ITERATIONS` - Optional. Maximum agent loop iterations. Defaults to `15`.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `8000`.
//! - `PROMPT_TEMPLATE_URL` - Optional. Remote agent prompt template. Built-in template when unset.
//! - `GEOCODING_URL` - Optional. Defaults to the Open-Meteo geocoding search endpoint.
//! - `FORECAST_URL` - Optional. Defaults to the Open-Meteo forecast endpoint.

use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_MODEL: &str = "anthropic/claude-3-sonnet-20240229";
pub const DEFAULT_LLM_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Upstream endpoints used by the weather tool.
#[derive(Debug, Clone)]
pub struct WeatherConfig {
    /// Geocoding search endpoint (name -> coordinates)
    pub geocoding_url: String,

    /// Forecast endpoint (coordinates -> current conditions)
    pub forecast_url: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            geocoding_url: DEFAULT_GEOCODING_URL.to_string(),
            forecast_url: DEFAULT_FORECAST_URL.to_string(),
        }
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// OpenRouter API key
    pub api_key: String,

    /// LLM model identifier (OpenRouter format)
    pub default_model: String,

    /// Base URL of the OpenAI-compatible chat completions API
    pub llm_base_url: String,

    /// Sampling temperature for every completion
    pub temperature: f32,

    /// Maximum iterations for the agent loop
    pub max_iterations: usize,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Where to fetch the agent prompt template from, if anywhere
    pub prompt_template_url: Option<String>,

    /// Weather tool upstreams
    pub weather: WeatherConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `OPENROUTER_API_KEY` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("OPENROUTER_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("OPENROUTER_API_KEY".to_string()))?;

        let default_model = lookup("DEFAULT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let llm_base_url = lookup("LLM_BASE_URL")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string());

        let temperature = parse_or(&lookup, "LLM_TEMPERATURE", 0.0)?;
        let max_iterations = parse_or(&lookup, "MAX_ITERATIONS", 15)?;
        if max_iterations == 0 {
            return Err(ConfigError::InvalidValue(
                "MAX_ITERATIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_or(&lookup, "PORT", 8000)?;

        let prompt_template_url = lookup("PROMPT_TEMPLATE_URL").filter(|v| !v.trim().is_empty());

        let weather = WeatherConfig {
            geocoding_url: lookup("GEOCODING_URL")
                .unwrap_or_else(|| DEFAULT_GEOCODING_URL.to_string()),
            forecast_url: lookup("FORECAST_URL")
                .unwrap_or_else(|| DEFAULT_FORECAST_URL.to_string()),
        };

        Ok(Self {
            api_key,
            default_model,
            llm_base_url,
            temperature,
            max_iterations,
            host,
            port,
            prompt_template_url,
            weather,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(api_key: String, default_model: String) -> Self {
        Self {
            api_key,
            default_model,
            llm_base_url: DEFAULT_LLM_BASE_URL.to_string(),
            temperature: 0.0,
            max_iterations: 15,
            host: "127.0.0.1".to_string(),
            port: 8000,
            prompt_template_url: None,
            weather: WeatherConfig::default(),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), format!("{}", e))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_api_key() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "OPENROUTER_API_KEY"));
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let err = Config::from_lookup(lookup_from(&[("OPENROUTER_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[("OPENROUTER_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.default_model, DEFAULT_MODEL);
        assert_eq!(config.llm_base_url, DEFAULT_LLM_BASE_URL);
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.max_iterations, 15);
        assert_eq!(config.port, 8000);
        assert!(config.prompt_template_url.is_none());
        assert_eq!(config.weather.geocoding_url, DEFAULT_GEOCODING_URL);
        assert_eq!(config.weather.forecast_url, DEFAULT_FORECAST_URL);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("OPENROUTER_API_KEY", "sk-test"),
            ("DEFAULT_MODEL", "openai/gpt-4o-mini"),
            ("LLM_BASE_URL", "http://localhost:9999/v1/"),
            ("MAX_ITERATIONS", "3"),
            ("PORT", "9000"),
            ("PROMPT_TEMPLATE_URL", "http://templates.local/agent"),
            ("FORECAST_URL", "http://localhost:1234/forecast"),
        ]))
        .unwrap();
        assert_eq!(config.default_model, "openai/gpt-4o-mini");
        assert_eq!(config.llm_base_url, "http://localhost:9999/v1");
        assert_eq!(config.max_iterations, 3);
        assert_eq!(config.port, 9000);
        assert_eq!(
            config.prompt_template_url.as_deref(),
            Some("http://templates.local/agent")
        );
        assert_eq!(config.weather.forecast_url, "http://localhost:1234/forecast");
        assert_eq!(config.weather.geocoding_url, DEFAULT_GEOCODING_URL);
    }

    #[test]
    fn test_invalid_port() {
        let err = Config::from_lookup(lookup_from(&[
            ("OPENROUTER_API_KEY", "sk-test"),
            ("PORT", "not-a-port"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref k, _) if k == "PORT"));
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("OPENROUTER_API_KEY", "sk-test"),
            ("MAX_ITERATIONS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref k, _) if k == "MAX_ITERATIONS"));
    }
}
