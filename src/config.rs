//! Configuration management for the weather bot
//!
//! Handles loading configuration from an optional TOML file and environment
//! variables, and provides validation for all configuration settings.

use crate::WeatherBotError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Root configuration structure for the weather bot
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BotConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// LINE messaging API settings
    #[serde(default)]
    pub line: LineConfig,
    /// NER model settings
    #[serde(default)]
    pub ner: NerConfig,
    /// Weather dataset settings
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Upper bound for handling one webhook request, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u32,
    /// Maximum accepted webhook body size in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

/// LINE messaging API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineConfig {
    /// Long-lived channel access token used for the reply API
    #[serde(default)]
    pub channel_access_token: String,
    /// Channel secret used to verify webhook signatures
    #[serde(default)]
    pub channel_secret: String,
    #[serde(default = "default_line_api_base_url")]
    pub api_base_url: String,
    /// Reply request timeout in seconds
    #[serde(default = "default_upstream_timeout")]
    pub timeout_seconds: u32,
}

/// NER model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NerConfig {
    /// Model hub access token
    #[serde(default)]
    pub hub_token: Option<String>,
    #[serde(default = "default_ner_base_url")]
    pub base_url: String,
    /// Model repository identifier
    #[serde(default = "default_ner_model")]
    pub model: String,
    #[serde(default = "default_aggregation_strategy")]
    pub aggregation_strategy: String,
    /// Entity group that marks a location
    #[serde(default = "default_location_label")]
    pub location_label: String,
    /// Ask the inference backend to run on an accelerator
    #[serde(default)]
    pub use_gpu: bool,
    /// Inference request timeout in seconds
    #[serde(default = "default_upstream_timeout")]
    pub timeout_seconds: u32,
}

/// Weather dataset settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Path to the pre-downloaded forecast JSON
    #[serde(default = "default_weather_data_path")]
    pub data_path: String,
    /// Name of the general weather description element
    #[serde(default = "default_weather_element")]
    pub element_name: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    5000
}

fn default_request_timeout() -> u32 {
    60
}

fn default_body_limit() -> usize {
    1024 * 1024
}

fn default_line_api_base_url() -> String {
    "https://api.line.me".to_string()
}

fn default_upstream_timeout() -> u32 {
    20
}

fn default_ner_base_url() -> String {
    "https://api-inference.huggingface.co".to_string()
}

fn default_ner_model() -> String {
    "ckiplab/bert-base-chinese-ner".to_string()
}

fn default_aggregation_strategy() -> String {
    "simple".to_string()
}

fn default_location_label() -> String {
    "LOC".to_string()
}

fn default_weather_data_path() -> String {
    "F-D0047-091.json".to_string()
}

fn default_weather_element() -> String {
    "Wx".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            request_timeout_seconds: default_request_timeout(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            channel_access_token: String::new(),
            channel_secret: String::new(),
            api_base_url: default_line_api_base_url(),
            timeout_seconds: default_upstream_timeout(),
        }
    }
}

impl Default for NerConfig {
    fn default() -> Self {
        Self {
            hub_token: None,
            base_url: default_ner_base_url(),
            model: default_ner_model(),
            aggregation_strategy: default_aggregation_strategy(),
            location_label: default_location_label(),
            use_gpu: false,
            timeout_seconds: default_upstream_timeout(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            data_path: default_weather_data_path(),
            element_name: default_weather_element(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Well-known environment variables mapped onto their config keys
const ENV_ALIASES: [(&str, &str); 4] = [
    ("LINE_CHANNEL_ACCESS_TOKEN", "line.channel_access_token"),
    ("LINE_CHANNEL_SECRET", "line.channel_secret"),
    ("HF_TOKEN", "ner.hub_token"),
    ("WEATHER_DATA_PATH", "weather.data_path"),
];

impl BotConfig {
    /// Load configuration from an explicit path, the user config directory
    /// or `./config.toml`, then apply environment overrides
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // WEATHERBOT_LINE__CHANNEL_SECRET style overrides
        builder = builder.add_source(
            Environment::with_prefix("WEATHERBOT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        for (var, key) in ENV_ALIASES {
            builder = builder
                .set_override_option(key, env::var(var).ok())
                .with_context(|| format!("Failed to apply {var}"))?;
        }

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: BotConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("weatherbot").join("config.toml"))
    }

    /// Socket address string the server binds to
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = default_request_timeout();
        }
        if self.server.body_limit_bytes == 0 {
            self.server.body_limit_bytes = default_body_limit();
        }
        if self.line.api_base_url.is_empty() {
            self.line.api_base_url = default_line_api_base_url();
        }
        if self.line.timeout_seconds == 0 {
            self.line.timeout_seconds = default_upstream_timeout();
        }
        if self.ner.base_url.is_empty() {
            self.ner.base_url = default_ner_base_url();
        }
        if self.ner.model.is_empty() {
            self.ner.model = default_ner_model();
        }
        if self.ner.aggregation_strategy.is_empty() {
            self.ner.aggregation_strategy = default_aggregation_strategy();
        }
        if self.ner.location_label.is_empty() {
            self.ner.location_label = default_location_label();
        }
        if self.ner.timeout_seconds == 0 {
            self.ner.timeout_seconds = default_upstream_timeout();
        }
        if self.ner.hub_token.as_deref() == Some("") {
            self.ner.hub_token = None;
        }
        if self.weather.data_path.is_empty() {
            self.weather.data_path = default_weather_data_path();
        }
        if self.weather.element_name.is_empty() {
            self.weather.element_name = default_weather_element();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate settings every command needs. LINE credentials are checked
    /// separately by [`BotConfig::validate_secrets`] since only `serve` uses them.
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate LINE channel credentials
    pub fn validate_secrets(&self) -> Result<()> {
        if self.line.channel_secret.is_empty() {
            return Err(WeatherBotError::config(
                "LINE channel secret is missing. Set LINE_CHANNEL_SECRET.",
            )
            .into());
        }

        if self.line.channel_access_token.is_empty() {
            return Err(WeatherBotError::config(
                "LINE channel access token is missing. Set LINE_CHANNEL_ACCESS_TOKEN.",
            )
            .into());
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.server.request_timeout_seconds > 300 {
            return Err(
                WeatherBotError::config("Request timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.line.timeout_seconds > 300 {
            return Err(
                WeatherBotError::config("LINE reply timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.ner.timeout_seconds > 300 {
            return Err(
                WeatherBotError::config("NER inference timeout cannot exceed 300 seconds").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WeatherBotError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WeatherBotError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("LINE API base URL", &self.line.api_base_url),
            ("NER base URL", &self.ner.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(WeatherBotError::config(format!(
                    "{name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> BotConfig {
        let mut config = BotConfig::default();
        config.line.channel_secret = "channel_secret".to_string();
        config.line.channel_access_token = "access_token".to_string();
        config
    }

    #[test]
    fn test_default_config() {
        let config = BotConfig::default();
        assert_eq!(config.ner.model, "ckiplab/bert-base-chinese-ner");
        assert_eq!(config.ner.aggregation_strategy, "simple");
        assert_eq!(config.ner.location_label, "LOC");
        assert_eq!(config.weather.data_path, "F-D0047-091.json");
        assert_eq!(config.weather.element_name, "Wx");
        assert_eq!(config.logging.level, "info");
        assert!(config.ner.hub_token.is_none());
    }

    #[test]
    fn test_config_validation_missing_secret() {
        let config = BotConfig::default();
        let result = config.validate_secrets();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("LINE_CHANNEL_SECRET"));
    }

    #[test]
    fn test_config_validation_with_secrets() {
        let config = configured();
        assert!(config.validate().is_ok());
        assert!(config.validate_secrets().is_ok());
    }

    #[test]
    fn test_default_config_is_valid_without_secrets() {
        // `ask` runs on this; only `serve` requires the LINE credentials
        assert!(BotConfig::default().validate().is_ok());
    }

    #[test]
    fn test_environment_variable_override() {
        let vars = [
            ("LINE_CHANNEL_ACCESS_TOKEN", "token_from_alias"),
            ("LINE_CHANNEL_SECRET", "secret_from_alias"),
            ("WEATHERBOT_LINE__CHANNEL_SECRET", "secret_from_prefixed"),
            ("HF_TOKEN", "hf_from_alias"),
            ("WEATHER_DATA_PATH", "/srv/weather/F-D0047-091.json"),
            ("WEATHERBOT_SERVER__PORT", "8080"),
            ("WEATHERBOT_NER__LOCATION_LABEL", "GPE"),
        ];

        // SAFETY: Test environment, setting test values only
        unsafe {
            for (key, value) in vars {
                env::set_var(key, value);
            }
        }

        let result = BotConfig::load_from_path(Some(PathBuf::from(
            "/definitely/not/here/weatherbot.toml",
        )));

        // SAFETY: Test cleanup
        unsafe {
            for (key, _) in vars {
                env::remove_var(key);
            }
        }

        let config = result.unwrap();
        assert_eq!(config.line.channel_access_token, "token_from_alias");
        // Well-known names win over the prefixed form
        assert_eq!(config.line.channel_secret, "secret_from_alias");
        assert_eq!(config.ner.hub_token.as_deref(), Some("hf_from_alias"));
        assert_eq!(config.weather.data_path, "/srv/weather/F-D0047-091.json");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.ner.location_label, "GPE");
        assert!(config.validate_secrets().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = configured();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = configured();
        config.ner.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("cannot exceed"));
    }

    #[test]
    fn test_config_validation_bad_url() {
        let mut config = configured();
        config.line.api_base_url = "api.line.me".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("LINE API base URL"));
    }

    #[test]
    fn test_apply_defaults_fills_blanks() {
        let mut config = configured();
        config.weather.element_name = String::new();
        config.ner.hub_token = Some(String::new());
        config.apply_defaults();
        assert_eq!(config.weather.element_name, "Wx");
        assert!(config.ner.hub_token.is_none());
    }

    #[test]
    fn test_bind_address() {
        let config = BotConfig::default();
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = BotConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("weatherbot"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
