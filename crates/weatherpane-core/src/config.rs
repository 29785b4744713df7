use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

/// Environment variable that overrides `weather.api_key`.
pub const API_KEY_ENV: &str = "WEATHERPANE_API_KEY";

const API_KEY_PLACEHOLDER: &str = "YOUR_WEATHER_API_KEY";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Weather API settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// How the user's position is found
    #[serde(default)]
    pub location: LocationConfig,

    /// Timing of the forecast reveal
    #[serde(default)]
    pub reveal: RevealConfig,

    /// Page and file output
    #[serde(default)]
    pub output: OutputConfig,
}

/// Temperature unit preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Fahrenheit,
    Celsius,
}

impl TemperatureUnit {
    /// Unit letter shown after the degree sign.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Fahrenheit => "F",
            Self::Celsius => "C",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Credential embedded in every weather request path
    #[serde(default = "default_api_key")]
    pub api_key: String,

    /// Base URL; requests go to `{base_url}/{api_key}/{feature}/q/{lat},{lng}.json`
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub temperature_unit: TemperatureUnit,

    /// Per-request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_secs: u64,
}

fn default_api_key() -> String {
    API_KEY_PLACEHOLDER.to_string()
}

fn default_weather_base_url() -> String {
    "https://api.wunderground.com/api".to_string()
}

fn default_weather_timeout() -> u64 {
    10
}

impl WeatherConfig {
    /// Check if the API key is set (not a placeholder)
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && self.api_key != API_KEY_PLACEHOLDER
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
            base_url: default_weather_base_url(),
            temperature_unit: TemperatureUnit::default(),
            timeout_secs: default_weather_timeout(),
        }
    }
}

/// Which location provider to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LocationStrategy {
    /// Native geolocation when the platform offers it, IP lookup otherwise
    #[default]
    Auto,
    Native,
    Ip,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default)]
    pub strategy: LocationStrategy,

    /// JSON endpoint answering with `latitude`/`longitude` for the caller's IP
    #[serde(default = "default_ip_lookup_url")]
    pub ip_lookup_url: String,

    /// How long to wait for the native provider before giving up
    #[serde(default = "default_native_timeout")]
    pub native_timeout_secs: u64,
}

fn default_ip_lookup_url() -> String {
    "https://ipapi.co/json/".to_string()
}

fn default_native_timeout() -> u64 {
    30
}

impl LocationConfig {
    pub fn native_timeout(&self) -> Duration {
        Duration::from_secs(self.native_timeout_secs)
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            strategy: LocationStrategy::default(),
            ip_lookup_url: default_ip_lookup_url(),
            native_timeout_secs: default_native_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealConfig {
    /// Delay before the first forecast day appears, on top of its step
    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,

    /// Extra delay per forecast day position
    #[serde(default = "default_step_delay")]
    pub step_delay_ms: u64,
}

fn default_base_delay() -> u64 {
    800
}

fn default_step_delay() -> u64 {
    60
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay(),
            step_delay_ms: default_step_delay(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Class name of the element fragments are appended to
    #[serde(default = "default_container_class")]
    pub container_class: String,

    /// Where to write the finished page, if anywhere
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_container_class() -> String {
    "mainContainer".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            container_class: default_container_class(),
            path: None,
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        Ok(Self::load_from(&Self::config_path()?)?.apply_env_overrides())
    }

    /// Replace settings that have an environment override set
    pub fn apply_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.is_empty() {
                tracing::debug!("Using API key from {}", API_KEY_ENV);
                self.weather.api_key = key;
            }
        }
        self
    }

    /// Load configuration from `path`, writing defaults there if it doesn't exist
    ///
    /// A file that is not valid TOML for this schema fails with
    /// [`ConfigError::ParseError`].
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            tracing::info!("Wrote default config to {}", path.display());
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e.message())))?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns [`ConfigError::Invalid`] if validation finds critical errors.
    /// Warnings are logged.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.base_url, "weather.base_url", &mut result);
        self.validate_url(
            &self.location.ip_lookup_url,
            "location.ip_lookup_url",
            &mut result,
        );

        if !self.weather.is_configured() {
            result.add_warning(
                "weather.api_key",
                format!("API key not configured - set it in the config file or {API_KEY_ENV}"),
            );
        }

        if self.weather.timeout_secs == 0 {
            result.add_error("weather.timeout_secs", "Timeout must be greater than 0");
        }

        if self.location.native_timeout_secs == 0 {
            result.add_error(
                "location.native_timeout_secs",
                "Timeout must be greater than 0",
            );
        }

        for (field, value) in [
            ("reveal.base_delay_ms", self.reveal.base_delay_ms),
            ("reveal.step_delay_ms", self.reveal.step_delay_ms),
        ] {
            if value > 60_000 {
                result.add_warning(field, "Reveal delay is more than a minute");
            }
        }

        if self.output.container_class.trim().is_empty() {
            result.add_error("output.container_class", "Container class cannot be empty");
        } else if self.output.container_class.contains(char::is_whitespace) {
            result.add_error(
                "output.container_class",
                "Container class must be a single class name",
            );
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("weatherpane");

        Ok(config_dir.join("config.toml"))
    }
}
