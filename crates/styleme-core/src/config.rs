use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

const APP_DIR: &str = "styleme";

/// Upper bound on advisory items per suggestion.
pub const MAX_ADVISORIES: usize = 8;

/// Upper bound on wardrobe items per outfit.
pub const MAX_OUTFIT_ITEMS: usize = 6;

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
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub weather: WeatherConfig,
    pub location: LocationConfig,
    pub suggestions: SuggestionsConfig,
    pub wardrobe: WardrobeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// wttr.in compatible endpoint
    pub base_url: String,

    /// Optional provider key, sent as `key=` when present
    pub api_key: Option<String>,

    /// Treat a missing key as a configuration failure
    pub require_api_key: bool,

    /// City used when the primary lookup fails
    pub fallback_city: String,

    /// Response language (`lang=`), provider default when unset
    pub language: Option<String>,
}

fn default_weather_base_url() -> String {
    "https://wttr.in".to_string()
}

fn default_fallback_city() -> String {
    "London".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            api_key: None,
            require_api_key: false,
            fallback_city: default_fallback_city(),
            language: None,
        }
    }
}

impl WeatherConfig {
    /// Returns the key to send with provider requests.
    ///
    /// Blank keys count as absent. Fails only when a key is required.
    pub fn credentials(&self) -> Result<Option<&str>, ConfigError> {
        let key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty());

        match key {
            None if self.require_api_key => {
                Err(ConfigError::MissingSetting("weather.api_key".to_string()))
            }
            key => Ok(key),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub ip_lookup_url: String,
    pub sensor_timeout_secs: u64,
    /// Age under which a previous precise fix is reused
    pub max_position_age_secs: u64,
    pub high_accuracy: bool,

    /// Fixed position reported by the host sensor. Both must be set.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

fn default_ip_lookup_url() -> String {
    "https://ipapi.co/json/".to_string()
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            ip_lookup_url: default_ip_lookup_url(),
            sensor_timeout_secs: 10,
            max_position_age_secs: 300,
            high_accuracy: true,
            latitude: None,
            longitude: None,
        }
    }
}

impl LocationConfig {
    pub fn sensor_timeout(&self) -> Duration {
        Duration::from_secs(self.sensor_timeout_secs)
    }

    pub fn max_position_age(&self) -> Duration {
        Duration::from_secs(self.max_position_age_secs)
    }

    /// The configured fixed position, if both halves are present.
    pub fn fixed_position(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionsConfig {
    pub simulated_latency_ms: u64,
    pub max_advisories: usize,
    pub max_items: usize,
}

impl Default for SuggestionsConfig {
    fn default() -> Self {
        Self {
            simulated_latency_ms: 1000,
            max_advisories: MAX_ADVISORIES,
            max_items: MAX_OUTFIT_ITEMS,
        }
    }
}

impl SuggestionsConfig {
    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }

    /// `max_advisories`, never above [`MAX_ADVISORIES`].
    pub fn advisory_limit(&self) -> usize {
        self.max_advisories.min(MAX_ADVISORIES)
    }

    /// `max_items`, never above [`MAX_OUTFIT_ITEMS`].
    pub fn item_limit(&self) -> usize {
        self.max_items.min(MAX_OUTFIT_ITEMS)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WardrobeConfig {
    pub database_path: PathBuf,
}

fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("wardrobe.db")
}

impl Default for WardrobeConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

impl Config {
    /// Load configuration from the default file location and the environment
    ///
    /// Writes a default config file on first run.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::default().save()?;
        }

        Self::load_from_path(Some(config_path))
    }

    /// Load configuration from `path` (or the default location), layering
    /// `STYLEME_<SECTION>__<KEY>` environment overrides on top.
    ///
    /// A missing file is not an error; defaults fill every unset field.
    pub fn load_from_path(path: Option<PathBuf>) -> Result<Self> {
        let config_file = match path {
            Some(p) => p,
            None => Self::config_path()?,
        };

        let mut builder = ::config::Config::builder();

        if config_file.exists() {
            builder = builder.add_source(
                ::config::File::from(config_file.as_path())
                    .required(false)
                    .format(::config::FileFormat::Toml),
            );
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("STYLEME")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .context("Failed to build configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to parse configuration")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    /// Warnings are returned for the caller to log.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        Self::validated(Self::load()?)
    }

    fn validated(config: Self) -> Result<(Self, ValidationResult)> {
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        validate_url(&self.weather.base_url, "weather.base_url", &mut result);
        validate_url(
            &self.location.ip_lookup_url,
            "location.ip_lookup_url",
            &mut result,
        );

        if self.weather.fallback_city.trim().is_empty() {
            result.add_error("weather.fallback_city", "Fallback city must not be empty");
        }

        if let Err(e) = self.weather.credentials() {
            result.add_error("weather.api_key", e.to_string());
        }

        if self.location.sensor_timeout_secs == 0 {
            result.add_error(
                "location.sensor_timeout_secs",
                "Sensor timeout must be greater than 0",
            );
        }

        if self.location.max_position_age_secs == 0 {
            result.add_warning(
                "location.max_position_age_secs",
                "Cached positions disabled (0 seconds)",
            );
        }

        match (self.location.latitude, self.location.longitude) {
            (Some(lat), Some(lon)) => {
                if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
                    result.add_error("location.latitude", "Latitude must be within -90..=90");
                }
                if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
                    result.add_error(
                        "location.longitude",
                        "Longitude must be within -180..=180",
                    );
                }
            }
            (None, None) => {}
            _ => {
                result.add_warning(
                    "location",
                    "Only one of latitude/longitude is set; fixed position ignored",
                );
            }
        }

        if self.suggestions.max_advisories > MAX_ADVISORIES {
            result.add_error(
                "suggestions.max_advisories",
                format!("At most {MAX_ADVISORIES} advisory items are allowed"),
            );
        } else if self.suggestions.max_advisories == 0 {
            result.add_warning(
                "suggestions.max_advisories",
                "Advisory suggestions disabled (0 items)",
            );
        }

        if self.suggestions.max_items > MAX_OUTFIT_ITEMS {
            result.add_error(
                "suggestions.max_items",
                format!("At most {MAX_OUTFIT_ITEMS} outfit items are allowed"),
            );
        } else if self.suggestions.max_items == 0 {
            result.add_warning(
                "suggestions.max_items",
                "Wardrobe suggestions disabled (0 items)",
            );
        }

        if self.suggestions.simulated_latency_ms > 10_000 {
            result.add_warning(
                "suggestions.simulated_latency_ms",
                "Suggestion latency is more than 10 seconds",
            );
        }

        result
    }

    /// Save configuration to the default file location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

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
            .join(APP_DIR);

        Ok(config_dir.join("config.toml"))
    }
}

fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
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

            if url.port() == Some(0) {
                result.add_error(field_name, "Port cannot be 0");
            }
        }
        Err(e) => {
            result.add_error(field_name, format!("Invalid URL: {}", e));
        }
    }
}
