pub mod config;
pub mod error;

pub use config::{
    Config, LocationConfig, LoggingConfig, SuggestionsConfig, ValidationResult, WardrobeConfig,
    WeatherConfig, MAX_ADVISORIES, MAX_OUTFIT_ITEMS,
};
pub use error::{
    AppError, ConfigError, NetworkError, ReqwestErrorExt, RusqliteErrorExt, StorageError,
    WeatherError,
};

use anyhow::Result;

/// Initialize logging.
///
/// `default_level` applies when `RUST_LOG` is unset or unparseable.
pub fn init(default_level: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    tracing::info!("StyleMe core initialized");
    Ok(())
}
