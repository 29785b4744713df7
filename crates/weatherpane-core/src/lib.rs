pub mod config;
pub mod error;

pub use config::{
    Config, LocationConfig, LocationStrategy, OutputConfig, RevealConfig, TemperatureUnit,
    ValidationResult, WeatherConfig,
};
pub use error::{
    AppError, ConfigError, LocationError, NetworkError, ReqwestErrorExt, RenderError,
    WeatherError,
};

use anyhow::Result;

/// Initialize tracing for the whole process.
///
/// Logs go to stderr so stdout stays reserved for rendered HTML.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("weatherpane core initialized");
    Ok(())
}
