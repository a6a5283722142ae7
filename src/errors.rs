use finperiod_config::ConfigError;
use finperiod_core::CoreError;
use thiserror::Error;

/// Failures surfaced by the facade and the CLI.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Cannot install the stop handler: {0}")]
    Signal(#[from] ctrlc::Error),
    #[error("{0}")]
    Input(String),
}
