//! finperiod-config
//!
//! Engine settings (rollover policy, defaults, data location) and their
//! on-disk persistence.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::{Config, RolloverSettings};
