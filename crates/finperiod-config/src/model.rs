use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ConfigError;

const STORE_FILE: &str = "finperiod.json";

/// Settings shared by the CLI and the daily rollover driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Start day given to newly created users.
    #[serde(default = "Config::default_period_start_day_value")]
    pub default_period_start_day: u32,
    #[serde(default)]
    pub rollover: RolloverSettings,
    #[serde(default = "Config::default_recent_expense_limit")]
    pub recent_expense_limit: usize,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for the data file. Defaults to the platform data dir.
    pub data_root: Option<PathBuf>,
}

/// How the daily sweep treats users whose period starts today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolloverSettings {
    /// Copy budgets immediately instead of only flagging the user.
    #[serde(default)]
    pub auto_apply: bool,
    #[serde(default = "RolloverSettings::default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_period_start_day: Self::default_period_start_day_value(),
            rollover: RolloverSettings::default(),
            recent_expense_limit: Self::default_recent_expense_limit(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            data_root: None,
        }
    }
}

impl Default for RolloverSettings {
    fn default() -> Self {
        Self {
            auto_apply: false,
            poll_interval_secs: Self::default_poll_interval_secs(),
        }
    }
}

impl RolloverSettings {
    pub fn default_poll_interval_secs() -> u64 {
        60
    }
}

impl Config {
    pub fn default_period_start_day_value() -> u32 {
        1
    }

    pub fn default_recent_expense_limit() -> usize {
        5
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=28).contains(&self.default_period_start_day) {
            return Err(ConfigError::Invalid(format!(
                "default_period_start_day must be between 1 and 28, got {}",
                self.default_period_start_day
            )));
        }
        if self.rollover.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "rollover.poll_interval_secs must be positive".into(),
            ));
        }
        if self.recent_expense_limit == 0 {
            return Err(ConfigError::Invalid(
                "recent_expense_limit must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn resolve_data_root(&self) -> PathBuf {
        if let Some(path) = &self.data_root {
            return path.clone();
        }

        let base = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join("finperiod")
    }

    /// Location of the JSON data file inside the data root.
    pub fn store_path(&self) -> PathBuf {
        self.resolve_data_root().join(STORE_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_files_fill_in_defaults() {
        let cfg: Config = serde_json::from_str(r#"{ "rollover": { "auto_apply": true } }"#).unwrap();
        assert!(cfg.rollover.auto_apply);
        assert_eq!(cfg.rollover.poll_interval_secs, 60);
        assert_eq!(cfg.default_period_start_day, 1);
        assert_eq!(cfg.recent_expense_limit, 5);
        assert!(cfg.data_root.is_none());
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let mut cfg = Config::default();
        assert!(cfg.validate().is_ok());
        cfg.default_period_start_day = 29;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
        cfg.default_period_start_day = 28;
        cfg.rollover.poll_interval_secs = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn explicit_data_root_wins() {
        let cfg = Config {
            data_root: Some(PathBuf::from("/tmp/fp")),
            ..Config::default()
        };
        assert_eq!(cfg.store_path(), PathBuf::from("/tmp/fp/finperiod.json"));
    }
}
