//! `config` subcommand: inspect and persist settings.

use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};
use finperiod_config::{Config, ConfigManager};

use super::output;
use crate::errors::AppError;

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective settings as JSON
    Show,
    /// Change one setting and save the file
    Set {
        #[arg(value_enum)]
        key: ConfigKey,
        value: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigKey {
    /// Start day (1-28) given to new users
    DefaultStartDay,
    /// on/off: let sweeps copy budgets instead of flagging
    AutoApply,
    /// Seconds between checks of `sweep --watch`
    PollInterval,
    /// Rows shown by `expense recent`
    RecentLimit,
    /// on/off: coloured output
    Color,
    /// Directory holding the data file
    DataRoot,
}

impl ConfigKey {
    fn apply(self, config: &mut Config, value: &str) -> Result<(), AppError> {
        let value = value.trim();
        match self {
            ConfigKey::DefaultStartDay => config.default_period_start_day = number(value)?,
            ConfigKey::AutoApply => config.rollover.auto_apply = switch(value)?,
            ConfigKey::PollInterval => config.rollover.poll_interval_secs = number(value)?,
            ConfigKey::RecentLimit => config.recent_expense_limit = number(value)?,
            ConfigKey::Color => config.ui_color_enabled = switch(value)?,
            ConfigKey::DataRoot => {
                if value.is_empty() {
                    return Err(AppError::Input("data root cannot be blank".into()));
                }
                config.data_root = Some(PathBuf::from(value));
            }
        }
        Ok(())
    }
}

fn number<T: std::str::FromStr>(value: &str) -> Result<T, AppError> {
    value
        .parse()
        .map_err(|_| AppError::Input(format!("`{value}` is not a whole number")))
}

fn switch(value: &str) -> Result<bool, AppError> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        other => Err(AppError::Input(format!("`{other}` is not on or off"))),
    }
}

/// Runs against the file contents as loaded, before any command-line overrides.
pub fn run_config(
    manager: &ConfigManager,
    mut config: Config,
    command: ConfigCommand,
) -> Result<(), AppError> {
    match command {
        ConfigCommand::Show => println!("{}", serde_json::to_string_pretty(&config)?),
        ConfigCommand::Set { key, value } => {
            key.apply(&mut config, &value)?;
            manager.save(&config)?;
            let name = key
                .to_possible_value()
                .map(|possible| possible.get_name().to_string())
                .unwrap_or_default();
            output::success(format!(
                "{name} set to {} in {}",
                value.trim(),
                manager.config_path().display()
            ));
        }
    }
    Ok(())
}
