use std::fs;

use finperiod_config::{Config, ConfigError, ConfigManager};
use tempfile::tempdir;

#[test]
fn missing_file_yields_manual_rollover_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"));

    let cfg = manager.load().expect("load defaults");
    assert_eq!(cfg, Config::default());
    assert!(!cfg.rollover.auto_apply);
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().join("nested")).expect("manager");

    let mut cfg = Config::default();
    cfg.rollover.auto_apply = true;
    cfg.default_period_start_day = 25;
    cfg.data_root = Some(dir.path().join("data"));

    manager.save(&cfg).expect("save config");
    assert!(manager.config_path().exists());
    assert!(!manager.config_path().with_extension("json.tmp").exists());

    let loaded = manager.load().expect("load config");
    assert_eq!(loaded, cfg);
}

#[test]
fn invalid_files_are_reported() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    let manager = ConfigManager::new(path.clone());

    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(manager.load(), Err(ConfigError::Serde(_))));

    fs::write(&path, r#"{ "default_period_start_day": 31 }"#).unwrap();
    assert!(matches!(manager.load(), Err(ConfigError::Invalid(_))));
}

#[test]
fn saving_an_invalid_config_is_refused() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"));
    let cfg = Config {
        recent_expense_limit: 0,
        ..Config::default()
    };
    assert!(manager.save(&cfg).is_err());
    assert!(!manager.config_path().exists());
}
