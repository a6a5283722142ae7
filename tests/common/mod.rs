#![allow(dead_code)]

use std::{fs, path::PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Isolated data and config files for one test.
pub struct TestEnv {
    _dir: TempDir,
    pub store: PathBuf,
    pub config: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let store = dir.path().join("data").join("finperiod.json");
        let config = dir.path().join("config.json");
        Self {
            _dir: dir,
            store,
            config,
        }
    }

    pub fn write_config(&self, json: &str) {
        fs::write(&self.config, json).expect("write config");
    }

    /// The CLI pointed at this environment, uncoloured and without logs.
    pub fn cli(&self) -> Command {
        let mut cmd = Command::cargo_bin("finperiod_cli").expect("binary built");
        cmd.env("RUST_LOG", "off")
            .arg("--store")
            .arg(&self.store)
            .arg("--config")
            .arg(&self.config)
            .arg("--plain");
        cmd
    }

    pub fn cli_on(&self, date: &str) -> Command {
        let mut cmd = self.cli();
        cmd.arg("--as-of").arg(date);
        cmd
    }
}
