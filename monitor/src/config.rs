//! Session settings stored as TOML. Missing keys fall back to defaults, so
//! a file only needs to name what it recalibrates.

use std::fs;
use std::path::Path;

use pulseox::Thresholds;
use serde::{Deserialize, Serialize};

use crate::{alarm::AlarmLimits, presence::PresenceThresholds, Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub device_id: String,
    /// Records per telemetry document.
    pub batch_size: usize,
    pub presence: PresenceThresholds,
    pub alarms: AlarmLimits,
    pub thresholds: Thresholds,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device_id: "1".to_owned(),
            batch_size: 10,
            presence: Default::default(),
            alarms: Default::default(),
            thresholds: Default::default(),
        }
    }
}

impl Config {
    /// Loads `path`, writing the defaults there first if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(toml::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("no config at {}, writing defaults", path.display());
                let config = Self::default();
                config.save(path)?;
                Ok(config)
            }
            Err(e) => Err(Error::ConfigRead(e)),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(Error::ConfigWrite)?;
        }
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(path, toml_string).map_err(Error::ConfigWrite)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_uses_defaults() {
        let toml_str = r#"
            device_id = "bedside-3"

            [thresholds]
            max_swing = 2000.0

            [alarms]
            hr_max = 100
        "#;

        let config: Config = toml::from_str(toml_str).expect("Failed to deserialize");
        assert_eq!(config.device_id, "bedside-3");
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.thresholds.max_swing, 2000.0);
        assert_eq!(config.thresholds.min_swing, 0.0);
        assert_eq!(config.thresholds.calibration.offset, 104.0);
        assert_eq!(config.alarms.hr_max, 100);
        assert_eq!(config.alarms.hr_min, 50);
        assert_eq!(config.presence, PresenceThresholds::default());
    }

    #[test]
    fn load_creates_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("monitor.toml");

        let config = Config::load(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());

        let mut changed = config;
        changed.batch_size = 5;
        changed.thresholds.ir_min_retrace = 4.0;
        changed.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), changed);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor.toml");
        fs::write(&path, "batch_size = \"ten\"").unwrap();
        assert!(matches!(Config::load(&path), Err(Error::ConfigParse(_))));
    }
}
