// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::sensor::{DeviceSensorProvider, DummySensorProvider, SensorError, SensorProviderPointer};

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV: &str = "WEATHER_WIDGET_CONFIG";

/// Where readings come from.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SensorSource {
    /// The device if its character device exists, dummy data otherwise.
    #[default]
    Auto,
    Device,
    Dummy,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct WidgetConfig {
    pub source: SensorSource,
    pub device_path: PathBuf,
    pub period_path: PathBuf,

    /// Directory with `temperature`, `pressure` and `humidity` icons
    /// replacing the built-in ones.
    pub icon_dir: Option<PathBuf>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            source: SensorSource::Auto,
            device_path: DeviceSensorProvider::DEVICE_PATH.into(),
            period_path: DeviceSensorProvider::PERIOD_PATH.into(),
            icon_dir: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl WidgetConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json_data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.into(),
            source,
        })?;

        serde_json::from_str(&json_data).map_err(|source| ConfigError::Parse {
            path: path.into(),
            source,
        })
    }

    /// Loads the file named by [`CONFIG_ENV`], or the defaults if it is unset.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => {
                log::info!("Loading config from {path:?}");
                Self::from_file(Path::new(&path))
            }
            None => Ok(Self::default()),
        }
    }

    /// Resolves [`SensorSource::Auto`] against the filesystem.
    pub fn resolved_source(&self) -> SensorSource {
        match self.source {
            SensorSource::Auto if self.device_path.exists() => SensorSource::Device,
            SensorSource::Auto => SensorSource::Dummy,
            source => source,
        }
    }

    pub fn sensor_provider(&self) -> Result<SensorProviderPointer, SensorError> {
        let provider: SensorProviderPointer = match self.resolved_source() {
            SensorSource::Device => {
                log::info!("Reading sensor from {}", self.device_path.display());
                Box::new(DeviceSensorProvider::new(&self.device_path, &self.period_path))
            }
            _ => {
                log::info!("No sensor at {}, using dummy data", self.device_path.display());
                Box::new(DummySensorProvider::new()?)
            }
        };

        Ok(provider)
    }
}

#[test]
fn test_config_defaults_for_missing_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("widget.json");
    std::fs::write(&path, r#"{ "source": "dummy", "icon_dir": "/opt/icons" }"#).unwrap();

    let config = WidgetConfig::from_file(&path).unwrap();

    assert_eq!(config.source, SensorSource::Dummy);
    assert_eq!(config.device_path, Path::new("/dev/bme280"));
    assert_eq!(config.icon_dir.as_deref(), Some(Path::new("/opt/icons")));
}

#[test]
fn test_config_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("widget.json");

    assert!(matches!(WidgetConfig::from_file(&path), Err(ConfigError::Io { .. })));

    std::fs::write(&path, r#"{ "source": "sometimes" }"#).unwrap();
    assert!(matches!(WidgetConfig::from_file(&path), Err(ConfigError::Parse { .. })));
}

#[test]
fn test_resolved_source() {
    let dir = tempfile::tempdir().unwrap();
    let device_path = dir.path().join("bme280");

    let config = WidgetConfig {
        device_path: device_path.clone(),
        ..Default::default()
    };
    assert_eq!(config.resolved_source(), SensorSource::Dummy);

    std::fs::write(&device_path, [0u8; 40]).unwrap();
    assert_eq!(config.resolved_source(), SensorSource::Device);

    let config = WidgetConfig {
        source: SensorSource::Dummy,
        ..config
    };
    assert_eq!(config.resolved_source(), SensorSource::Dummy);
}
