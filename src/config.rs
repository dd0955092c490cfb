//! # Configuration Management
//!
//! This module handles loading and saving the astro-clock.toml file. It holds the
//! manually configured observer position (used whenever no valid GPS fix is available)
//! and the engine options the display exposes: which solar horizon to show, which
//! moon-phase model to use, and which Easter reckoning to follow.
//!
//! ```toml
//! [location]
//! name = "Oslo"
//! latitude = 59.945556
//! longitude = 10.75
//! locator = "JO59jw"   # optional, overrides latitude/longitude
//!
//! [engine]
//! horizon = "civil"
//! phase_model = "fast"
//! easter_reckoning = "julian"
//! ```

use crate::events::Reckoning;
use crate::lunar::PhaseModel;
use crate::solar::Horizon;
use crate::{GeoPosition, LocationError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "astro-clock.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("config encode: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Application configuration loaded from astro-clock.toml
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Manual observer position
    pub location: LocationConfig,
    /// Engine options
    #[serde(default)]
    pub engine: EngineSettings,
}

/// Manually configured observer position
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LocationConfig {
    /// Human-readable place name for reference
    pub name: String,
    /// Degrees, north positive
    pub latitude: f64,
    /// Degrees, east positive
    pub longitude: f64,
    /// Maidenhead locator; when present it wins over latitude/longitude
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locator: Option<String>,
}

/// Options that change what the engine computes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
pub struct EngineSettings {
    #[serde(default)]
    pub horizon: Horizon,
    #[serde(default)]
    pub phase_model: PhaseModel,
    #[serde(default)]
    pub easter_reckoning: Reckoning,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            location: LocationConfig {
                name: "Oslo".to_string(),
                latitude: 59.945556,
                longitude: 10.75,
                locator: None,
            },
            engine: EngineSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration from astro-clock.toml
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!(location = %config.location.name, "loaded configuration");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "invalid config file format, using defaults (Oslo)");
                    Self::default()
                }
            },
            Err(_) => {
                info!(path = %path.display(), "no config file found, using defaults (Oslo)");
                Self::default()
            }
        }
    }

    /// Save current configuration to astro-clock.toml
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to_path(CONFIG_FILE)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path.as_ref(), contents)?;
        info!(path = %path.as_ref().display(), "configuration saved");
        Ok(())
    }

    /// The configured manual position, from the locator if one is set.
    pub fn manual_position(&self) -> Result<GeoPosition, LocationError> {
        match &self.location.locator {
            Some(locator) => GeoPosition::from_maidenhead(locator),
            None => GeoPosition::new(self.location.latitude, self.location.longitude),
        }
    }

    /// Position to compute for: the GPS fix when there is a valid one, otherwise the
    /// manual position, otherwise the built-in default.
    pub fn resolve_position(&self, fix: Option<GeoPosition>) -> GeoPosition {
        if let Some(fix) = fix.filter(GeoPosition::is_valid) {
            return fix;
        }
        match self.manual_position() {
            Ok(position) => {
                debug!(?position, "no valid fix, using manual position");
                position
            }
            Err(e) => {
                warn!(error = %e, "manual position invalid, using default");
                let default = Config::default().location;
                GeoPosition {
                    latitude: default.latitude,
                    longitude: default.longitude,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.location.name, "Oslo");
        assert_eq!(config.location.latitude, 59.945556);
        assert_eq!(config.engine.horizon, Horizon::Actual);
        assert_eq!(config.engine.phase_model, PhaseModel::Accurate);
        assert_eq!(config.engine.easter_reckoning, Reckoning::Gregorian);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let config = Config::load_from_path("/nonexistent/path");
        // Should fallback to default
        assert_eq!(config.location.name, "Oslo");
    }

    #[test]
    fn test_engine_section_is_optional_and_lowercase() {
        let config: Config = toml::from_str(
            r#"
            [location]
            name = "Sydney"
            latitude = -33.87
            longitude = 151.21
            "#,
        )
        .unwrap();
        assert_eq!(config.engine, EngineSettings::default());

        let config: Config = toml::from_str(
            r#"
            [location]
            name = "Athens"
            latitude = 37.98
            longitude = 23.73
            [engine]
            horizon = "nautical"
            phase_model = "fast"
            easter_reckoning = "julian"
            "#,
        )
        .unwrap();
        assert_eq!(config.engine.horizon, Horizon::Nautical);
        assert_eq!(config.engine.phase_model, PhaseModel::Fast);
        assert_eq!(config.engine.easter_reckoning, Reckoning::Julian);
    }

    #[test]
    fn test_save_and_reload() {
        let file = NamedTempFile::new().unwrap();
        let mut config = Config::default();
        config.location.locator = Some("JO59jw".to_string());
        config.engine.horizon = Horizon::Civil;
        config.save_to_path(file.path()).unwrap();

        let loaded = Config::load_from_path(file.path());
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "location = 42").unwrap();
        assert_eq!(Config::load_from_path(file.path()), Config::default());
    }

    #[test]
    fn test_position_fallback_policy() {
        let mut config = Config::default();
        let fix = GeoPosition::new(40.0, -74.0).unwrap();
        assert_eq!(config.resolve_position(Some(fix)), fix);

        // An out-of-range fix is ignored
        let bad_fix = GeoPosition {
            latitude: 123.0,
            longitude: 0.0,
        };
        assert_eq!(
            config.resolve_position(Some(bad_fix)).latitude,
            59.945556
        );

        config.location.locator = Some("FN20xr".to_string());
        let position = config.resolve_position(None);
        assert!((position.latitude - 40.73).abs() < 0.1);
        assert!((position.longitude + 74.04).abs() < 0.1);

        config.location.locator = Some("nonsense".to_string());
        assert_eq!(config.resolve_position(None).latitude, 59.945556);
    }
}
