//! Configuration for the input manager.
//!
//! Settings are loaded from a TOML file when the host provides one; all
//! fields have sensible defaults and missing files simply mean defaults.
//! Out-of-range values are clamped with a warning rather than rejected.
//!
//! # Example TOML
//! ```toml
//! accept_equal_ticks = true
//! default_pressure = 0.5
//! max_pending_save_points = 64
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors from loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for [`ManagerConfig`]
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Tuning knobs for [`crate::pipeline::InputManager`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Whether an event whose tick equals the device's last accepted tick is
    /// treated as fresh. Some hardware reports coalesced samples with equal
    /// timestamps; rejecting them drops real samples.
    pub accept_equal_ticks: bool,

    /// Pressure assumed for devices that report none, in `0.0..=1.0`.
    pub default_pressure: f64,

    /// Soft cap on save points awaiting release. Exceeding it does not
    /// change behavior (history is never discarded while locked) but is
    /// logged, since it usually means a modifier leaked a locked holder.
    pub max_pending_save_points: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            accept_equal_ticks: true,
            default_pressure: 0.5,
            max_pending_save_points: 64,
        }
    }
}

impl ManagerConfig {
    /// Loads configuration from a TOML file, clamping invalid values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let mut config: ManagerConfig = toml::from_str(&contents)?;
        config.validate_and_clamp();
        log::debug!("Loaded manager config from {}", path.display());
        Ok(config)
    }

    /// Clamps all values to acceptable ranges, warning on each adjustment.
    fn validate_and_clamp(&mut self) {
        if !(0.0..=1.0).contains(&self.default_pressure) {
            log::warn!(
                "Invalid default_pressure {:.2}, clamping to 0.0-1.0 range",
                self.default_pressure
            );
            self.default_pressure = self.default_pressure.clamp(0.0, 1.0);
        }
        if self.max_pending_save_points == 0 {
            log::warn!("max_pending_save_points must be at least 1, using 1");
            self.max_pending_save_points = 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_sensible() {
        let config = ManagerConfig::default();
        assert!(config.accept_equal_ticks);
        assert_eq!(config.default_pressure, 0.5);
        assert!(config.max_pending_save_points >= 1);
    }

    #[test]
    fn load_parses_partial_files_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_pressure = 0.8").unwrap();
        let config = ManagerConfig::load(file.path()).unwrap();
        assert_eq!(config.default_pressure, 0.8);
        assert!(config.accept_equal_ticks);
    }

    #[test]
    fn load_clamps_out_of_range_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_pressure = 3.0").unwrap();
        writeln!(file, "max_pending_save_points = 0").unwrap();
        let config = ManagerConfig::load(file.path()).unwrap();
        assert_eq!(config.default_pressure, 1.0);
        assert_eq!(config.max_pending_save_points, 1);
    }

    #[test]
    fn load_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_pressure = \"heavy\"").unwrap();
        assert!(matches!(
            ManagerConfig::load(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_reports_missing_files() {
        assert!(matches!(
            ManagerConfig::load(Path::new("/nonexistent/inkpipe.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
