//! Configuration for a capture window.

use crate::core::filter::FilterMethod;
use crate::error::CaptureError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Sentinel assigned to sensors that did not report enough readings.
pub const DEFAULT_INVALID_SENSOR_VALUE: i64 = 100;

/// Window sizing, validity thresholds and reduction policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Expected sensors, in fingerprint order
    pub sensor_ids: Vec<String>,

    /// Minimum window span in seconds before a fingerprint may be emitted
    pub min_window_size: f64,

    /// Readings older than this many seconds behind the newest are evicted
    pub max_window_size: f64,

    /// Readings a sensor needs within the window to count as present
    pub min_entries_per_sensor: usize,

    /// Present sensors the window needs to be usable
    pub min_valid_sensors: usize,

    /// Reduction name, resolved when the window is created
    pub filter_method: String,

    /// Value assigned to sensors absent from a fingerprint
    #[serde(default = "default_invalid_sensor_value")]
    pub invalid_sensor_value: i64,
}

fn default_invalid_sensor_value() -> i64 {
    DEFAULT_INVALID_SENSOR_VALUE
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            sensor_ids: Vec::new(),
            min_window_size: 1.0,
            max_window_size: 10.0,
            min_entries_per_sensor: 1,
            min_valid_sensors: 1,
            filter_method: FilterMethod::Mean.as_str().to_string(),
            invalid_sensor_value: DEFAULT_INVALID_SENSOR_VALUE,
        }
    }
}

impl WindowConfig {
    /// Create a configuration for the given sensors and filter method name.
    pub fn new<I, S>(sensor_ids: I, filter_method: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sensor_ids: sensor_ids.into_iter().map(Into::into).collect(),
            filter_method: filter_method.into(),
            ..Self::default()
        }
    }

    pub fn with_window(mut self, min_window_size: f64, max_window_size: f64) -> Self {
        self.min_window_size = min_window_size;
        self.max_window_size = max_window_size;
        self
    }

    pub fn with_min_entries_per_sensor(mut self, count: usize) -> Self {
        self.min_entries_per_sensor = count;
        self
    }

    pub fn with_min_valid_sensors(mut self, count: usize) -> Self {
        self.min_valid_sensors = count;
        self
    }

    pub fn with_invalid_sensor_value(mut self, value: i64) -> Self {
        self.invalid_sensor_value = value;
        self
    }

    /// Resolve the configured filter method name.
    pub fn filter(&self) -> Result<FilterMethod, CaptureError> {
        self.filter_method
            .parse()
            .map_err(|_| CaptureError::UnsupportedFilter(self.filter_method.clone()))
    }

    /// Check every constraint up front instead of waiting for the first window.
    pub fn validate(&self) -> Result<(), CaptureError> {
        if !(self.min_window_size.is_finite() && self.max_window_size.is_finite()) {
            return Err(CaptureError::InvalidConfig(
                "window sizes must be finite".to_string(),
            ));
        }
        if self.min_window_size <= 0.0 {
            return Err(CaptureError::InvalidConfig(format!(
                "min_window_size must be positive, got {}",
                self.min_window_size
            )));
        }
        if self.min_window_size > self.max_window_size {
            return Err(CaptureError::InvalidConfig(format!(
                "min_window_size {} exceeds max_window_size {}",
                self.min_window_size, self.max_window_size
            )));
        }
        if self.min_entries_per_sensor == 0 {
            return Err(CaptureError::InvalidConfig(
                "min_entries_per_sensor must be at least 1".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        if let Some(duplicate) = self.sensor_ids.iter().find(|id| !seen.insert(id.as_str())) {
            return Err(CaptureError::InvalidConfig(format!(
                "sensor id {duplicate:?} is listed more than once"
            )));
        }

        self.filter()?;
        Ok(())
    }

    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Load from the default location, falling back to defaults if absent.
    pub fn load_default() -> Result<Self, ConfigError> {
        let config_path = Self::default_path();

        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the default configuration file.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rssi-signal-capture")
            .join("config.json")
    }
}

/// Configuration file errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Serialize error: {0}")]
    SerializeError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> WindowConfig {
        WindowConfig::new(["a", "b"], "median")
            .with_window(1.0, 5.0)
            .with_min_entries_per_sensor(2)
            .with_min_valid_sensors(2)
    }

    #[test]
    fn test_default_config() {
        let config = WindowConfig::default();
        assert_eq!(config.invalid_sensor_value, 100);
        assert_eq!(config.filter(), Ok(FilterMethod::Mean));
        assert!(config.sensor_ids.is_empty());
    }

    #[test]
    fn test_validate_accepts_valid_config() {
        assert_eq!(valid().validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_bad_window() {
        assert!(matches!(
            valid().with_window(0.0, 5.0).validate(),
            Err(CaptureError::InvalidConfig(_))
        ));
        assert!(matches!(
            valid().with_window(6.0, 5.0).validate(),
            Err(CaptureError::InvalidConfig(_))
        ));
        assert!(matches!(
            valid().with_window(1.0, f64::INFINITY).validate(),
            Err(CaptureError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_sensors() {
        let config = WindowConfig::new(["a", "a"], "mean");
        assert!(matches!(
            config.validate(),
            Err(CaptureError::InvalidConfig(msg)) if msg.contains("\"a\"")
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_filter() {
        let config = WindowConfig::new(["a"], "average");
        assert_eq!(
            config.validate(),
            Err(CaptureError::UnsupportedFilter("average".to_string()))
        );
    }

    #[test]
    fn test_invalid_sensor_value_defaults_when_omitted() {
        let config: WindowConfig = serde_json::from_str(
            r#"{"sensor_ids": ["a"], "min_window_size": 1, "max_window_size": 2,
                "min_entries_per_sensor": 1, "min_valid_sensors": 1, "filter_method": "tss"}"#,
        )
        .unwrap();
        assert_eq!(config.invalid_sensor_value, DEFAULT_INVALID_SENSOR_VALUE);
        assert_eq!(config.filter(), Ok(FilterMethod::TotalSignalSum));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = valid().with_invalid_sensor_value(-110);
        config.save(&path).unwrap();
        assert_eq!(WindowConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = WindowConfig::load(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }
}
