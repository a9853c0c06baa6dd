//! Reading type fed into the capture window.
//!
//! A reading is one signal-strength sample reported by one sensor. Readings
//! are immutable once created and live only as long as the window holds them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Passthrough fields carried alongside a reading into its fingerprint.
pub type ExtraFields = Map<String, Value>;

/// A single timestamped signal-strength sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Seconds, non-decreasing across the stream
    pub timestamp: f64,
    /// Identifier of the reporting sensor (e.g. a MAC address)
    pub sensor_id: String,
    /// Received signal strength, typically dBm
    pub signal_value: i64,
    /// Caller-supplied fields merged into the fingerprint this reading triggers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<ExtraFields>,
}

impl Reading {
    pub fn new(timestamp: f64, sensor_id: impl Into<String>, signal_value: i64) -> Self {
        Self {
            timestamp,
            sensor_id: sensor_id.into(),
            signal_value,
            extra: None,
        }
    }

    /// Attach passthrough fields to this reading.
    pub fn with_extra(mut self, extra: ExtraFields) -> Self {
        self.extra = Some(extra);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reading_creation() {
        let reading = Reading::new(1.5, "aa:bb", -60);
        assert_eq!(reading.timestamp, 1.5);
        assert_eq!(reading.sensor_id, "aa:bb");
        assert!(reading.extra.is_none());
    }

    #[test]
    fn test_reading_deserializes_without_extra() {
        let reading: Reading =
            serde_json::from_value(json!({"timestamp": 2.0, "sensor_id": "s1", "signal_value": -71}))
                .unwrap();
        assert_eq!(reading, Reading::new(2.0, "s1", -71));
    }
}
