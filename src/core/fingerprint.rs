//! Fingerprints produced from completed capture windows.
//!
//! A fingerprint holds one value per configured sensor, in configuration
//! order, together with the timestamp of the reading that completed the
//! window and any passthrough fields supplied with that reading.

use crate::core::reading::ExtraFields;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use serde_json::{Map, Number, Value};

/// Key under which the triggering timestamp is stored.
pub const TIMESTAMP_KEY: &str = "timestamp";

/// A reduced per-sensor value.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, Deserialize)]
#[serde(untagged)]
pub enum SensorValue {
    /// Floored signal level, or the invalid sensor sentinel
    Level(i64),
    /// Linear power sum
    Power(f64),
}

impl SensorValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            SensorValue::Level(v) => v as f64,
            SensorValue::Power(v) => v,
        }
    }

    pub fn as_level(&self) -> Option<i64> {
        match *self {
            SensorValue::Level(v) => Some(v),
            SensorValue::Power(_) => None,
        }
    }
}

impl From<SensorValue> for Value {
    fn from(value: SensorValue) -> Self {
        match value {
            SensorValue::Level(v) => Value::from(v),
            // Non-finite sums have no JSON representation
            SensorValue::Power(v) => Number::from_f64(v).map_or(Value::Null, Value::Number),
        }
    }
}

/// One aggregated multi-sensor observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Fingerprint {
    timestamp: f64,
    values: Vec<(String, SensorValue)>,
    extra: ExtraFields,
}

impl Fingerprint {
    pub(crate) fn new(
        timestamp: f64,
        values: Vec<(String, SensorValue)>,
        extra: Option<ExtraFields>,
    ) -> Self {
        Self {
            timestamp,
            values,
            extra: extra.unwrap_or_default(),
        }
    }

    /// Timestamp of the reading that completed the window.
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    /// Value for a configured sensor.
    pub fn get(&self, sensor_id: &str) -> Option<SensorValue> {
        self.values
            .iter()
            .find(|(id, _)| id == sensor_id)
            .map(|(_, value)| *value)
    }

    /// Sensor values in configuration order.
    pub fn values(&self) -> &[(String, SensorValue)] {
        &self.values
    }

    pub fn sensor_count(&self) -> usize {
        self.values.len()
    }

    /// Passthrough fields as supplied, before collision resolution.
    pub fn extra(&self) -> &ExtraFields {
        &self.extra
    }

    /// Whether a passthrough key survives in the flattened form.
    fn keeps_extra(&self, key: &str) -> bool {
        key != TIMESTAMP_KEY && self.get(key).is_none()
    }

    /// Flatten into a single JSON object.
    ///
    /// Passthrough fields are written first, then sensor values and the
    /// timestamp on top, so fingerprint keys win on collision.
    pub fn to_json_map(&self) -> Map<String, Value> {
        let mut map = self.extra.clone();
        for (sensor_id, value) in &self.values {
            map.insert(sensor_id.clone(), Value::from(*value));
        }
        map.insert(TIMESTAMP_KEY.to_string(), Value::from(self.timestamp));
        map
    }
}

impl Serialize for Fingerprint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let kept: Vec<(&String, &Value)> = self
            .extra
            .iter()
            .filter(|(key, _)| self.keeps_extra(key))
            .collect();

        let mut map = serializer.serialize_map(Some(kept.len() + self.values.len() + 1))?;
        for (key, value) in kept {
            map.serialize_entry(key, value)?;
        }
        for (sensor_id, value) in &self.values {
            map.serialize_entry(sensor_id, value)?;
        }
        map.serialize_entry(TIMESTAMP_KEY, &self.timestamp)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Fingerprint {
        let mut extra = Map::new();
        extra.insert("room".to_string(), json!("lab"));
        extra.insert("a".to_string(), json!("shadowed"));
        extra.insert("timestamp".to_string(), json!(-1));

        Fingerprint::new(
            3.5,
            vec![
                ("a".to_string(), SensorValue::Level(-42)),
                ("b".to_string(), SensorValue::Level(100)),
            ],
            Some(extra),
        )
    }

    #[test]
    fn test_fingerprint_keys_win_on_collision() {
        let map = sample().to_json_map();
        assert_eq!(map["a"], json!(-42));
        assert_eq!(map["b"], json!(100));
        assert_eq!(map["timestamp"], json!(3.5));
        assert_eq!(map["room"], json!("lab"));
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn test_serialize_matches_json_map() {
        let fingerprint = sample();
        let serialized = serde_json::to_value(&fingerprint).unwrap();
        assert_eq!(serialized, Value::Object(fingerprint.to_json_map()));
    }

    #[test]
    fn test_sensor_value_json_shape() {
        assert_eq!(Value::from(SensorValue::Level(-60)), json!(-60));
        assert_eq!(Value::from(SensorValue::Power(0.5)), json!(0.5));
        assert_eq!(Value::from(SensorValue::Power(f64::NAN)), Value::Null);
    }

    #[test]
    fn test_get_unknown_sensor() {
        assert_eq!(sample().get("zz"), None);
        assert_eq!(sample().get("a").and_then(|v| v.as_level()), Some(-42));
    }
}
