//! Batch driver over loosely-typed reading records.
//!
//! Records arrive as JSON objects whose field names are chosen by the
//! caller. Required fields are checked eagerly so a malformed record aborts
//! the batch before it can reach the window.

use crate::core::{CaptureWindow, ExtraFields, Fingerprint, Reading};
use crate::error::{CaptureError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field names used to pull readings out of records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub timestamp_field: String,
    pub sensor_field: String,
    pub signal_field: String,
    /// Fields copied verbatim into each fingerprint
    #[serde(default)]
    pub passthrough_fields: Vec<String>,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            timestamp_field: "timestamp".to_string(),
            sensor_field: "mac_sensor".to_string(),
            signal_field: "rssi".to_string(),
            passthrough_fields: Vec::new(),
        }
    }
}

impl FieldMapping {
    pub fn with_passthrough<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.passthrough_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Extract a reading from the record at `index`.
    pub fn extract(&self, index: usize, record: &Value) -> Result<Reading> {
        let record = record
            .as_object()
            .ok_or(CaptureError::NotAnObject { index })?;

        let timestamp = field(index, record, &self.timestamp_field)?
            .as_f64()
            .ok_or_else(|| invalid(index, &self.timestamp_field, "a number"))?;

        let sensor_id = field(index, record, &self.sensor_field)?
            .as_str()
            .ok_or_else(|| invalid(index, &self.sensor_field, "a string"))?;

        let signal_value = signal(field(index, record, &self.signal_field)?)
            .ok_or_else(|| invalid(index, &self.signal_field, "an integer"))?;

        let reading = Reading::new(timestamp, sensor_id, signal_value);
        if self.passthrough_fields.is_empty() {
            return Ok(reading);
        }

        let mut extra = ExtraFields::new();
        for name in &self.passthrough_fields {
            extra.insert(name.clone(), field(index, record, name)?.clone());
        }
        Ok(reading.with_extra(extra))
    }
}

fn field<'a>(index: usize, record: &'a Map<String, Value>, name: &str) -> Result<&'a Value> {
    record.get(name).ok_or_else(|| CaptureError::MissingField {
        index,
        field: name.to_string(),
    })
}

fn invalid(index: usize, name: &str, expected: &'static str) -> CaptureError {
    CaptureError::InvalidField {
        index,
        field: name.to_string(),
        expected,
    }
}

/// Integral values, including floats with no fractional part.
fn signal(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|v| v.fract() == 0.0 && v.abs() < i64::MAX as f64)
            .map(|v| v as i64)
    })
}

/// Drive a sequence of records through a capture window.
///
/// With `reset` set, the window is cleared before and after the batch.
/// The first malformed record aborts the batch with an error.
pub fn process_records<'a, I>(
    window: &mut CaptureWindow,
    records: I,
    mapping: &FieldMapping,
    reset: bool,
) -> Result<Vec<Fingerprint>>
where
    I: IntoIterator<Item = &'a Value>,
{
    if reset {
        window.clear();
    }

    let mut fingerprints = Vec::new();
    for (index, record) in records.into_iter().enumerate() {
        let reading = mapping.extract(index, record)?;
        if let Some(fingerprint) = window.ingest(reading)? {
            fingerprints.push(fingerprint);
        }
    }

    if reset {
        window.clear();
    }

    Ok(fingerprints)
}
