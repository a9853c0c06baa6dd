//! Capture window that turns a reading stream into fingerprints.
//!
//! Readings are buffered in arrival order. Each ingest evicts readings that
//! fall more than `max_window_size` seconds behind the new one, then checks
//! whether the buffered window is valid: it must span at least
//! `min_window_size` seconds and contain enough readings from enough sensors.
//! A valid window is consumed whole and reduced into a fingerprint.
//!
//! Eviction and validity are driven by reading timestamps only, never by the
//! wall clock, so the same input always yields the same fingerprints.

use crate::config::WindowConfig;
use crate::core::filter::FilterMethod;
use crate::core::fingerprint::{Fingerprint, SensorValue};
use crate::core::reading::{ExtraFields, Reading};
use crate::core::stats::WindowStats;
use crate::error::{CaptureError, Result};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, trace, warn};

/// Sliding capture window over one reading stream.
///
/// Each instance owns its buffer exclusively. Independent streams need
/// independent windows.
#[derive(Debug, Clone)]
pub struct CaptureWindow {
    config: WindowConfig,
    /// `None` when the configured name is unknown; reported on first use
    filter: Option<FilterMethod>,
    buffer: VecDeque<Reading>,
    stats: WindowStats,
}

impl CaptureWindow {
    /// Create a capture window.
    ///
    /// An unrecognised filter method is not rejected here; it surfaces as
    /// [`CaptureError::UnsupportedFilter`] when the first fingerprint is
    /// composed. Use [`CaptureWindow::try_new`] to fail early instead.
    ///
    /// Repeated sensor ids are collapsed to their first occurrence.
    pub fn new(mut config: WindowConfig) -> Self {
        let mut seen = HashSet::new();
        config.sensor_ids.retain(|id| seen.insert(id.clone()));

        let filter = config.filter().ok();
        if filter.is_none() {
            warn!(
                filter_method = %config.filter_method,
                "Unknown filter method, fingerprint composition will fail"
            );
        }

        Self {
            config,
            filter,
            buffer: VecDeque::new(),
            stats: WindowStats::default(),
        }
    }

    /// Create a capture window after validating the whole configuration.
    pub fn try_new(config: WindowConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Process a single reading.
    ///
    /// Returns a fingerprint if this reading completed a valid window, in
    /// which case the buffer is left empty.
    pub fn ingest(&mut self, mut reading: Reading) -> Result<Option<Fingerprint>> {
        let timestamp = reading.timestamp;
        let extra = reading.extra.take();

        self.stats.record_ingested();
        self.buffer.push_back(reading);
        self.evict(timestamp);

        if !self.is_valid(timestamp) {
            return Ok(None);
        }

        // The whole window is consumed, not just the evicted prefix
        let window: Vec<Reading> = self.buffer.drain(..).collect();
        let values = self.reduce(&window)?;

        debug!(
            timestamp,
            span = timestamp - window[0].timestamp,
            readings = window.len(),
            "Fingerprint composed"
        );
        self.stats.record_fingerprint(window.len());

        Ok(Some(Fingerprint::new(timestamp, values, extra)))
    }

    /// Process a single reading given as its parts.
    pub fn process_reading(
        &mut self,
        timestamp: f64,
        sensor_id: &str,
        signal_value: i64,
        extra: Option<ExtraFields>,
    ) -> Result<Option<Fingerprint>> {
        let mut reading = Reading::new(timestamp, sensor_id, signal_value);
        reading.extra = extra;
        self.ingest(reading)
    }

    /// Drive a pre-ordered sequence of readings through the window.
    ///
    /// With `reset` set, the buffer is cleared before and after the batch.
    /// Stops at the first error.
    pub fn process_batch<I>(&mut self, readings: I, reset: bool) -> Result<Vec<Fingerprint>>
    where
        I: IntoIterator<Item = Reading>,
    {
        if reset {
            self.clear();
        }

        let mut fingerprints = Vec::new();
        for reading in readings {
            if let Some(fingerprint) = self.ingest(reading)? {
                fingerprints.push(fingerprint);
            }
        }

        if reset {
            self.clear();
        }

        Ok(fingerprints)
    }

    /// Drop readings that fall more than `max_window_size` behind `now`.
    fn evict(&mut self, now: f64) {
        let mut evicted = 0;
        while let Some(head) = self.buffer.front() {
            if now - head.timestamp > self.config.max_window_size {
                self.buffer.pop_front();
                evicted += 1;
            } else {
                break;
            }
        }

        if evicted > 0 {
            trace!(now, evicted, remaining = self.buffer.len(), "Evicted stale readings");
            self.stats.record_evicted(evicted);
        }
    }

    /// Check whether the buffered window is valid with `timestamp` as its right edge.
    pub fn is_valid(&self, timestamp: f64) -> bool {
        match self.buffer.front() {
            Some(head) if timestamp - head.timestamp >= self.config.min_window_size => {}
            _ => return false,
        }

        self.present_sensor_count() >= self.config.min_valid_sensors
    }

    /// Number of configured sensors with enough readings in the buffer.
    pub fn present_sensor_count(&self) -> usize {
        let counts = count_by_sensor(self.buffer.iter());
        self.config
            .sensor_ids
            .iter()
            .filter(|id| {
                counts.get(id.as_str()).copied().unwrap_or(0) >= self.config.min_entries_per_sensor
            })
            .count()
    }

    /// Reduce a window into one value per configured sensor.
    ///
    /// Sensors with fewer than `min_entries_per_sensor` readings get the
    /// invalid sensor value.
    pub fn reduce(&self, readings: &[Reading]) -> Result<Vec<(String, SensorValue)>> {
        let mut by_sensor: HashMap<&str, Vec<i64>> = HashMap::new();
        for reading in readings {
            by_sensor
                .entry(reading.sensor_id.as_str())
                .or_default()
                .push(reading.signal_value);
        }

        let sentinel = SensorValue::Level(self.config.invalid_sensor_value);
        let mut values = Vec::with_capacity(self.config.sensor_ids.len());

        for sensor_id in &self.config.sensor_ids {
            let samples = by_sensor.get(sensor_id.as_str()).map_or(&[][..], Vec::as_slice);

            let value = if samples.is_empty() || samples.len() < self.config.min_entries_per_sensor
            {
                sentinel
            } else {
                let filter = self.filter.ok_or_else(|| {
                    CaptureError::UnsupportedFilter(self.config.filter_method.clone())
                })?;
                filter.apply(samples).unwrap_or(sentinel)
            };

            values.push((sensor_id.clone(), value));
        }

        Ok(values)
    }

    /// Discard every buffered reading.
    pub fn clear(&mut self) {
        if !self.buffer.is_empty() {
            self.stats.record_cleared(self.buffer.len());
            self.buffer.clear();
        }
    }

    /// Number of buffered readings.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Buffered readings, oldest first.
    pub fn readings(&self) -> impl Iterator<Item = &Reading> {
        self.buffer.iter()
    }

    pub fn oldest_timestamp(&self) -> Option<f64> {
        self.buffer.front().map(|r| r.timestamp)
    }

    /// Span of the buffered window if its right edge were at `timestamp`.
    pub fn window_span(&self, timestamp: f64) -> Option<f64> {
        self.oldest_timestamp().map(|oldest| timestamp - oldest)
    }

    pub fn stats(&self) -> WindowStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = WindowStats::default();
    }
}

fn count_by_sensor<'a>(readings: impl Iterator<Item = &'a Reading>) -> HashMap<&'a str, usize> {
    let mut counts = HashMap::new();
    for reading in readings {
        *counts.entry(reading.sensor_id.as_str()).or_insert(0) += 1;
    }
    counts
}
