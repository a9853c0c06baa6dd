//! Counters describing what a capture window has done with its readings.
//!
//! Windows that never become valid are discarded by eviction without any
//! return value; the eviction counter is how callers can observe that.

use serde::{Deserialize, Serialize};

/// Snapshot of capture window activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowStats {
    /// Readings passed to ingest
    pub readings_ingested: u64,
    /// Readings dropped for falling outside the maximum window size
    pub readings_evicted: u64,
    /// Readings consumed into emitted fingerprints
    pub readings_consumed: u64,
    /// Readings discarded by an explicit clear
    pub readings_cleared: u64,
    /// Fingerprints emitted
    pub fingerprints_emitted: u64,
}

impl WindowStats {
    pub(crate) fn record_ingested(&mut self) {
        self.readings_ingested += 1;
    }

    pub(crate) fn record_evicted(&mut self, count: usize) {
        self.readings_evicted += count as u64;
    }

    pub(crate) fn record_cleared(&mut self, count: usize) {
        self.readings_cleared += count as u64;
    }

    pub(crate) fn record_fingerprint(&mut self, readings: usize) {
        self.fingerprints_emitted += 1;
        self.readings_consumed += readings as u64;
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        format!(
            "Capture Statistics:\n\
             - Readings ingested: {}\n\
             - Readings evicted: {}\n\
             - Readings consumed: {}\n\
             - Readings cleared: {}\n\
             - Fingerprints emitted: {}",
            self.readings_ingested,
            self.readings_evicted,
            self.readings_consumed,
            self.readings_cleared,
            self.fingerprints_emitted
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_counting() {
        let mut stats = WindowStats::default();
        stats.record_ingested();
        stats.record_ingested();
        stats.record_evicted(1);
        stats.record_fingerprint(1);

        assert_eq!(stats.readings_ingested, 2);
        assert_eq!(stats.readings_evicted, 1);
        assert_eq!(stats.readings_consumed, 1);
        assert_eq!(stats.fingerprints_emitted, 1);
    }

    #[test]
    fn test_summary_format() {
        let summary = WindowStats::default().summary();
        assert!(summary.contains("Readings evicted: 0"));
        assert!(summary.contains("Fingerprints emitted: 0"));
    }
}
