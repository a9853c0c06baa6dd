//! RSSI Signal Capture - turns per-sensor signal readings into fingerprints.
//!
//! Readings arrive asynchronously from many sensors. A capture window buffers
//! them, and once the buffered span is long enough and enough sensors have
//! reported, it reduces the window into a fingerprint: one representative
//! value per configured sensor, comparable across observations.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     RSSI Signal Capture                       │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐         │
//! │  │   Batch     │──▶│   Capture   │──▶│   Filter    │         │
//! │  │  (records)  │   │   Window    │   │ (reduction) │         │
//! │  └─────────────┘   └─────────────┘   └─────────────┘         │
//! │                           │                 │                │
//! │                           ▼                 ▼                │
//! │                    ┌─────────────┐   ┌─────────────┐         │
//! │                    │   Window    │   │ Fingerprint │         │
//! │                    │   Stats     │   │             │         │
//! │                    └─────────────┘   └─────────────┘         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use rssi_signal_capture::{CaptureWindow, SensorValue, WindowConfig};
//!
//! let config = WindowConfig::new(["A", "B"], "mean")
//!     .with_window(1.0, 10.0)
//!     .with_min_entries_per_sensor(2)
//!     .with_min_valid_sensors(2);
//! let mut window = CaptureWindow::try_new(config).unwrap();
//!
//! window.process_reading(0.0, "A", -40, None).unwrap();
//! window.process_reading(0.2, "B", -50, None).unwrap();
//! window.process_reading(0.5, "A", -44, None).unwrap();
//! let fingerprint = window.process_reading(1.0, "B", -52, None).unwrap().unwrap();
//!
//! assert_eq!(fingerprint.get("A"), Some(SensorValue::Level(-42)));
//! assert_eq!(fingerprint.get("B"), Some(SensorValue::Level(-51)));
//! ```

pub mod batch;
pub mod config;
pub mod core;
pub mod error;

// Re-export key types at crate root for convenience
pub use batch::{process_records, FieldMapping};
pub use config::{ConfigError, WindowConfig, DEFAULT_INVALID_SENSOR_VALUE};
pub use core::{
    CaptureWindow, ExtraFields, FilterMethod, Fingerprint, Reading, SensorValue, WindowStats,
};
pub use error::{CaptureError, Result};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
