//! Core functionality of the capture window engine.
//!
//! This module contains:
//! - The reading type fed into a window
//! - Window management and validity evaluation
//! - Per-sensor reduction into fingerprints

pub mod filter;
pub mod fingerprint;
pub mod reading;
pub mod stats;
pub mod windowing;

// Re-export commonly used types
pub use filter::{FilterMethod, UnknownFilterMethod};
pub use fingerprint::{Fingerprint, SensorValue, TIMESTAMP_KEY};
pub use reading::{ExtraFields, Reading};
pub use stats::WindowStats;
pub use windowing::CaptureWindow;
