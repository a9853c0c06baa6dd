//! Demonstration of the capture window over a synthetic reading stream.
//!
//! This example shows how to:
//! 1. Configure a capture window for a fixed set of sensors
//! 2. Feed readings one at a time and collect fingerprints
//! 3. Compare filter methods on the same stream
//! 4. Inspect window statistics
//!
//! Run with: cargo run --example replay_demo

use rssi_signal_capture::{CaptureWindow, FilterMethod, Reading, WindowConfig};

const SENSORS: [&str; 3] = ["00:1a:7d:01", "00:1a:7d:02", "00:1a:7d:03"];

/// Deterministic stream: each sensor reports every 0.3s with a small wobble.
fn synthetic_stream() -> Vec<Reading> {
    let mut readings = Vec::new();
    for step in 0..40 {
        let sensor = step % SENSORS.len();
        let timestamp = step as f64 * 0.1;
        let base = -45 - 10 * sensor as i64;
        let wobble = [0, -3, 2, -1][step % 4];
        readings.push(Reading::new(timestamp, SENSORS[sensor], base + wobble));
    }
    readings
}

fn main() {
    println!("RSSI Signal Capture - Replay Demo");
    println!("=================================");
    println!();

    for method in FilterMethod::all() {
        let config = WindowConfig::new(SENSORS, method.as_str())
            .with_window(1.0, 3.0)
            .with_min_entries_per_sensor(2)
            .with_min_valid_sensors(2);

        let mut window = match CaptureWindow::try_new(config) {
            Ok(window) => window,
            Err(e) => {
                eprintln!("Error creating window: {e}");
                return;
            }
        };

        println!("Filter method: {method}");
        for reading in synthetic_stream() {
            match window.ingest(reading) {
                Ok(Some(fingerprint)) => match serde_json::to_string(&fingerprint) {
                    Ok(json) => println!("  {json}"),
                    Err(e) => eprintln!("  Error serializing fingerprint: {e}"),
                },
                Ok(None) => {}
                Err(e) => {
                    eprintln!("  Error: {e}");
                    break;
                }
            }
        }

        println!("  Pending readings: {}", window.len());
        println!("{}", window.stats().summary());
        println!();
    }
}
