//! Per-sensor reduction applied when a window is turned into a fingerprint.
//!
//! Every method floors its result to an integer level except the total
//! signal sum, which adds linear power (`10^(dBm/10)`) and stays real-valued
//! so it can be converted back to a logarithmic scale downstream.

use crate::core::fingerprint::SensorValue;
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Statistical reduction applied to one sensor's readings within a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMethod {
    /// Floor of the arithmetic mean
    Mean,
    /// Floor of the median
    Median,
    /// Most frequent value, smallest on ties
    Mode,
    /// Largest value
    Max,
    /// Smallest value
    Min,
    /// Sum of linear power, left unfloored
    TotalSignalSum,
}

impl FilterMethod {
    /// All supported methods.
    pub fn all() -> [FilterMethod; 6] {
        [
            FilterMethod::Mean,
            FilterMethod::Median,
            FilterMethod::Mode,
            FilterMethod::Max,
            FilterMethod::Min,
            FilterMethod::TotalSignalSum,
        ]
    }

    /// Canonical configuration name of this method.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterMethod::Mean => "mean",
            FilterMethod::Median => "median",
            FilterMethod::Mode => "mode",
            FilterMethod::Max => "max",
            FilterMethod::Min => "min",
            FilterMethod::TotalSignalSum => "tss",
        }
    }

    /// Reduce a sensor's signal values to a single fingerprint value.
    ///
    /// Returns `None` for an empty slice; callers substitute the invalid
    /// sensor sentinel in that case.
    pub fn apply(&self, values: &[i64]) -> Option<SensorValue> {
        if values.is_empty() {
            return None;
        }

        let value = match self {
            FilterMethod::Mean => SensorValue::Level(floor_level(mean(values))),
            FilterMethod::Median => SensorValue::Level(floor_level(median(values))),
            FilterMethod::Mode => SensorValue::Level(mode(values)),
            FilterMethod::Max => {
                let samples = as_samples(values);
                SensorValue::Level(floor_level(Statistics::max(samples.iter())))
            }
            FilterMethod::Min => {
                let samples = as_samples(values);
                SensorValue::Level(floor_level(Statistics::min(samples.iter())))
            }
            FilterMethod::TotalSignalSum => SensorValue::Power(total_signal_sum(values)),
        };

        Some(value)
    }
}

impl fmt::Display for FilterMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a filter method name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown filter method {0:?}")]
pub struct UnknownFilterMethod(pub String);

impl FromStr for FilterMethod {
    type Err = UnknownFilterMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mean" => Ok(FilterMethod::Mean),
            "median" => Ok(FilterMethod::Median),
            "mode" => Ok(FilterMethod::Mode),
            "max" => Ok(FilterMethod::Max),
            "min" => Ok(FilterMethod::Min),
            "tss" | "total-signal-sum" | "total_signal_sum" => Ok(FilterMethod::TotalSignalSum),
            _ => Err(UnknownFilterMethod(s.to_string())),
        }
    }
}

fn as_samples(values: &[i64]) -> Vec<f64> {
    values.iter().map(|&v| v as f64).collect()
}

fn floor_level(value: f64) -> i64 {
    value.floor() as i64
}

/// Integer sum divided once, so integral means come out exact before flooring.
fn mean(values: &[i64]) -> f64 {
    values.iter().map(|&v| i128::from(v)).sum::<i128>() as f64 / values.len() as f64
}

/// Middle value, or the midpoint of the two middle values for even counts.
fn median(values: &[i64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (i128::from(sorted[mid - 1]) + i128::from(sorted[mid])) as f64 / 2.0
    } else {
        sorted[mid] as f64
    }
}

fn mode(values: &[i64]) -> i64 {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for &value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    // Ascending iteration with a strict comparison keeps the smallest tied value
    let mut best = (values[0], 0);
    for (value, count) in counts {
        if count > best.1 {
            best = (value, count);
        }
    }
    best.0
}

fn total_signal_sum(values: &[i64]) -> f64 {
    values
        .iter()
        .map(|&v| 10f64.powf(v as f64 / 10.0))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter_methods() {
        for method in FilterMethod::all() {
            assert_eq!(method.as_str().parse::<FilterMethod>(), Ok(method));
        }
        assert_eq!(
            " Total-Signal-Sum ".parse::<FilterMethod>(),
            Ok(FilterMethod::TotalSignalSum)
        );
        assert!("average".parse::<FilterMethod>().is_err());
    }

    #[test]
    fn test_mean_floors_toward_negative_infinity() {
        let value = FilterMethod::Mean.apply(&[-40, -41]).unwrap();
        assert_eq!(value, SensorValue::Level(-41));

        let value = FilterMethod::Mean.apply(&[-40, -44]).unwrap();
        assert_eq!(value, SensorValue::Level(-42));
    }

    #[test]
    fn test_median_even_and_odd() {
        assert_eq!(
            FilterMethod::Median.apply(&[-70, -50, -60]),
            Some(SensorValue::Level(-60))
        );
        // Midpoint -60.5 floors to -61
        assert_eq!(
            FilterMethod::Median.apply(&[-70, -50, -60, -61]),
            Some(SensorValue::Level(-61))
        );
    }

    #[test]
    fn test_mode_prefers_smallest_on_tie() {
        assert_eq!(
            FilterMethod::Mode.apply(&[-50, -60, -50, -60, -40]),
            Some(SensorValue::Level(-60))
        );
        assert_eq!(
            FilterMethod::Mode.apply(&[-50, -50, -60]),
            Some(SensorValue::Level(-50))
        );
    }

    #[test]
    fn test_max_and_min() {
        let values = [-72, -55, -90];
        assert_eq!(FilterMethod::Max.apply(&values), Some(SensorValue::Level(-55)));
        assert_eq!(FilterMethod::Min.apply(&values), Some(SensorValue::Level(-90)));
    }

    #[test]
    fn test_total_signal_sum_is_unfloored() {
        let value = FilterMethod::TotalSignalSum.apply(&[-30, -30]).unwrap();
        let expected = 2.0 * 10f64.powf(-3.0);
        assert_eq!(value, SensorValue::Power(expected));
    }

    #[test]
    fn test_extreme_values_do_not_overflow() {
        let values = [i64::MAX, i64::MAX];
        assert_eq!(FilterMethod::Mean.apply(&values), Some(SensorValue::Level(i64::MAX)));
        assert_eq!(FilterMethod::Median.apply(&values), Some(SensorValue::Level(i64::MAX)));
        assert_eq!(
            FilterMethod::Mean.apply(&[i64::MIN, i64::MIN, i64::MIN]),
            Some(SensorValue::Level(i64::MIN))
        );
    }

    #[test]
    fn test_unknown_filter_message() {
        let err = "harmonic".parse::<FilterMethod>().unwrap_err();
        assert_eq!(err.to_string(), "unknown filter method \"harmonic\"");
    }

    #[test]
    fn test_empty_values() {
        for method in FilterMethod::all() {
            assert_eq!(method.apply(&[]), None);
        }
    }
}
