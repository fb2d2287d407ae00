//! Percentile alert threshold over the discharge history.

use serde::{Deserialize, Serialize};

use crate::core::domain::{AlertLevel, AlertStatus};

pub const MIN_PERCENTILE: u8 = 50;
pub const MAX_PERCENTILE: u8 = 95;
pub const DEFAULT_PERCENTILE: u8 = 75;

/// How the percentile is read off the sorted history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// Sorted value at index `floor(q * (n - 1))`.
    #[default]
    Lower,
    /// Linear interpolation between the two neighbouring order statistics.
    Linear,
}

/// Alert rule: a forecast at or above the historical percentile raises an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlertPolicy {
    percentile: u8,
    method: Interpolation,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_PERCENTILE)
    }
}

impl AlertPolicy {
    /// Percentiles outside `[50, 95]` are clamped.
    pub fn new(percentile: u8) -> Self {
        let clamped = percentile.clamp(MIN_PERCENTILE, MAX_PERCENTILE);
        if clamped != percentile {
            log::warn!(
                "Alert percentile {} outside [{}, {}], using {}",
                percentile,
                MIN_PERCENTILE,
                MAX_PERCENTILE,
                clamped
            );
        }
        Self {
            percentile: clamped,
            method: Interpolation::Lower,
        }
    }

    pub fn with_interpolation(mut self, method: Interpolation) -> Self {
        self.method = method;
        self
    }

    pub fn percentile(&self) -> u8 {
        self.percentile
    }

    pub fn interpolation(&self) -> Interpolation {
        self.method
    }

    /// Floor of the configured percentile over `history`; 0 when empty.
    pub fn threshold(&self, history: &[f64]) -> i64 {
        let mut sorted: Vec<f64> = history.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return 0;
        }
        sorted.sort_by(f64::total_cmp);

        let last = sorted.len() - 1;
        let value = match self.method {
            Interpolation::Lower => sorted[usize::from(self.percentile) * last / 100],
            Interpolation::Linear => {
                let position = f64::from(self.percentile) / 100.0 * last as f64;
                let lo = position.floor() as usize;
                let hi = position.ceil() as usize;
                sorted[lo] + (sorted[hi] - sorted[lo]) * (position - lo as f64)
            }
        };
        value.floor() as i64
    }

    /// Classify a forecast value against `threshold`.
    pub fn classify(threshold: i64, forecast: f64) -> AlertLevel {
        if forecast >= threshold as f64 {
            AlertLevel::Alert
        } else {
            AlertLevel::Ok
        }
    }

    pub fn status(&self, history: &[f64], forecast: f64) -> AlertStatus {
        let threshold = self.threshold(history);
        AlertStatus {
            threshold,
            status: Self::classify(threshold, forecast),
        }
    }
}

/// Compare a forecast with the `percentile` of the full discharge history.
///
/// ```
/// use sph_forecast::algorithms::alert_status;
/// use sph_forecast::core::domain::AlertLevel;
///
/// let history: Vec<f64> = (1..=10).map(|i| f64::from(i * 10)).collect();
/// let status = alert_status(&history, 75, 75.0);
/// assert_eq!(status.threshold, 70);
/// assert_eq!(status.status, AlertLevel::Alert);
/// ```
pub fn alert_status(history: &[f64], percentile: u8, forecast: f64) -> AlertStatus {
    AlertPolicy::new(percentile).status(history, forecast)
}
