//! Domain models for the daily discharge series and its derived values.
//!
//! Observations are the only ingested data; every other type here is a value
//! object recomputed on demand from a [`SeriesStore`](super::series::SeriesStore)
//! and the caller's parameters.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::error::{ForecastError, ForecastResult};

/// Names of the model inputs, in the order the predictor expects them.
pub const FEATURE_NAMES: [&str; 4] = ["dow", "lag1", "lag7", "ma7"];

/// One day of hospital activity.
///
/// # Examples
///
/// ```
/// use sph_forecast::core::domain::Observation;
/// use chrono::NaiveDate;
///
/// let obs = Observation::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 120, 98);
/// assert_eq!(obs.discharges_f64(), 98.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub admissions: u32,
    pub discharges: u32,
}

impl Observation {
    pub fn new(date: NaiveDate, admissions: u32, discharges: u32) -> Self {
        Self {
            date,
            admissions,
            discharges,
        }
    }

    pub fn discharges_f64(&self) -> f64 {
        f64::from(self.discharges)
    }
}

/// Day-of-week index with Monday = 0 and Sunday = 6.
///
/// ```
/// use sph_forecast::core::domain::day_of_week;
/// use chrono::NaiveDate;
///
/// // 2024-01-01 was a Monday
/// assert_eq!(day_of_week(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()), 0);
/// assert_eq!(day_of_week(NaiveDate::from_ymd_opt(2024, 1, 7).unwrap()), 6);
/// ```
pub fn day_of_week(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_monday() as u8
}

/// The four model inputs for a single target date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub dow: u8,
    pub lag1: f64,
    pub lag7: f64,
    pub ma7: f64,
}

impl FeatureVector {
    /// Values in [`FEATURE_NAMES`] order.
    pub fn as_array(&self) -> [f64; 4] {
        [f64::from(self.dow), self.lag1, self.lag7, self.ma7]
    }
}

/// A featurized historical day.
///
/// Only materialized when a full 7-day lookback exists, so `lag1`, `lag7`
/// and `ma7` are always defined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub dow: u8,
    pub lag1: f64,
    pub lag7: f64,
    pub ma7: f64,
    pub discharges: f64,
}

impl FeatureRow {
    pub fn features(&self) -> FeatureVector {
        FeatureVector {
            dow: self.dow,
            lag1: self.lag1,
            lag7: self.lag7,
            ma7: self.ma7,
        }
    }
}

/// A forecast discharge count for one future date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Error metrics of the predictor over the test segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelError {
    pub mae: f64,
    /// Percentage (0-100 scale). NaN or infinite when an actual value is zero.
    pub mape: f64,
}

/// A single test-segment row as seen by the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestPoint {
    pub date: NaiveDate,
    pub actual: f64,
    pub predicted: f64,
}

impl TestPoint {
    pub fn residual(&self) -> f64 {
        self.actual - self.predicted
    }
}

/// Dated residual (`actual - predicted`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Residual {
    pub date: NaiveDate,
    pub value: f64,
}

/// Outcome of a hold-out evaluation against the two naive baselines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub model_error: ModelError,
    pub naive1_error: f64,
    pub naive7_error: f64,
    pub residuals: Vec<Residual>,
    /// Index of the first test row in the feature table.
    pub split_index: usize,
    pub test_points: Vec<TestPoint>,
}

impl EvaluationResult {
    /// `true` when the model MAE is strictly below both naive MAEs.
    pub fn beats_baselines(&self) -> bool {
        self.model_error.mae < self.naive1_error && self.model_error.mae < self.naive7_error
    }

    /// MAPE, or `DegenerateMetric` when a zero actual made it non-finite.
    pub fn checked_mape(&self) -> ForecastResult<f64> {
        if self.model_error.mape.is_finite() {
            Ok(self.model_error.mape)
        } else {
            Err(ForecastError::DegenerateMetric(
                "MAPE is undefined: the test segment contains a zero actual".to_string(),
            ))
        }
    }
}

/// Classification of a forecast against the alert threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertLevel {
    Ok,
    Alert,
}

impl AlertLevel {
    pub fn is_alert(&self) -> bool {
        matches!(self, AlertLevel::Alert)
    }
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertLevel::Ok => write!(f, "OK"),
            AlertLevel::Alert => write!(f, "ALERT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertStatus {
    pub threshold: i64,
    pub status: AlertLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_feature_vector_order() {
        let v = FeatureVector {
            dow: 3,
            lag1: 10.0,
            lag7: 20.0,
            ma7: 15.0,
        };
        assert_eq!(v.as_array(), [3.0, 10.0, 20.0, 15.0]);
    }

    #[test]
    fn test_day_of_week_wraps_week() {
        let monday = date(2024, 3, 4);
        for offset in 0..14 {
            let d = monday + chrono::Duration::days(offset);
            assert_eq!(day_of_week(d) as i64, offset % 7);
        }
    }

    #[test]
    fn test_checked_mape_flags_non_finite() {
        let mut result = EvaluationResult {
            model_error: ModelError {
                mae: 1.0,
                mape: f64::INFINITY,
            },
            naive1_error: 2.0,
            naive7_error: 3.0,
            residuals: vec![],
            split_index: 0,
            test_points: vec![],
        };
        assert!(matches!(
            result.checked_mape(),
            Err(ForecastError::DegenerateMetric(_))
        ));

        result.model_error.mape = 4.5;
        assert_eq!(result.checked_mape().unwrap(), 4.5);
        assert!(result.beats_baselines());
    }

    #[test]
    fn test_alert_level_serializes_uppercase() {
        let json = serde_json::to_string(&AlertLevel::Alert).unwrap();
        assert_eq!(json, "\"ALERT\"");
        assert_eq!(AlertLevel::Ok.to_string(), "OK");
        assert!(AlertLevel::Alert.is_alert());
        assert!(!AlertLevel::Ok.is_alert());
    }
}
