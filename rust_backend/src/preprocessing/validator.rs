//! Data-quality checks for a daily observation series.
//!
//! The forecasting core assumes one observation per calendar day in
//! chronological order. This validator reports violations of that contract
//! (errors) and conditions that make the output less useful (warnings)
//! before the series reaches the pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::domain::Observation;
use crate::preprocessing::features::MIN_OBSERVATIONS;

/// Validation result with categorized issues and statistics.
///
/// Errors make `is_valid` false; warnings are informational.
///
/// # Examples
///
/// ```
/// use sph_forecast::preprocessing::validator::ValidationResult;
///
/// let mut result = ValidationResult::new();
/// assert!(result.is_valid);
///
/// result.add_error("Duplicate date 2024-01-03".to_string());
/// assert!(!result.is_valid);
/// assert_eq!(result.errors.len(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub stats: ValidationStats,
}

/// Summary statistics computed during validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationStats {
    pub total_days: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub duplicate_dates: usize,
    pub out_of_order: usize,
    /// Number of missing calendar days between consecutive observations.
    pub missing_days: usize,
    pub zero_discharge_days: usize,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            stats: ValidationStats::default(),
        }
    }

    /// Adds a critical error and marks the result as invalid.
    pub fn add_error(&mut self, error: String) {
        self.is_valid = false;
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator for daily observation series.
pub struct SeriesValidator;

impl SeriesValidator {
    /// Validates an observation series in the order given.
    ///
    /// - Dates that repeat or go backwards are errors.
    /// - Calendar gaps are warnings (the lag features then span more than
    ///   the nominal number of days).
    /// - A series shorter than 8 days is a warning: no feature row survives.
    /// - Zero-discharge days are counted since they make MAPE undefined.
    pub fn validate(observations: &[Observation]) -> ValidationResult {
        let mut result = ValidationResult::new();

        result.stats.total_days = observations.len();
        result.stats.first_date = observations.first().map(|o| o.date);
        result.stats.last_date = observations.last().map(|o| o.date);
        result.stats.zero_discharge_days =
            observations.iter().filter(|o| o.discharges == 0).count();

        for pair in observations.windows(2) {
            let (prev, next) = (pair[0].date, pair[1].date);
            let step = (next - prev).num_days();
            if step == 0 {
                result.stats.duplicate_dates += 1;
                result.add_error(format!("Duplicate date {}", next));
            } else if step < 0 {
                result.stats.out_of_order += 1;
                result.add_error(format!("Date {} comes after {}", next, prev));
            } else if step > 1 {
                result.stats.missing_days += (step - 1) as usize;
                result.add_warning(format!(
                    "Gap of {} day(s) between {} and {}",
                    step - 1,
                    prev,
                    next
                ));
            }
        }

        if observations.len() < MIN_OBSERVATIONS {
            result.add_warning(format!(
                "Series has {} day(s); at least {} are needed to build features",
                observations.len(),
                MIN_OBSERVATIONS
            ));
        }

        if result.stats.zero_discharge_days > 0 {
            result.add_warning(format!(
                "{} day(s) with zero discharges; MAPE is undefined if they fall in the test segment",
                result.stats.zero_discharge_days
            ));
        }

        if !result.is_valid {
            log::warn!(
                "Series validation failed with {} error(s)",
                result.errors.len()
            );
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(y: i32, m: u32, d: u32, discharges: u32) -> Observation {
        Observation::new(NaiveDate::from_ymd_opt(y, m, d).unwrap(), 0, discharges)
    }

    fn contiguous(n: u32) -> Vec<Observation> {
        (1..=n).map(|d| obs(2024, 1, d, 10)).collect()
    }

    #[test]
    fn test_contiguous_series_is_clean() {
        let result = SeriesValidator::validate(&contiguous(20));
        assert!(result.is_valid);
        assert!(result.warnings.is_empty());
        assert_eq!(result.stats.total_days, 20);
        assert_eq!(
            result.stats.last_date,
            NaiveDate::from_ymd_opt(2024, 1, 20)
        );
    }

    #[test]
    fn test_duplicate_and_unordered_dates_are_errors() {
        let series = vec![
            obs(2024, 1, 1, 10),
            obs(2024, 1, 2, 10),
            obs(2024, 1, 2, 11),
            obs(2024, 1, 1, 12),
        ];
        let result = SeriesValidator::validate(&series);

        assert!(!result.is_valid);
        assert_eq!(result.stats.duplicate_dates, 1);
        assert_eq!(result.stats.out_of_order, 1);
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_gaps_are_warnings() {
        let mut series = contiguous(10);
        series.push(obs(2024, 1, 14, 10));
        let result = SeriesValidator::validate(&series);

        assert!(result.is_valid);
        assert_eq!(result.stats.missing_days, 3);
        assert!(result.warnings.iter().any(|w| w.contains("Gap of 3")));
    }

    #[test]
    fn test_short_series_and_zero_days_warn() {
        let series = vec![obs(2024, 1, 1, 0), obs(2024, 1, 2, 5)];
        let result = SeriesValidator::validate(&series);

        assert!(result.is_valid);
        assert_eq!(result.stats.zero_discharge_days, 1);
        assert_eq!(result.warnings.len(), 2);
    }
}
