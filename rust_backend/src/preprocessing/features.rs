//! Temporal feature construction for the discharge model.
//!
//! Every historical day with a full week of lookback becomes a [`FeatureRow`]:
//! day-of-week, lag-1, lag-7 and a 7-day rolling mean. The rolling mean of a
//! historical row ends at (and includes) the row's own discharges; future rows
//! built by the forecaster use prior values only.

use anyhow::Context;
use polars::prelude::*;

use crate::core::domain::{day_of_week, FeatureRow, Observation};
use crate::core::error::{ForecastError, ForecastResult};

/// Days of lookback behind every feature row.
pub const LOOKBACK_DAYS: usize = 7;

/// Smallest series that yields at least one feature row.
pub const MIN_OBSERVATIONS: usize = LOOKBACK_DAYS + 1;

/// Builds the model feature table from an ordered observation series.
pub struct FeatureBuilder;

impl FeatureBuilder {
    /// Featurize every observation that has a full 7-day lookback.
    ///
    /// Returns exactly `observations.len() - 7` rows in chronological order.
    ///
    /// # Errors
    ///
    /// `InsufficientHistory` when fewer than 8 observations are supplied.
    ///
    /// # Examples
    ///
    /// ```
    /// use sph_forecast::core::domain::Observation;
    /// use sph_forecast::preprocessing::FeatureBuilder;
    /// use chrono::NaiveDate;
    ///
    /// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    /// let observations: Vec<Observation> = (0..10)
    ///     .map(|i| Observation::new(start + chrono::Duration::days(i), 0, 10 * i as u32))
    ///     .collect();
    ///
    /// let rows = FeatureBuilder::build(&observations).unwrap();
    /// assert_eq!(rows.len(), 3);
    /// assert_eq!(rows[0].lag1, 60.0);
    /// assert_eq!(rows[0].lag7, 0.0);
    /// assert_eq!(rows[0].ma7, 40.0); // mean of 10..=70
    /// ```
    pub fn build(observations: &[Observation]) -> ForecastResult<Vec<FeatureRow>> {
        if observations.len() < MIN_OBSERVATIONS {
            return Err(ForecastError::insufficient(
                MIN_OBSERVATIONS,
                observations.len(),
            ));
        }

        let discharges: Vec<f64> = observations
            .iter()
            .map(Observation::discharges_f64)
            .collect();

        let rows = (LOOKBACK_DAYS..observations.len())
            .map(|i| {
                let window = &discharges[i + 1 - LOOKBACK_DAYS..=i];
                FeatureRow {
                    date: observations[i].date,
                    dow: day_of_week(observations[i].date),
                    lag1: discharges[i - 1],
                    lag7: discharges[i - LOOKBACK_DAYS],
                    ma7: mean(window),
                    discharges: discharges[i],
                }
            })
            .collect::<Vec<_>>();

        log::debug!(
            "Built {} feature rows from {} observations",
            rows.len(),
            observations.len()
        );
        Ok(rows)
    }

    /// Convert feature rows into a DataFrame with columns
    /// `date, dow, lag1, lag7, ma7, discharges`.
    pub fn to_dataframe(rows: &[FeatureRow]) -> anyhow::Result<DataFrame> {
        let dates: Vec<String> = rows.iter().map(|r| r.date.to_string()).collect();
        let dow: Vec<i32> = rows.iter().map(|r| i32::from(r.dow)).collect();
        let lag1: Vec<f64> = rows.iter().map(|r| r.lag1).collect();
        let lag7: Vec<f64> = rows.iter().map(|r| r.lag7).collect();
        let ma7: Vec<f64> = rows.iter().map(|r| r.ma7).collect();
        let discharges: Vec<f64> = rows.iter().map(|r| r.discharges).collect();

        df!(
            "date" => dates,
            "dow" => dow,
            "lag1" => lag1,
            "lag7" => lag7,
            "ma7" => ma7,
            "discharges" => discharges
        )
        .context("Failed to build feature DataFrame")
    }
}

/// Convenience wrapper around [`FeatureBuilder::build`].
pub fn build_features(observations: &[Observation]) -> ForecastResult<Vec<FeatureRow>> {
    FeatureBuilder::build(observations)
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
