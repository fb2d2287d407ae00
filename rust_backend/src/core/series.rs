//! Read-only store for the daily observation series.

use chrono::NaiveDate;

use super::domain::Observation;
use super::error::{ForecastError, ForecastResult};

/// Ordered daily observations, owned for the lifetime of the process.
///
/// Construction rejects unsorted input and duplicate dates; calendar gaps are
/// left to [`SeriesValidator`](crate::preprocessing::SeriesValidator) to report.
///
/// # Examples
///
/// ```
/// use sph_forecast::core::{domain::Observation, series::SeriesStore};
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let observations = (0..10)
///     .map(|i| Observation::new(start + chrono::Duration::days(i), 50, 40 + i as u32))
///     .collect();
///
/// let store = SeriesStore::new(observations).unwrap();
/// assert_eq!(store.len(), 10);
/// assert_eq!(store.tail(3).len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStore {
    observations: Vec<Observation>,
}

impl SeriesStore {
    pub fn new(observations: Vec<Observation>) -> ForecastResult<Self> {
        for pair in observations.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(ForecastError::UnorderedSeries(format!(
                    "{} follows {}",
                    pair[1].date, pair[0].date
                )));
            }
        }
        Ok(Self { observations })
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.date)
    }

    /// Discharge counts as reals, in chronological order.
    pub fn discharges(&self) -> Vec<f64> {
        self.observations.iter().map(Observation::discharges_f64).collect()
    }

    /// The last `n` observations (all of them when the store is shorter).
    pub fn tail(&self, n: usize) -> &[Observation] {
        let start = self.observations.len().saturating_sub(n);
        &self.observations[start..]
    }

    /// Like [`tail`](Self::tail) but fails when the store is shorter than `n`.
    pub fn require_tail(&self, n: usize) -> ForecastResult<&[Observation]> {
        if self.observations.len() < n {
            return Err(ForecastError::insufficient(n, self.observations.len()));
        }
        Ok(self.tail(n))
    }
}
