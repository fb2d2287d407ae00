//! Two-day recursive forecast.
//!
//! J+1 is predicted from the true last week of observations. J+2 reuses the
//! J+1 prediction as if it had been observed: it becomes `lag1` and the
//! seventh value of the moving-average window, while `lag7` shifts one
//! position forward in the raw tail.
//!
//! The rollout is an explicit two-state machine rather than an n-step loop;
//! the lag-shift rule is specific to each step.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::domain::{day_of_week, FeatureRow, FeatureVector, ForecastPoint, Observation};
use crate::core::error::{ForecastError, ForecastResult};
use crate::models::Predictor;
use crate::preprocessing::features::{mean, LOOKBACK_DAYS};

/// Which of the two forecast steps is being computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForecastStep {
    First,
    Second,
}

impl ForecastStep {
    /// 1-based step index reported in `PredictionFailed`.
    pub fn index(&self) -> usize {
        match self {
            ForecastStep::First => 1,
            ForecastStep::Second => 2,
        }
    }

    /// Days after the last observed date.
    pub fn horizon(&self) -> i64 {
        self.index() as i64
    }
}

/// Rollout state. Each transition is a single pure predictor call.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Rollout {
    AwaitingStep1,
    AwaitingStep2 { first: ForecastPoint },
}

/// Two-step forecaster over the last week of raw discharges.
pub struct Forecaster<'a, P: Predictor + ?Sized> {
    predictor: &'a P,
    last_date: NaiveDate,
    /// The last 7 raw discharge values, oldest first.
    week: [f64; LOOKBACK_DAYS],
}

impl<'a, P: Predictor + ?Sized> Forecaster<'a, P> {
    /// Prepare a forecaster from the feature table and the raw tail.
    ///
    /// The feature table must end on the same date as the raw tail, and the
    /// raw tail must hold at least 7 observations.
    pub fn new(
        predictor: &'a P,
        feature_rows: &[FeatureRow],
        raw_tail: &[Observation],
    ) -> ForecastResult<Self> {
        if raw_tail.len() < LOOKBACK_DAYS {
            return Err(ForecastError::insufficient(LOOKBACK_DAYS, raw_tail.len()));
        }
        let last_row = feature_rows
            .last()
            .ok_or_else(|| ForecastError::insufficient(1, 0))?;
        let last_obs = &raw_tail[raw_tail.len() - 1];
        if last_row.date != last_obs.date {
            return Err(ForecastError::MisalignedInput(format!(
                "feature table ends on {} but raw tail ends on {}",
                last_row.date, last_obs.date
            )));
        }

        let mut week = [0.0; LOOKBACK_DAYS];
        for (slot, obs) in week
            .iter_mut()
            .zip(&raw_tail[raw_tail.len() - LOOKBACK_DAYS..])
        {
            *slot = obs.discharges_f64();
        }

        Ok(Self {
            predictor,
            last_date: last_obs.date,
            week,
        })
    }

    /// Feature vector for J+1: only true observations.
    pub fn step1_features(&self) -> FeatureVector {
        let target = self.target_date(ForecastStep::First);
        FeatureVector {
            dow: day_of_week(target),
            lag1: self.week[LOOKBACK_DAYS - 1],
            lag7: self.week[0],
            ma7: mean(&self.week),
        }
    }

    /// Feature vector for J+2, substituting `p1` for the unobserved J+1.
    pub fn step2_features(&self, p1: f64) -> FeatureVector {
        let target = self.target_date(ForecastStep::Second);
        let mut window = [0.0; LOOKBACK_DAYS];
        window[..LOOKBACK_DAYS - 1].copy_from_slice(&self.week[1..]);
        window[LOOKBACK_DAYS - 1] = p1;
        FeatureVector {
            dow: day_of_week(target),
            lag1: p1,
            lag7: self.week[1],
            ma7: mean(&window),
        }
    }

    /// Run both steps and return `(J+1, J+2)`.
    pub fn run(&self) -> ForecastResult<(ForecastPoint, ForecastPoint)> {
        let mut state = Rollout::AwaitingStep1;
        loop {
            state = match state {
                Rollout::AwaitingStep1 => {
                    let features = self.step1_features();
                    let first = self.invoke(ForecastStep::First, &features)?;
                    Rollout::AwaitingStep2 { first }
                }
                Rollout::AwaitingStep2 { first } => {
                    let features = self.step2_features(first.value);
                    let second = self.invoke(ForecastStep::Second, &features)?;
                    log::debug!(
                        "Forecast {} = {:.2}, {} = {:.2}",
                        first.date,
                        first.value,
                        second.date,
                        second.value
                    );
                    return Ok((first, second));
                }
            };
        }
    }

    fn target_date(&self, step: ForecastStep) -> NaiveDate {
        self.last_date + Duration::days(step.horizon())
    }

    fn invoke(&self, step: ForecastStep, features: &FeatureVector) -> ForecastResult<ForecastPoint> {
        let value = self
            .predictor
            .predict(features)
            .map_err(|e| ForecastError::PredictionFailed {
                step: step.index(),
                reason: format!("{:#}", e),
            })?;
        if !value.is_finite() {
            return Err(ForecastError::PredictionFailed {
                step: step.index(),
                reason: format!("predictor returned non-finite value {}", value),
            });
        }
        Ok(ForecastPoint {
            date: self.target_date(step),
            value,
        })
    }
}

/// Forecast the two calendar days following the last observation.
///
/// # Errors
///
/// - `InsufficientHistory` if `raw_tail` has fewer than 7 observations or the
///   feature table is empty.
/// - `MisalignedInput` if the feature table and raw tail end on different dates.
/// - `PredictionFailed` with the failing step index (1 or 2).
pub fn forecast_next_two_days<P: Predictor + ?Sized>(
    predictor: &P,
    feature_rows: &[FeatureRow],
    raw_tail: &[Observation],
) -> ForecastResult<(ForecastPoint, ForecastPoint)> {
    Forecaster::new(predictor, feature_rows, raw_tail)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::build_features;

    const SCENARIO: [u32; 10] = [100, 102, 98, 105, 110, 95, 97, 101, 99, 108];

    fn series(values: &[u32]) -> Vec<Observation> {
        // 2024-01-01 is a Monday
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &d)| Observation::new(start + Duration::days(i as i64), 0, d))
            .collect()
    }

    fn lag_mean(f: &FeatureVector) -> f64 {
        (f.lag1 + f.lag7) / 2.0
    }

    #[test]
    fn test_recursive_substitution_scenario() {
        let obs = series(&SCENARIO);
        let rows = build_features(&obs).unwrap();

        let (d1, d2) = forecast_next_two_days(&lag_mean, &rows, &obs).unwrap();

        // J+1: lag1 = 108, lag7 = 105 (observation dated J+1 - 7)
        assert_eq!(d1.value, 106.5);
        // J+2: lag1 = p1, lag7 = 110
        assert_eq!(d2.value, 108.25);
        assert_eq!(d1.date, NaiveDate::from_ymd_opt(2024, 1, 11).unwrap());
        assert_eq!(d2.date, NaiveDate::from_ymd_opt(2024, 1, 12).unwrap());
    }

    #[test]
    fn test_step_features_shift_window() {
        let obs = series(&SCENARIO);
        let rows = build_features(&obs).unwrap();
        let forecaster = Forecaster::new(&lag_mean, &rows, &obs).unwrap();

        let f1 = forecaster.step1_features();
        // 2024-01-11 is a Thursday
        assert_eq!(f1.dow, 3);
        let last_week = [105.0, 110.0, 95.0, 97.0, 101.0, 99.0, 108.0];
        assert_eq!(f1.ma7, last_week.iter().sum::<f64>() / 7.0);

        let f2 = forecaster.step2_features(200.0);
        assert_eq!(f2.dow, 4);
        assert_eq!(f2.lag1, 200.0);
        let shifted = [110.0, 95.0, 97.0, 101.0, 99.0, 108.0, 200.0];
        assert_eq!(f2.ma7, shifted.iter().sum::<f64>() / 7.0);
    }

    #[test]
    fn test_forecast_is_deterministic() {
        let obs = series(&SCENARIO);
        let rows = build_features(&obs).unwrap();
        let predictor = |f: &FeatureVector| 0.3 * f.lag1 + 0.2 * f.lag7 + 0.5 * f.ma7;

        let first = forecast_next_two_days(&predictor, &rows, &obs).unwrap();
        let second = forecast_next_two_days(&predictor, &rows, &obs).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_short_tail_is_insufficient() {
        let obs = series(&SCENARIO);
        let rows = build_features(&obs).unwrap();
        let result = forecast_next_two_days(&lag_mean, &rows, &obs[4..]);
        assert_eq!(
            result,
            Err(ForecastError::InsufficientHistory {
                required: 7,
                available: 6
            })
        );
    }

    #[test]
    fn test_misaligned_tail_is_rejected() {
        let obs = series(&SCENARIO);
        let rows = build_features(&obs).unwrap();
        let result = forecast_next_two_days(&lag_mean, &rows, &obs[..9]);
        assert!(matches!(result, Err(ForecastError::MisalignedInput(_))));
    }

    struct FailsOnSecondCall {
        calls: std::cell::Cell<usize>,
    }

    impl Predictor for FailsOnSecondCall {
        fn predict(&self, _features: &FeatureVector) -> anyhow::Result<f64> {
            let n = self.calls.get() + 1;
            self.calls.set(n);
            if n == 2 {
                anyhow::bail!("model unavailable");
            }
            Ok(1.0)
        }
    }

    #[test]
    fn test_prediction_failure_carries_step() {
        let obs = series(&SCENARIO);
        let rows = build_features(&obs).unwrap();
        let predictor = FailsOnSecondCall {
            calls: std::cell::Cell::new(0),
        };

        match forecast_next_two_days(&predictor, &rows, &obs) {
            Err(ForecastError::PredictionFailed { step, reason }) => {
                assert_eq!(step, 2);
                assert!(reason.contains("model unavailable"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_prediction_fails_first_step() {
        let obs = series(&SCENARIO);
        let rows = build_features(&obs).unwrap();
        let result = forecast_next_two_days(&|_: &FeatureVector| f64::NAN, &rows, &obs);
        assert!(matches!(
            result,
            Err(ForecastError::PredictionFailed { step: 1, .. })
        ));
    }
}
