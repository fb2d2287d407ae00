//! Dashboard snapshot: everything the presentation layer displays, computed
//! in one pass from the series and a fitted predictor.

use anyhow::Result;
use chrono::NaiveDate;
use polars::prelude::DataFrame;
use serde::Serialize;

use crate::algorithms::alert::AlertPolicy;
use crate::algorithms::evaluation::evaluate;
use crate::algorithms::forecast::forecast_next_two_days;
use crate::config::{DisplaySettings, Settings};
use crate::core::domain::{AlertLevel, EvaluationResult, ForecastPoint, Observation};
use crate::core::error::{ForecastError, ForecastResult};
use crate::core::series::SeriesStore;
use crate::io::export::export_table;
use crate::models::Predictor;
use crate::preprocessing::features::{build_features, mean, LOOKBACK_DAYS, MIN_OBSERVATIONS};

/// A forecast day with its alert badge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastCard {
    pub date: NaiveDate,
    pub value: f64,
    pub status: AlertLevel,
}

impl ForecastCard {
    pub fn point(&self) -> ForecastPoint {
        ForecastPoint {
            date: self.date,
            value: self.value,
        }
    }
}

/// One day of the displayed history window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub discharges: f64,
    /// 7-day moving average over the window; absent for its first 6 days
    /// and when smoothing is off.
    pub mm7: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub last_observed: NaiveDate,
    pub forecasts: [ForecastCard; 2],
    pub threshold: i64,
    pub percentile: u8,
    pub history: Vec<HistoryPoint>,
    /// Hold-out diagnostics; absent when the series cannot be evaluated.
    pub evaluation: Option<EvaluationResult>,
    /// Why `evaluation` is absent.
    pub evaluation_error: Option<String>,
    pub beats_baselines: Option<bool>,
    /// Latest ICU occupancy rate, when the source provides one.
    pub icu_rate: Option<f64>,
}

impl DashboardSnapshot {
    pub fn forecast_points(&self) -> [ForecastPoint; 2] {
        [self.forecasts[0].point(), self.forecasts[1].point()]
    }
}

/// Smooth a window with a trailing 7-day mean computed inside the window only.
pub fn compute_mm7(values: &[f64]) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if i + 1 < LOOKBACK_DAYS {
                None
            } else {
                Some(mean(&values[i + 1 - LOOKBACK_DAYS..=i]))
            }
        })
        .collect()
}

/// Build the history window shown next to the forecasts.
pub fn compute_history_window(store: &SeriesStore, display: &DisplaySettings) -> Vec<HistoryPoint> {
    let window = store.tail(display.window);
    let values: Vec<f64> = window.iter().map(Observation::discharges_f64).collect();
    let mm7 = if display.smooth {
        compute_mm7(&values)
    } else {
        vec![None; values.len()]
    };

    window
        .iter()
        .zip(mm7)
        .map(|(obs, mm7)| HistoryPoint {
            date: obs.date,
            discharges: obs.discharges_f64(),
            mm7,
        })
        .collect()
}

/// Orchestrates features, forecast, alert and evaluation for one predictor.
pub struct DashboardService<'a, P: Predictor + ?Sized> {
    predictor: &'a P,
    display: DisplaySettings,
    policy: AlertPolicy,
}

impl<'a, P: Predictor + ?Sized> DashboardService<'a, P> {
    pub fn new(predictor: &'a P, display: DisplaySettings, policy: AlertPolicy) -> Self {
        Self {
            predictor,
            display,
            policy,
        }
    }

    pub fn from_settings(predictor: &'a P, settings: &Settings) -> Self {
        Self::new(predictor, settings.display.clone(), settings.alert.policy())
    }

    /// Recompute the full snapshot from scratch.
    pub fn snapshot(&self, store: &SeriesStore) -> ForecastResult<DashboardSnapshot> {
        self.snapshot_with_context(store, None)
    }

    /// Like [`snapshot`](Self::snapshot), attaching the latest ICU rate.
    pub fn snapshot_with_context(
        &self,
        store: &SeriesStore,
        icu_rate: Option<f64>,
    ) -> ForecastResult<DashboardSnapshot> {
        let last_observed = store
            .last_date()
            .ok_or(ForecastError::InsufficientHistory {
                required: MIN_OBSERVATIONS,
                available: 0,
            })?;

        let rows = build_features(store.observations())?;
        let tail = store.require_tail(LOOKBACK_DAYS)?;
        let (d1, d2) = forecast_next_two_days(self.predictor, &rows, tail)?;

        let history = store.discharges();
        let threshold = self.policy.threshold(&history);
        let card = |p: ForecastPoint| ForecastCard {
            date: p.date,
            value: p.value,
            status: AlertPolicy::classify(threshold, p.value),
        };

        let (evaluation, evaluation_error) = match evaluate(self.predictor, &rows) {
            Ok(result) => (Some(result), None),
            Err(e) => {
                log::warn!("Evaluation unavailable for {}: {}", last_observed, e);
                (None, Some(e.to_string()))
            }
        };
        let beats_baselines = evaluation.as_ref().map(EvaluationResult::beats_baselines);

        log::info!(
            "Snapshot for {}: J+1 {:.1}, J+2 {:.1}, threshold {} (p{})",
            last_observed,
            d1.value,
            d2.value,
            threshold,
            self.policy.percentile()
        );

        Ok(DashboardSnapshot {
            last_observed,
            forecasts: [card(d1), card(d2)],
            threshold,
            percentile: self.policy.percentile(),
            history: compute_history_window(store, &self.display),
            evaluation,
            evaluation_error,
            beats_baselines,
            icu_rate,
        })
    }

    /// Export table for a snapshot: the display window plus both forecasts.
    pub fn export(&self, store: &SeriesStore, snapshot: &DashboardSnapshot) -> Result<DataFrame> {
        export_table(store.tail(self.display.window), &snapshot.forecast_points())
    }
}
