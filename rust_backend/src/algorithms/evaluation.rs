//! Hold-out evaluation against naive baselines.
//!
//! The feature table is split chronologically at `floor(0.8 * n)`. The
//! predictor is already fitted, so the leading 80% only serves as lookback
//! for the baselines. Model predictions, Naive-1 and Naive-7 are compared
//! over the same trailing rows.

use crate::algorithms::metrics::{mae, mape};
use crate::core::domain::{EvaluationResult, FeatureRow, ModelError, Residual, TestPoint};
use crate::core::error::{ForecastError, ForecastResult};
use crate::models::Predictor;

/// Naive-7 looks this many rows back from each test row.
const NAIVE7_OFFSET: usize = 7;

/// Index of the first test row for a table of `n` rows.
pub fn split_index(n: usize) -> usize {
    n * 4 / 5
}

/// Evaluate a predictor on the trailing 20% of the feature table.
///
/// # Errors
///
/// - `InsufficientHistory` when `0.2 * n < 1` (fewer than 5 rows).
/// - `DegenerateMetric` when the split point is too early for the Naive-7
///   lookup to stay inside the table.
/// - `PredictionFailed` (step = 1-based position in the test segment) when
///   the predictor errors or returns a non-finite value.
pub fn evaluate<P: Predictor + ?Sized>(
    predictor: &P,
    feature_rows: &[FeatureRow],
) -> ForecastResult<EvaluationResult> {
    let n = feature_rows.len();
    // 0.2 * n < 1  <=>  n < 5
    if n * 2 < 10 {
        return Err(ForecastError::insufficient(5, n));
    }

    let split = split_index(n);
    if split < NAIVE7_OFFSET {
        return Err(ForecastError::DegenerateMetric(format!(
            "Naive-7 baseline needs {} rows before the test segment, found {}",
            NAIVE7_OFFSET, split
        )));
    }

    let test = &feature_rows[split..];
    let mut test_points = Vec::with_capacity(test.len());
    for (offset, row) in test.iter().enumerate() {
        let predicted = predictor
            .predict(&row.features())
            .map_err(|e| ForecastError::PredictionFailed {
                step: offset + 1,
                reason: format!("{:#}", e),
            })?;
        if !predicted.is_finite() {
            return Err(ForecastError::PredictionFailed {
                step: offset + 1,
                reason: format!("predictor returned non-finite value {}", predicted),
            });
        }
        test_points.push(TestPoint {
            date: row.date,
            actual: row.discharges,
            predicted,
        });
    }

    let actual: Vec<f64> = test.iter().map(|r| r.discharges).collect();
    let predicted: Vec<f64> = test_points.iter().map(|p| p.predicted).collect();
    let naive1: Vec<f64> = (split..n).map(|i| feature_rows[i - 1].discharges).collect();
    let naive7: Vec<f64> = (split..n)
        .map(|i| feature_rows[i - NAIVE7_OFFSET].discharges)
        .collect();

    let model_error = ModelError {
        mae: mae(&actual, &predicted),
        mape: mape(&actual, &predicted),
    };
    if !model_error.mape.is_finite() {
        log::warn!("MAPE is undefined over the test segment (zero actual discharges)");
    }

    let residuals = test_points
        .iter()
        .map(|p| Residual {
            date: p.date,
            value: p.residual(),
        })
        .collect();

    let result = EvaluationResult {
        model_error,
        naive1_error: mae(&actual, &naive1),
        naive7_error: mae(&actual, &naive7),
        residuals,
        split_index: split,
        test_points,
    };

    log::info!(
        "Evaluated {} test rows: MAE {:.2} (naive-1 {:.2}, naive-7 {:.2})",
        result.test_points.len(),
        result.model_error.mae,
        result.naive1_error,
        result.naive7_error
    );

    Ok(result)
}
