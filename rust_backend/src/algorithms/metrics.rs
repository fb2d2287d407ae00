//! Point-forecast accuracy metrics.
//!
//! Both functions expect equal-length, non-empty inputs; the evaluator
//! guarantees this. Zero actuals are not special-cased by [`mape`].

/// Mean absolute error.
///
/// ```
/// use sph_forecast::algorithms::metrics::mae;
///
/// assert_eq!(mae(&[10.0, 20.0], &[12.0, 17.0]), 2.5);
/// ```
pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    debug_assert_eq!(actual.len(), predicted.len());
    let sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum();
    sum / actual.len() as f64
}

/// Mean absolute percentage error, on a 0-100 scale.
///
/// Any zero actual makes the result infinite (or NaN when the prediction is
/// also zero).
///
/// ```
/// use sph_forecast::algorithms::metrics::mape;
///
/// assert_eq!(mape(&[100.0, 50.0], &[90.0, 55.0]), 10.0);
/// assert!(!mape(&[0.0], &[1.0]).is_finite());
/// ```
pub fn mape(actual: &[f64], predicted: &[f64]) -> f64 {
    debug_assert_eq!(actual.len(), predicted.len());
    let sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs() / a)
        .sum();
    100.0 * sum / actual.len() as f64
}
