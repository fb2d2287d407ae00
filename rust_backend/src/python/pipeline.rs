use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use super::models::PyLinearModel;
use super::validation::PyValidationResult;
use crate::algorithms::{alert, evaluation, forecast};
use crate::config::Settings;
use crate::core::domain::Observation;
use crate::core::error::ForecastError;
use crate::core::series::SeriesStore;
use crate::io::export::export_csv_string;
use crate::io::loaders::{parse_date, SeriesLoader};
use crate::models::LinearModel;
use crate::preprocessing::{build_features, SeriesValidator};
use crate::services::DashboardService;

fn forecast_err(e: ForecastError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn runtime_err(e: anyhow::Error) -> PyErr {
    PyRuntimeError::new_err(format!("{:#}", e))
}

/// Build a series from parallel Python lists of ISO dates and counts.
fn series_from_lists(
    dates: &[String],
    admissions: Option<&[u32]>,
    discharges: &[u32],
) -> PyResult<SeriesStore> {
    if dates.len() != discharges.len() || admissions.is_some_and(|a| a.len() != dates.len()) {
        return Err(PyValueError::new_err(
            "dates, admissions and discharges must have the same length",
        ));
    }
    let observations = dates
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let date = parse_date(d).map_err(runtime_err)?;
            let adm = admissions.map_or(0, |a| a[i]);
            Ok(Observation::new(date, adm, discharges[i]))
        })
        .collect::<PyResult<Vec<_>>>()?;
    SeriesStore::new(observations).map_err(forecast_err)
}

/// Forecast J+1 and J+2 from a discharge history
///
/// Args:
///     model: LinearModel
///     dates: ISO dates, oldest first
///     discharges: daily discharge counts aligned with `dates`
///
/// Returns:
///     list[tuple[str, float]]: [(J+1 date, value), (J+2 date, value)]
#[pyfunction]
pub fn py_forecast_next_two_days(
    model: PyRef<'_, PyLinearModel>,
    dates: Vec<String>,
    discharges: Vec<u32>,
) -> PyResult<Vec<(String, f64)>> {
    let store = series_from_lists(&dates, None, &discharges)?;
    let rows = build_features(store.observations()).map_err(forecast_err)?;
    let tail = store
        .require_tail(crate::preprocessing::LOOKBACK_DAYS)
        .map_err(forecast_err)?;
    let (d1, d2) =
        forecast::forecast_next_two_days(&model.inner, &rows, tail).map_err(forecast_err)?;
    Ok(vec![
        (d1.date.to_string(), d1.value),
        (d2.date.to_string(), d2.value),
    ])
}

/// Evaluate a model on the trailing 20% of the history
///
/// Returns:
///     str: JSON-encoded evaluation (errors, baselines, residuals)
#[pyfunction]
pub fn py_evaluate(
    model: PyRef<'_, PyLinearModel>,
    dates: Vec<String>,
    discharges: Vec<u32>,
) -> PyResult<String> {
    let store = series_from_lists(&dates, None, &discharges)?;
    let rows = build_features(store.observations()).map_err(forecast_err)?;
    let result = evaluation::evaluate(&model.inner, &rows).map_err(forecast_err)?;
    serde_json::to_string(&result).map_err(|e| PyRuntimeError::new_err(e.to_string()))
}

/// Alert threshold and status for a forecast value
///
/// Args:
///     history: discharge history, any order
///     percentile: threshold percentile, clamped to [50, 95]
///     forecast_value: value to classify
///
/// Returns:
///     tuple[int, str]: (threshold, "OK" | "ALERT")
#[pyfunction]
pub fn py_alert_status(history: Vec<f64>, percentile: u8, forecast_value: f64) -> (i64, String) {
    let status = alert::alert_status(&history, percentile, forecast_value);
    (status.threshold, status.status.to_string())
}

/// Validate a daily series before forecasting
#[pyfunction]
#[pyo3(signature = (dates, discharges, admissions=None))]
pub fn py_validate_series(
    dates: Vec<String>,
    discharges: Vec<u32>,
    admissions: Option<Vec<u32>>,
) -> PyResult<PyValidationResult> {
    if dates.len() != discharges.len() {
        return Err(PyValueError::new_err(
            "dates and discharges must have the same length",
        ));
    }
    let observations = dates
        .iter()
        .zip(&discharges)
        .enumerate()
        .map(|(i, (d, &dis))| {
            let date = parse_date(d).map_err(runtime_err)?;
            let adm = admissions.as_ref().and_then(|a| a.get(i).copied()).unwrap_or(0);
            Ok(Observation::new(date, adm, dis))
        })
        .collect::<PyResult<Vec<_>>>()?;
    Ok(SeriesValidator::validate(&observations).into())
}

/// Compute the full dashboard snapshot for a settings file
///
/// Args:
///     config_path: path to forecast.toml
///
/// Returns:
///     str: JSON-encoded snapshot
#[pyfunction]
pub fn py_dashboard_snapshot(config_path: &str) -> PyResult<String> {
    let settings =
        Settings::from_file(config_path).map_err(|e| PyValueError::new_err(e.to_string()))?;
    let loaded = SeriesLoader::new(settings.ingestion.clone())
        .load_from_csv(&settings.data.path)
        .map_err(runtime_err)?;
    let model = LinearModel::from_file(&settings.model.path).map_err(runtime_err)?;

    let service = DashboardService::from_settings(&model, &settings);
    let snapshot = service
        .snapshot_with_context(&loaded.store, loaded.latest_icu_rate())
        .map_err(forecast_err)?;
    serde_json::to_string(&snapshot).map_err(|e| PyRuntimeError::new_err(e.to_string()))
}

/// History window plus forecasts as CSV text, for the download button
#[pyfunction]
pub fn py_export_csv(config_path: &str) -> PyResult<String> {
    let settings =
        Settings::from_file(config_path).map_err(|e| PyValueError::new_err(e.to_string()))?;
    let loaded = SeriesLoader::new(settings.ingestion.clone())
        .load_from_csv(&settings.data.path)
        .map_err(runtime_err)?;
    let model = LinearModel::from_file(&settings.model.path).map_err(runtime_err)?;

    let service = DashboardService::from_settings(&model, &settings);
    let snapshot = service.snapshot(&loaded.store).map_err(forecast_err)?;
    let mut df = service.export(&loaded.store, &snapshot).map_err(runtime_err)?;
    export_csv_string(&mut df).map_err(runtime_err)
}

/// Model-ready feature table
///
/// Returns:
///     list[tuple[str, int, float, float, float, float]]:
///         (date, dow, lag1, lag7, ma7, discharges) per featurized day
#[pyfunction]
#[pyo3(signature = (dates, discharges, admissions=None))]
pub fn py_feature_table(
    dates: Vec<String>,
    discharges: Vec<u32>,
    admissions: Option<Vec<u32>>,
) -> PyResult<Vec<(String, u8, f64, f64, f64, f64)>> {
    let store = series_from_lists(&dates, admissions.as_deref(), &discharges)?;
    let rows = build_features(store.observations()).map_err(forecast_err)?;
    Ok(rows
        .into_iter()
        .map(|r| (r.date.to_string(), r.dow, r.lag1, r.lag7, r.ma7, r.discharges))
        .collect())
}
