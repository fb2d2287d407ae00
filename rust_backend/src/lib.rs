//! Discharge forecasting pipeline for the SPH bed-management dashboard.
//!
//! A daily series of hospital discharges is featurized (`dow, lag1, lag7,
//! ma7`), forecast two days ahead with a pre-fitted predictor, evaluated
//! against naive baselines and compared with a historical alert threshold.

pub mod algorithms;
pub mod config;
pub mod core;
pub mod io;
pub mod models;
pub mod preprocessing;
pub mod services;

#[cfg(feature = "python")]
pub mod python;

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// SPH discharge forecast - Rust backend for the Streamlit dashboard
#[cfg(feature = "python")]
#[pymodule]
fn sph_forecast(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<python::PyLinearModel>()?;
    m.add_class::<python::PyValidationResult>()?;

    // Pipeline stages
    m.add_function(wrap_pyfunction!(python::py_feature_table, m)?)?;
    m.add_function(wrap_pyfunction!(python::py_forecast_next_two_days, m)?)?;
    m.add_function(wrap_pyfunction!(python::py_evaluate, m)?)?;
    m.add_function(wrap_pyfunction!(python::py_alert_status, m)?)?;
    m.add_function(wrap_pyfunction!(python::py_validate_series, m)?)?;

    // Dashboard
    m.add_function(wrap_pyfunction!(python::py_dashboard_snapshot, m)?)?;
    m.add_function(wrap_pyfunction!(python::py_export_csv, m)?)?;

    Ok(())
}
