use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use std::path::Path;

use crate::core::domain::FeatureVector;
use crate::models::{LinearModel, Predictor};

/// Python wrapper for LinearModel
#[pyclass(name = "LinearModel")]
#[derive(Clone)]
pub struct PyLinearModel {
    pub(crate) inner: LinearModel,
}

#[pymethods]
impl PyLinearModel {
    #[new]
    fn new(coefficients: Vec<f64>, intercept: f64) -> PyResult<Self> {
        let coefficients: [f64; 4] = coefficients.try_into().map_err(|v: Vec<f64>| {
            PyValueError::new_err(format!("Expected 4 coefficients, got {}", v.len()))
        })?;
        Ok(Self {
            inner: LinearModel::new(coefficients, intercept),
        })
    }

    /// Load a JSON model artifact
    #[staticmethod]
    fn from_file(path: &str) -> PyResult<Self> {
        let inner = LinearModel::from_file(Path::new(path))
            .map_err(|e| PyRuntimeError::new_err(format!("{:#}", e)))?;
        Ok(Self { inner })
    }

    #[getter]
    fn coefficients(&self) -> Vec<f64> {
        self.inner.coefficients.to_vec()
    }

    #[getter]
    fn intercept(&self) -> f64 {
        self.inner.intercept
    }

    /// Predict discharges for one feature vector
    fn predict(&self, dow: u8, lag1: f64, lag7: f64, ma7: f64) -> PyResult<f64> {
        let features = FeatureVector {
            dow,
            lag1,
            lag7,
            ma7,
        };
        self.inner
            .predict(&features)
            .map_err(|e| PyRuntimeError::new_err(format!("{:#}", e)))
    }

    fn __repr__(&self) -> String {
        format!(
            "LinearModel(coefficients={:?}, intercept={:.3})",
            self.inner.coefficients, self.inner.intercept
        )
    }
}
