use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::preprocessing::{ValidationResult, ValidationStats};

/// Python wrapper for ValidationResult
#[pyclass(name = "ValidationResult")]
#[derive(Clone)]
pub struct PyValidationResult {
    #[pyo3(get)]
    pub is_valid: bool,
    #[pyo3(get)]
    pub errors: Vec<String>,
    #[pyo3(get)]
    pub warnings: Vec<String>,
    stats: ValidationStats,
}

#[pymethods]
impl PyValidationResult {
    fn __repr__(&self) -> String {
        format!(
            "ValidationResult(valid={}, errors={}, warnings={})",
            self.is_valid,
            self.errors.len(),
            self.warnings.len()
        )
    }

    /// Get statistics as a Python dict
    fn get_stats<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let dict = PyDict::new(py);
        dict.set_item("total_days", self.stats.total_days)?;
        dict.set_item("first_date", self.stats.first_date.map(|d| d.to_string()))?;
        dict.set_item("last_date", self.stats.last_date.map(|d| d.to_string()))?;
        dict.set_item("duplicate_dates", self.stats.duplicate_dates)?;
        dict.set_item("out_of_order", self.stats.out_of_order)?;
        dict.set_item("missing_days", self.stats.missing_days)?;
        dict.set_item("zero_discharge_days", self.stats.zero_discharge_days)?;
        Ok(dict)
    }
}

impl From<ValidationResult> for PyValidationResult {
    fn from(result: ValidationResult) -> Self {
        PyValidationResult {
            is_valid: result.is_valid,
            errors: result.errors,
            warnings: result.warnings,
            stats: result.stats,
        }
    }
}
