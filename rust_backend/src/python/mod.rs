//! Python bindings for the forecasting pipeline.
//!
//! This module exposes the pipeline to the Streamlit dashboard via PyO3.
//! It is compiled only with the `python` feature.
//!
//! # Modules
//!
//! - [`models`]: the `LinearModel` class
//! - [`pipeline`]: forecast, evaluation, alert, snapshot and export functions
//! - [`validation`]: series validation results
//!
//! # Python API
//!
//! All functions are available in the `sph_forecast` Python module after
//! installation.

pub mod models;
pub mod pipeline;
pub mod validation;

pub use models::PyLinearModel;
pub use pipeline::*;
pub use validation::PyValidationResult;
