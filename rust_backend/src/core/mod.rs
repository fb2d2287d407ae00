//! Core domain models for the discharge forecasting pipeline.
//!
//! This module defines the observation series, its derived value objects and
//! the error taxonomy shared by every pipeline stage.

pub mod domain;
pub mod error;
pub mod series;

pub use domain::{
    day_of_week, AlertLevel, AlertStatus, EvaluationResult, FeatureRow, FeatureVector,
    ForecastPoint, ModelError, Observation, Residual, TestPoint, FEATURE_NAMES,
};
pub use error::{ForecastError, ForecastResult};
pub use series::SeriesStore;
