//! Forecasting, evaluation and alerting over the featurized series.
//!
//! # Components
//!
//! - [`forecast`]: two-step recursive forecast (J+1, J+2)
//! - [`evaluation`]: chronological 80/20 hold-out against Naive-1 and Naive-7
//! - [`alert`]: percentile threshold and OK/ALERT classification
//! - [`metrics`]: MAE and MAPE

pub mod alert;
pub mod evaluation;
pub mod forecast;
pub mod metrics;

pub use alert::{alert_status, AlertPolicy, Interpolation};
pub use evaluation::evaluate;
pub use forecast::{forecast_next_two_days, ForecastStep, Forecaster};
pub use metrics::{mae, mape};
