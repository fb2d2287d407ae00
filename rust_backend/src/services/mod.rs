//! Service layer that sits between the pipeline and its front ends.
//!
//! Services orchestrate loading, featurization, forecasting, alerting and
//! evaluation into the view models consumed by the CLI and the Python
//! bindings.

pub mod dashboard;

pub use dashboard::{
    compute_history_window, compute_mm7, DashboardService, DashboardSnapshot, ForecastCard,
    HistoryPoint,
};
