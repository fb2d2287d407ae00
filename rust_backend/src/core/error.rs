//! Error types for the forecasting pipeline.

/// Result type for pipeline operations
pub type ForecastResult<T> = Result<T, ForecastError>;

/// Error type for pipeline operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ForecastError {
    #[error("Insufficient history: {required} observations required, {available} available")]
    InsufficientHistory { required: usize, available: usize },

    #[error("Prediction failed at step {step}: {reason}")]
    PredictionFailed { step: usize, reason: String },

    #[error("Degenerate metric: {0}")]
    DegenerateMetric(String),

    #[error("Misaligned input: {0}")]
    MisalignedInput(String),

    #[error("Unordered series: {0}")]
    UnorderedSeries(String),
}

impl ForecastError {
    pub(crate) fn insufficient(required: usize, available: usize) -> Self {
        ForecastError::InsufficientHistory {
            required,
            available,
        }
    }
}
