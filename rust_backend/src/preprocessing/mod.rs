pub mod features;
pub mod validator;

pub use features::{build_features, FeatureBuilder, LOOKBACK_DAYS, MIN_OBSERVATIONS};
pub use validator::{SeriesValidator, ValidationResult, ValidationStats};
