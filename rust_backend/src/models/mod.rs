//! Predictors consumed by the forecaster and the evaluator.
//!
//! Model training happens elsewhere; this crate only needs something that
//! maps a [`FeatureVector`] to a discharge count. Any type implementing
//! [`Predictor`] can be plugged into the pipeline, including plain closures:
//!
//! ```
//! use sph_forecast::core::domain::FeatureVector;
//! use sph_forecast::models::Predictor;
//!
//! let naive1 = |f: &FeatureVector| f.lag1;
//! let features = FeatureVector { dow: 0, lag1: 42.0, lag7: 40.0, ma7: 41.0 };
//! assert_eq!(naive1.predict(&features).unwrap(), 42.0);
//! ```

pub mod linear;

pub use linear::LinearModel;

use crate::core::domain::FeatureVector;

/// A fitted, stateless model.
///
/// Implementations must be deterministic: the pipeline calls `predict`
/// repeatedly and relies on identical inputs producing identical outputs.
pub trait Predictor {
    fn predict(&self, features: &FeatureVector) -> anyhow::Result<f64>;
}

impl<F> Predictor for F
where
    F: Fn(&FeatureVector) -> f64,
{
    fn predict(&self, features: &FeatureVector) -> anyhow::Result<f64> {
        Ok(self(features))
    }
}
