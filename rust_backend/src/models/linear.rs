use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::domain::{FeatureVector, FEATURE_NAMES};
use crate::models::Predictor;

/// Ordinary linear model over `dow, lag1, lag7, ma7`.
///
/// Loaded from a JSON artifact exported by the training job:
///
/// ```json
/// {
///   "features": ["dow", "lag1", "lag7", "ma7"],
///   "coefficients": [0.8, 0.35, 0.1, 0.5],
///   "intercept": 2.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    #[serde(default = "default_features")]
    pub features: Vec<String>,
    pub coefficients: [f64; 4],
    pub intercept: f64,
}

fn default_features() -> Vec<String> {
    FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
}

impl LinearModel {
    pub fn new(coefficients: [f64; 4], intercept: f64) -> Self {
        Self {
            features: default_features(),
            coefficients,
            intercept,
        }
    }

    /// Load a model artifact from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model artifact {}", path.display()))?;
        let model = Self::from_json_str(&content)
            .with_context(|| format!("Invalid model artifact {}", path.display()))?;
        log::info!(
            "Loaded linear model from {} (intercept {:.3})",
            path.display(),
            model.intercept
        );
        Ok(model)
    }

    /// Parse a model artifact from a JSON string
    pub fn from_json_str(json_str: &str) -> Result<Self> {
        let deserializer = &mut serde_json::Deserializer::from_str(json_str);
        let model: LinearModel = serde_path_to_error::deserialize(deserializer)
            .context("Failed to parse model JSON")?;
        model.check_feature_order()?;
        Ok(model)
    }

    fn check_feature_order(&self) -> Result<()> {
        if self.features.len() != FEATURE_NAMES.len()
            || self.features.iter().zip(FEATURE_NAMES).any(|(a, b)| a != b)
        {
            anyhow::bail!(
                "Model features {:?} do not match expected order {:?}",
                self.features,
                FEATURE_NAMES
            );
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            anyhow::bail!("Model parameters must be finite");
        }
        Ok(())
    }
}

impl Predictor for LinearModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        let x = features.as_array();
        Ok(self.intercept
            + self
                .coefficients
                .iter()
                .zip(x.iter())
                .map(|(c, v)| c * v)
                .sum::<f64>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predict_is_affine() {
        let model = LinearModel::new([1.0, 0.5, 0.25, 2.0], 3.0);
        let features = FeatureVector {
            dow: 2,
            lag1: 10.0,
            lag7: 8.0,
            ma7: 4.0,
        };
        // 3 + 2 + 5 + 2 + 8
        assert_eq!(model.predict(&features).unwrap(), 20.0);
    }

    #[test]
    fn test_parse_artifact() {
        let json = r#"{
            "features": ["dow", "lag1", "lag7", "ma7"],
            "coefficients": [0.8, 0.35, 0.1, 0.5],
            "intercept": 2.0
        }"#;
        let model = LinearModel::from_json_str(json).unwrap();
        assert_eq!(model.coefficients[1], 0.35);
        assert_eq!(model.intercept, 2.0);
    }

    #[test]
    fn test_features_default_when_omitted() {
        let json = r#"{"coefficients": [0.0, 1.0, 0.0, 0.0], "intercept": 0.0}"#;
        let model = LinearModel::from_json_str(json).unwrap();
        assert_eq!(model.features, vec!["dow", "lag1", "lag7", "ma7"]);
    }

    #[test]
    fn test_rejects_reordered_features() {
        let json = r#"{
            "features": ["lag1", "dow", "lag7", "ma7"],
            "coefficients": [0.8, 0.35, 0.1, 0.5],
            "intercept": 2.0
        }"#;
        let err = LinearModel::from_json_str(json).unwrap_err();
        assert!(err.to_string().contains("expected order"));
    }

    #[test]
    fn test_error_reports_json_path() {
        let json = r#"{"coefficients": [0.8, 0.35, 0.1], "intercept": 2.0}"#;
        let err = LinearModel::from_json_str(json).unwrap_err();
        let chain = format!("{:#}", err);
        assert!(chain.contains("coefficients"), "{}", chain);
    }

    #[test]
    fn test_from_file_roundtrip() {
        use std::io::Write;

        let model = LinearModel::new([0.1, 0.6, 0.2, 0.1], 1.5);
        let mut file = tempfile::NamedTempFile::with_suffix(".json").unwrap();
        write!(file, "{}", serde_json::to_string(&model).unwrap()).unwrap();

        let loaded = LinearModel::from_file(file.path()).unwrap();
        assert_eq!(loaded, model);
    }
}
