use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

// --- Public Data Structures ---
// These structs define the public, human-readable format of a trained
// classifier when serialized to a TOML file. The training pipeline (an
// external collaborator) writes these artifacts; this crate only reads them.

/// Ordinal encoding for one categorical column, in the exact category order
/// fixed at training time. A label's encoded value is its position in
/// `categories`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryEncoder {
    pub categories: Vec<String>,
}

impl CategoryEncoder {
    pub fn encode(&self, label: &str) -> Option<f64> {
        self.categories
            .iter()
            .position(|category| category == label)
            .map(|index| index as f64)
    }
}

/// Feature standardization parameters saved from training. Applied before the
/// linear predictor; entries are index-aligned with `feature_names`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Standardizer {
    pub mean: Array1<f64>,
    pub scale: Array1<f64>,
}

/// The top-level, self-contained classifier artifact.
///
/// Everything prediction needs travels inside the file: the ordered feature
/// schema, the class labels in training order, per-column categorical
/// encoders, the optional standardization step, and the fitted coefficients.
/// Never mutated after load.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainedClassifier {
    /// Expected input columns, in the exact order the model was trained on.
    pub feature_names: Vec<String>,
    /// The two class labels in training order. The positive class is the
    /// second; `predict_proba` output is aligned with this order.
    pub classes: [i64; 2],
    pub intercept: f64,
    /// One coefficient per entry of `feature_names`.
    pub coefficients: Array1<f64>,
    /// Present when the training pipeline standardized its inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standardizer: Option<Standardizer>,
    /// Ordinal encoders for categorical columns, keyed by column name.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub encoders: HashMap<String, CategoryEncoder>,
}

/// Custom error type for artifact loading, saving, and consistency checking.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read or write classifier file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TOML classifier file: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("failed to serialize classifier to TOML format: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("classifier artifact is inconsistent: {0}")]
    Inconsistent(String),
}

impl TrainedClassifier {
    /// Loads a classifier from a TOML file and verifies its internal
    /// consistency, so every classifier handed out by the registry is known
    /// to be scoreable.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let raw = fs::read_to_string(path)?;
        let model: Self = toml::from_str(&raw)?;
        model.check_consistency()?;
        Ok(model)
    }

    /// Saves the classifier to a file in a human-readable TOML format.
    pub fn save(&self, path: &Path) -> Result<(), ArtifactError> {
        let toml_string = toml::to_string_pretty(self)?;
        let mut file = BufWriter::new(fs::File::create(path)?);
        file.write_all(toml_string.as_bytes())?;
        Ok(())
    }

    fn check_consistency(&self) -> Result<(), ArtifactError> {
        let n = self.feature_names.len();
        if self.coefficients.len() != n {
            return Err(ArtifactError::Inconsistent(format!(
                "{} coefficients for {n} declared features",
                self.coefficients.len()
            )));
        }
        if let Some(standardizer) = &self.standardizer {
            if standardizer.mean.len() != n || standardizer.scale.len() != n {
                return Err(ArtifactError::Inconsistent(format!(
                    "standardizer covers {}/{} entries for {n} declared features",
                    standardizer.mean.len(),
                    standardizer.scale.len()
                )));
            }
            if standardizer.scale.iter().any(|&s| !s.is_finite() || s == 0.0) {
                return Err(ArtifactError::Inconsistent(
                    "standardizer scale contains zero or non-finite entries".to_string(),
                ));
            }
        }
        for column in self.encoders.keys() {
            if !self.feature_names.iter().any(|name| name == column) {
                return Err(ArtifactError::Inconsistent(format!(
                    "encoder for '{column}' does not match any declared feature"
                )));
            }
        }
        if self.encoders.values().any(|e| e.categories.is_empty()) {
            return Err(ArtifactError::Inconsistent(
                "encoder with an empty category list".to_string(),
            ));
        }
        Ok(())
    }

    /// Probability mass for each class label, aligned with `classes`.
    ///
    /// `x` must hold one value per declared feature, in declared order; the
    /// inference layer constructs it that way from the adapted row.
    pub fn predict_proba(&self, x: ArrayView1<'_, f64>) -> [f64; 2] {
        let eta = match &self.standardizer {
            Some(standardizer) => {
                let z = (&x.to_owned() - &standardizer.mean) / &standardizer.scale;
                self.coefficients.dot(&z) + self.intercept
            }
            None => self.coefficients.dot(&x) + self.intercept,
        };
        // Clamp eta to prevent numerical overflow in exp(), then keep the
        // probability strictly inside (0, 1), mirroring the training side.
        let eta = eta.clamp(-700.0, 700.0);
        let positive = (1.0 / (1.0 + f64::exp(-eta))).clamp(1e-8, 1.0 - 1e-8);
        [1.0 - positive, positive]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn sex_only_classifier() -> TrainedClassifier {
        TrainedClassifier {
            feature_names: vec!["Sexo".to_string(), "EDAD".to_string()],
            classes: [0, 1],
            encoders: HashMap::from([(
                "Sexo".to_string(),
                CategoryEncoder {
                    categories: vec!["Mujer".to_string(), "Varón".to_string()],
                },
            )]),
            standardizer: None,
            coefficients: array![0.8, -0.02],
            intercept: 0.1,
        }
    }

    #[test]
    fn predict_proba_is_a_two_class_distribution() {
        let model = sex_only_classifier();
        let proba = model.predict_proba(array![1.0, 45.0].view());
        assert_relative_eq!(proba[0] + proba[1], 1.0, epsilon = 1e-12);
        assert!(proba[1] > 0.0 && proba[1] < 1.0);
    }

    #[test]
    fn zero_coefficients_reduce_to_the_intercept() {
        let model = TrainedClassifier {
            feature_names: vec!["x".to_string()],
            classes: [0, 1],
            encoders: HashMap::new(),
            standardizer: None,
            coefficients: array![0.0],
            intercept: 0.0,
        };
        let proba = model.predict_proba(array![123.0].view());
        assert_relative_eq!(proba[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn standardizer_is_applied_before_the_linear_predictor() {
        let model = TrainedClassifier {
            feature_names: vec!["x".to_string()],
            classes: [0, 1],
            encoders: HashMap::new(),
            standardizer: Some(Standardizer {
                mean: array![10.0],
                scale: array![2.0],
            }),
            coefficients: array![1.0],
            intercept: 0.0,
        };
        // (10 - 10) / 2 = 0, so the prediction sits exactly at the intercept.
        let proba = model.predict_proba(array![10.0].view());
        assert_relative_eq!(proba[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn extreme_eta_stays_inside_the_open_unit_interval() {
        let model = TrainedClassifier {
            feature_names: vec!["x".to_string()],
            classes: [0, 1],
            encoders: HashMap::new(),
            standardizer: None,
            coefficients: array![1000.0],
            intercept: 0.0,
        };
        let high = model.predict_proba(array![10.0].view());
        let low = model.predict_proba(array![-10.0].view());
        assert!(high[1] <= 1.0 - 1e-8);
        assert!(low[1] >= 1e-8);
    }

    #[test]
    fn artifact_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pasi75_w16.toml");
        let model = sex_only_classifier();
        model.save(&path).unwrap();

        let restored = TrainedClassifier::load(&path).unwrap();
        assert_eq!(restored.feature_names, model.feature_names);
        assert_eq!(restored.classes, model.classes);
        assert_relative_eq!(restored.intercept, model.intercept);
        assert_relative_eq!(
            restored.predict_proba(array![0.0, 60.0].view())[1],
            model.predict_proba(array![0.0, 60.0].view())[1],
            epsilon = 1e-12
        );
    }

    #[test]
    fn mismatched_coefficient_count_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        let mut model = sex_only_classifier();
        model.coefficients = array![0.8];
        // Serialize without the consistency check, then load through it.
        fs::write(&path, toml::to_string_pretty(&model).unwrap()).unwrap();
        assert!(matches!(
            TrainedClassifier::load(&path),
            Err(ArtifactError::Inconsistent(_))
        ));
    }

    #[test]
    fn encoder_for_an_undeclared_feature_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        let mut model = sex_only_classifier();
        model.encoders.insert(
            "Fototipo".to_string(),
            CategoryEncoder {
                categories: vec!["I".to_string()],
            },
        );
        fs::write(&path, toml::to_string_pretty(&model).unwrap()).unwrap();
        assert!(matches!(
            TrainedClassifier::load(&path),
            Err(ArtifactError::Inconsistent(_))
        ));
    }

    #[test]
    fn category_encoding_uses_training_order() {
        let encoder = CategoryEncoder {
            categories: vec!["Mujer".to_string(), "Varón".to_string()],
        };
        assert_eq!(encoder.encode("Mujer"), Some(0.0));
        assert_eq!(encoder.encode("Varón"), Some(1.0));
        assert_eq!(encoder.encode("Otro"), None);
    }
}
