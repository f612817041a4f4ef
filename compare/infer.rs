//! Scores one adapted feature row against one trained classifier.
//!
//! The row is reindexed to the classifier's declared feature order before
//! scoring. A declared feature missing from the row is an adapter defect and
//! fails loudly; columns the classifier never declared are dropped.

use ndarray::Array1;

use crate::error::CompareError;
use crate::registry::model::TrainedClassifier;
use crate::types::{FeatureValue, TherapyFeatureRow};

/// Returns the probability of the positive class, which sits at index 1 of
/// the artifact's class list. Class order is fixed at training time and
/// trusted as given.
pub fn score(model: &TrainedClassifier, row: &TherapyFeatureRow) -> Result<f64, CompareError> {
    let x = reindex(model, row)?;
    Ok(model.predict_proba(x.view())[1])
}

/// Aligns `row` to the model's declared feature order and encodes every cell
/// to its numeric value.
fn reindex(model: &TrainedClassifier, row: &TherapyFeatureRow) -> Result<Array1<f64>, CompareError> {
    let mut values = Vec::with_capacity(model.feature_names.len());
    for feature in &model.feature_names {
        let value = row
            .get(feature)
            .ok_or_else(|| CompareError::FeatureMismatch {
                therapy: row.therapy(),
                feature: feature.clone(),
            })?;
        values.push(numeric(model, feature, value)?);
    }
    Ok(Array1::from_vec(values))
}

fn numeric(
    model: &TrainedClassifier,
    feature: &str,
    value: &FeatureValue,
) -> Result<f64, CompareError> {
    match value {
        FeatureValue::Float(v) => Ok(*v),
        FeatureValue::Int(v) => Ok(*v as f64),
        FeatureValue::Label(label) => {
            let encoder =
                model
                    .encoders
                    .get(feature)
                    .ok_or_else(|| CompareError::InvalidAttributeValue {
                        field: feature.to_string(),
                        reason: format!(
                            "categorical value '{label}' but the artifact stores no encoding"
                        ),
                    })?;
            encoder
                .encode(label)
                .ok_or_else(|| CompareError::InvalidAttributeValue {
                    field: feature.to_string(),
                    reason: format!("label '{label}' is not among the trained categories"),
                })
        }
    }
}
