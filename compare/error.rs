use std::path::PathBuf;

use thiserror::Error;

use crate::types::{Outcome, TherapyId};

/// Every way a comparison can fail. All variants are terminal for the current
/// request: nothing is retried, and no partial result is produced.
///
/// Variants carry the therapy/outcome context the presentation layer needs to
/// render a message a clinician can act on.
#[derive(Debug, Error)]
pub enum CompareError {
    #[error("no model manifest for {therapy}: {} does not exist", .path.display())]
    ManifestNotFound { therapy: TherapyId, path: PathBuf },

    #[error("model manifest for {therapy} at {} could not be interpreted: {reason}", .path.display())]
    ManifestMalformed {
        therapy: TherapyId,
        path: PathBuf,
        reason: String,
    },

    #[error("the {therapy} manifest lists no model for outcome '{outcome}'")]
    OutcomeUnknown {
        therapy: TherapyId,
        outcome: Outcome,
    },

    #[error("failed to load the {therapy}/{outcome} classifier from {}: {reason}", .path.display())]
    ArtifactLoadError {
        therapy: TherapyId,
        outcome: Outcome,
        path: PathBuf,
        reason: String,
    },

    #[error("invalid value for '{field}': {reason}")]
    InvalidAttributeValue { field: String, reason: String },

    #[error(
        "the {therapy} model expects feature '{feature}', which the adapted row does not provide"
    )]
    FeatureMismatch {
        therapy: TherapyId,
        feature: String,
    },
}
