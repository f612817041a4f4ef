//! # Model Registry
//!
//! Resolves a (therapy bundle directory, outcome) pair to a loaded classifier
//! by way of the bundle's `metadata.json`, and memoizes every classifier for
//! the process lifetime. Artifacts never change once deployed, so the cache is
//! populate-once-then-read-only and safe for concurrent readers.

pub mod manifest;
pub mod model;

use dashmap::DashMap;
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::CompareError;
use crate::types::{Outcome, TherapyId};
use manifest::{load_manifest, resolve_artifact_path};
use model::TrainedClassifier;

#[derive(Debug, Default)]
pub struct ModelRegistry {
    cache: DashMap<(PathBuf, Outcome), Arc<TrainedClassifier>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves and loads the classifier for one (therapy, outcome) pair.
    ///
    /// The manifest is consulted on every cache miss; a hit skips the disk
    /// entirely.
    pub fn load(
        &self,
        therapy_dir: &Path,
        therapy: TherapyId,
        outcome: Outcome,
    ) -> Result<Arc<TrainedClassifier>, CompareError> {
        let key = (therapy_dir.to_path_buf(), outcome);
        if let Some(hit) = self.cache.get(&key) {
            debug!("registry cache hit for {therapy}/{outcome}");
            return Ok(Arc::clone(hit.value()));
        }

        let bundle = load_manifest(therapy_dir, therapy)?;
        let stored = bundle
            .artifact_path(outcome)
            .ok_or(CompareError::OutcomeUnknown { therapy, outcome })?;
        let artifact_path = resolve_artifact_path(therapy_dir, stored);
        let classifier =
            TrainedClassifier::load(&artifact_path).map_err(|err| CompareError::ArtifactLoadError {
                therapy,
                outcome,
                path: artifact_path.clone(),
                reason: err.to_string(),
            })?;
        info!(
            "loaded {therapy}/{outcome} classifier from {} ({} features)",
            artifact_path.display(),
            classifier.feature_names.len()
        );

        // Insert-if-absent: a racing loader may already have populated the
        // slot with the same immutable artifact.
        let entry = self.cache.entry(key).or_insert(Arc::new(classifier));
        Ok(Arc::clone(entry.value()))
    }
}
