//! Comparison orchestration: one patient record in, six probabilities and a
//! winning therapy out.

use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::adapt::adapt;
use crate::error::CompareError;
use crate::infer::score;
use crate::registry::ModelRegistry;
use crate::types::{ComparisonResult, Outcome, PatientRecord, TherapyId, TherapyScores};

/// Filesystem layout of the per-therapy model bundles.
#[derive(Debug, Clone)]
pub struct ModelSources {
    adalimumab: PathBuf,
    ixekizumab: PathBuf,
    bimekizumab: PathBuf,
}

impl ModelSources {
    pub fn new(
        adalimumab: impl Into<PathBuf>,
        ixekizumab: impl Into<PathBuf>,
        bimekizumab: impl Into<PathBuf>,
    ) -> Self {
        ModelSources {
            adalimumab: adalimumab.into(),
            ixekizumab: ixekizumab.into(),
            bimekizumab: bimekizumab.into(),
        }
    }

    pub fn dir(&self, therapy: TherapyId) -> &Path {
        match therapy {
            TherapyId::Adalimumab => &self.adalimumab,
            TherapyId::Ixekizumab => &self.ixekizumab,
            TherapyId::Bimekizumab => &self.bimekizumab,
        }
    }
}

impl Default for ModelSources {
    /// Bundle directory names used by the original deployment.
    fn default() -> Self {
        ModelSources::new("models_ada", "models_ixe", "models_bime")
    }
}

/// Runs the full three-therapy comparison against a fixed set of bundles,
/// reusing loaded classifiers across requests.
#[derive(Debug, Default)]
pub struct Comparator {
    registry: ModelRegistry,
    sources: ModelSources,
}

impl Comparator {
    pub fn new(sources: ModelSources) -> Self {
        Comparator {
            registry: ModelRegistry::new(),
            sources,
        }
    }

    /// Scores all 3 therapies on both endpoints and names the one with the
    /// highest PASI90 probability.
    ///
    /// Fail-fast: the first failing sub-computation aborts the comparison and
    /// no partial result is returned.
    pub fn compare(&self, patient: &PatientRecord) -> Result<ComparisonResult, CompareError> {
        let scores = [
            self.score_therapy(patient, TherapyId::Adalimumab)?,
            self.score_therapy(patient, TherapyId::Ixekizumab)?,
            self.score_therapy(patient, TherapyId::Bimekizumab)?,
        ];

        // Stable max over canonical order: the first therapy reaching the
        // maximum wins on exact ties.
        let mut best = &scores[0];
        for candidate in &scores[1..] {
            if candidate.pasi90 > best.pasi90 {
                best = candidate;
            }
        }
        let best = best.therapy;
        info!("highest {} probability: {best}", Outcome::PRIMARY);

        Ok(ComparisonResult { scores, best })
    }

    fn score_therapy(
        &self,
        patient: &PatientRecord,
        therapy: TherapyId,
    ) -> Result<TherapyScores, CompareError> {
        let dir = self.sources.dir(therapy);
        let mut probabilities = [0.0f64; 2];
        for (slot, outcome) in Outcome::ALL.into_iter().enumerate() {
            let model = self.registry.load(dir, therapy, outcome)?;
            let row = adapt(patient, therapy)?;
            probabilities[slot] = score(&model, &row)?;
            debug!(
                "{therapy}/{outcome}: p = {:.4}",
                probabilities[slot]
            );
        }
        Ok(TherapyScores {
            therapy,
            pasi75: probabilities[0],
            pasi90: probabilities[1],
        })
    }
}
