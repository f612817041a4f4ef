//! Per-therapy model manifests.
//!
//! Each therapy bundle directory carries a `metadata.json` written by the
//! training pipeline, mapping outcome identifiers to artifact paths. Older
//! manifests store a bare path string per outcome; newer ones store an object
//! with a `path` field plus trainer-side metadata this crate ignores. Both
//! forms must keep parsing.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::CompareError;
use crate::types::{Outcome, TherapyId};

pub const MANIFEST_FILE: &str = "metadata.json";

#[derive(Debug, Deserialize)]
pub struct ModelManifest {
    pub models: HashMap<String, ManifestEntry>,
}

/// One manifest entry, in either of its two historical on-disk forms.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ManifestEntry {
    Path(String),
    Detailed { path: String },
}

impl ManifestEntry {
    pub fn path(&self) -> &str {
        match self {
            ManifestEntry::Path(path) => path,
            ManifestEntry::Detailed { path } => path,
        }
    }
}

impl ModelManifest {
    /// The stored artifact path for `outcome`, if the manifest lists one.
    pub fn artifact_path(&self, outcome: Outcome) -> Option<&str> {
        self.models.get(outcome.key()).map(ManifestEntry::path)
    }
}

/// Reads and parses the manifest for one therapy bundle directory.
pub fn load_manifest(therapy_dir: &Path, therapy: TherapyId) -> Result<ModelManifest, CompareError> {
    let path = therapy_dir.join(MANIFEST_FILE);
    let raw = fs::read_to_string(&path).map_err(|err| {
        if err.kind() == io::ErrorKind::NotFound {
            CompareError::ManifestNotFound {
                therapy,
                path: path.clone(),
            }
        } else {
            CompareError::ManifestMalformed {
                therapy,
                path: path.clone(),
                reason: err.to_string(),
            }
        }
    })?;
    serde_json::from_str(&raw).map_err(|err| CompareError::ManifestMalformed {
        therapy,
        path,
        reason: err.to_string(),
    })
}

/// Normalizes a stored artifact path for the current platform and anchors
/// relative entries.
///
/// Bundles are produced on Windows, so separators are normalized first. The
/// training pipeline records paths relative to the deployment root (the
/// directory holding the bundle directories), hence relative entries resolve
/// against the parent of `therapy_dir`.
pub fn resolve_artifact_path(therapy_dir: &Path, stored: &str) -> PathBuf {
    let normalized = PathBuf::from(stored.replace('\\', "/"));
    if normalized.is_absolute() {
        return normalized;
    }
    match therapy_dir.parent() {
        Some(root) => root.join(normalized),
        None => normalized,
    }
}
