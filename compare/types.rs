// ========================================================================================
//                             High-Level Data Contracts
// ========================================================================================

// This file is ONLY for types that are SHARED BETWEEN FILES, not types that only are used
// in one file.

use std::fmt;

use crate::error::CompareError;

/// The three biologic therapies under comparison, in canonical order.
///
/// The order is load-bearing: the orchestrator iterates it when scoring and
/// when breaking ties for the winning therapy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TherapyId {
    Adalimumab,
    Ixekizumab,
    Bimekizumab,
}

impl TherapyId {
    pub const ALL: [TherapyId; 3] = [
        TherapyId::Adalimumab,
        TherapyId::Ixekizumab,
        TherapyId::Bimekizumab,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TherapyId::Adalimumab => "Adalimumab",
            TherapyId::Ixekizumab => "Ixekizumab",
            TherapyId::Bimekizumab => "Bimekizumab",
        }
    }
}

impl fmt::Display for TherapyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The two binary response endpoints every bundle must provide a model for,
/// both at the fixed week-16 horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Pasi75Week16,
    Pasi90Week16,
}

impl Outcome {
    pub const ALL: [Outcome; 2] = [Outcome::Pasi75Week16, Outcome::Pasi90Week16];

    /// The endpoint therapies are ranked by. PASI75 is reported but never
    /// drives the ranking.
    pub const PRIMARY: Outcome = Outcome::Pasi90Week16;

    /// Key under which the training pipeline registers this endpoint in
    /// `metadata.json`.
    pub fn key(&self) -> &'static str {
        match self {
            Outcome::Pasi75Week16 => "PASI75_w16",
            Outcome::Pasi90Week16 => "PASI90_w16",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Biological sex, recorded with the exact labels the models were trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Categorical label as it appears in every therapy's training extract.
    pub fn label(&self) -> &'static str {
        match self {
            Sex::Male => "Varón",
            Sex::Female => "Mujer",
        }
    }
}

/// One patient's canonical covariates, gathered once per comparison request.
///
/// `new` enforces the recognized input ranges; the struct is plain-old-data
/// beyond that and never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientRecord {
    /// Baseline PASI score, 0–80.
    pub baseline_pasi: f64,
    /// Age in whole years, 18–100.
    pub age: i64,
    /// Body-mass index, 15–60.
    pub bmi: f64,
    pub sex: Sex,
    /// Concomitant psoriatic arthritis.
    pub arthritis: bool,
    /// Number of prior systemic/biologic treatments, 0–20.
    pub prior_treatments: i64,
}

impl PatientRecord {
    pub fn new(
        baseline_pasi: f64,
        age: i64,
        bmi: f64,
        sex: Sex,
        arthritis: bool,
        prior_treatments: i64,
    ) -> Result<Self, CompareError> {
        check_f64_range("baseline PASI", baseline_pasi, 0.0, 80.0)?;
        check_i64_range("age", age, 18, 100)?;
        check_f64_range("BMI", bmi, 15.0, 60.0)?;
        check_i64_range("prior treatments", prior_treatments, 0, 20)?;
        Ok(PatientRecord {
            baseline_pasi,
            age,
            bmi,
            sex,
            arthritis,
            prior_treatments,
        })
    }
}

fn check_f64_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), CompareError> {
    // NaN fails both comparisons and is rejected here too.
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(CompareError::InvalidAttributeValue {
            field: field.to_string(),
            reason: format!("{value} is outside the recognized range [{min}, {max}]"),
        })
    }
}

fn check_i64_range(field: &str, value: i64, min: i64, max: i64) -> Result<(), CompareError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(CompareError::InvalidAttributeValue {
            field: field.to_string(),
            reason: format!("{value} is outside the recognized range [{min}, {max}]"),
        })
    }
}

/// A single cell of a therapy-specific feature row.
///
/// Labels stay labels until scoring time; the classifier artifact owns the
/// category-to-ordinal mapping fixed at training.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Label(String),
    Int(i64),
    Float(f64),
}

/// One therapy's single-row feature table: named columns in the order the
/// training extract listed them, carrying the therapy id so downstream
/// failures can name their origin.
#[derive(Debug, Clone, PartialEq)]
pub struct TherapyFeatureRow {
    therapy: TherapyId,
    columns: Vec<(String, FeatureValue)>,
}

impl TherapyFeatureRow {
    pub fn new(therapy: TherapyId) -> Self {
        TherapyFeatureRow {
            therapy,
            columns: Vec::new(),
        }
    }

    pub fn therapy(&self) -> TherapyId {
        self.therapy
    }

    pub fn push(&mut self, column: impl Into<String>, value: FeatureValue) {
        self.columns.push((column.into(), value));
    }

    pub fn get(&self, column: &str) -> Option<&FeatureValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Per-therapy pair of response probabilities.
#[derive(Debug, Clone, PartialEq)]
pub struct TherapyScores {
    pub therapy: TherapyId,
    pub pasi75: f64,
    pub pasi90: f64,
}

/// The full outcome of one comparison: all six probabilities plus the therapy
/// with the highest PASI90 probability.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    /// One entry per therapy, in canonical order.
    pub scores: [TherapyScores; 3],
    pub best: TherapyId,
}

impl ComparisonResult {
    pub fn probability(&self, therapy: TherapyId, outcome: Outcome) -> Option<f64> {
        self.scores
            .iter()
            .find(|s| s.therapy == therapy)
            .map(|s| match outcome {
                Outcome::Pasi75Week16 => s.pasi75,
                Outcome::Pasi90Week16 => s.pasi90,
            })
    }
}
