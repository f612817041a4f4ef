//! # Feature Adaptation Module
//!
//! Maps one canonical `PatientRecord` onto each therapy's historical training
//! schema. The three cohorts were curated independently, so the same clinical
//! attribute appears under a different column name, and sometimes a different
//! value type, per therapy. The mapping is data: one static table of field
//! specs per therapy, consumed by a single `adapt` routine.
//!
//! Column names are not configurable and must match the training extracts
//! byte for byte, accents and casing included.

use crate::error::CompareError;
use crate::types::{FeatureValue, PatientRecord, TherapyFeatureRow, TherapyId};

/// Disease duration is not collected by the form; the Ixekizumab model was
/// trained with this neutral value standing in whenever it is unknown.
pub const NEUTRAL_PSORIASIS_DURATION_YEARS: i64 = 15;

/// Where a therapy-specific column draws its value from.
#[derive(Debug, Clone, Copy)]
enum Source {
    /// Sex as the categorical training label ("Varón"/"Mujer").
    SexLabel,
    /// Age as a whole-year integer.
    AgeInt,
    /// Age as a float (the Bimekizumab extract auto-computed it).
    AgeFloat,
    /// Body-mass index.
    Bmi,
    /// Baseline PASI score.
    BaselinePasi,
    /// Psoriatic arthritis as a 0/1 indicator.
    Arthritis01,
    /// Count of prior systemic/biologic treatments.
    PriorTreatments,
    /// A fixed integer default for attributes the form does not collect.
    FixedInt(i64),
}

struct FieldSpec {
    column: &'static str,
    source: Source,
}

const ADALIMUMAB_FIELDS: &[FieldSpec] = &[
    FieldSpec { column: "Sexo", source: Source::SexLabel },
    FieldSpec { column: "EDAD", source: Source::AgeInt },
    FieldSpec { column: "IMC", source: Source::Bmi },
    FieldSpec { column: "PASI INICIAL ADA", source: Source::BaselinePasi },
    FieldSpec { column: "ARTRITIS", source: Source::Arthritis01 },
    FieldSpec { column: "N tratamientos previos", source: Source::PriorTreatments },
];

const IXEKIZUMAB_FIELDS: &[FieldSpec] = &[
    FieldSpec { column: "Sexo", source: Source::SexLabel },
    FieldSpec { column: "edad", source: Source::AgeInt },
    FieldSpec { column: "IMC", source: Source::Bmi },
    FieldSpec { column: "ARTRITIS PSORIASICA", source: Source::Arthritis01 },
    FieldSpec {
        column: "años con psoriasis",
        source: Source::FixedInt(NEUTRAL_PSORIASIS_DURATION_YEARS),
    },
    FieldSpec { column: "N biológicos previos", source: Source::PriorTreatments },
    FieldSpec { column: "PASI INICIAL IXE", source: Source::BaselinePasi },
];

const BIMEKIZUMAB_FIELDS: &[FieldSpec] = &[
    FieldSpec { column: "Sexo", source: Source::SexLabel },
    FieldSpec { column: "Edad (autocálculo)", source: Source::AgeFloat },
    FieldSpec { column: "IMC (autocálculo)", source: Source::Bmi },
    FieldSpec { column: "Artritis", source: Source::Arthritis01 },
    FieldSpec { column: "N biológicos previos", source: Source::PriorTreatments },
    FieldSpec { column: "PASI INICIO TTO", source: Source::BaselinePasi },
];

fn fields_for(therapy: TherapyId) -> &'static [FieldSpec] {
    match therapy {
        TherapyId::Adalimumab => ADALIMUMAB_FIELDS,
        TherapyId::Ixekizumab => IXEKIZUMAB_FIELDS,
        TherapyId::Bimekizumab => BIMEKIZUMAB_FIELDS,
    }
}

/// Produces the single-row feature table for one therapy.
///
/// Deterministic: the same record and therapy always yield the same row, in
/// the same column order.
pub fn adapt(patient: &PatientRecord, therapy: TherapyId) -> Result<TherapyFeatureRow, CompareError> {
    let mut row = TherapyFeatureRow::new(therapy);
    for spec in fields_for(therapy) {
        row.push(spec.column, resolve(patient, spec)?);
    }
    Ok(row)
}

fn resolve(patient: &PatientRecord, spec: &FieldSpec) -> Result<FeatureValue, CompareError> {
    let value = match spec.source {
        Source::SexLabel => FeatureValue::Label(patient.sex.label().to_string()),
        Source::AgeInt => FeatureValue::Int(patient.age),
        Source::AgeFloat => FeatureValue::Float(patient.age as f64),
        Source::Bmi => FeatureValue::Float(finite(spec.column, patient.bmi)?),
        Source::BaselinePasi => FeatureValue::Float(finite(spec.column, patient.baseline_pasi)?),
        Source::Arthritis01 => FeatureValue::Int(i64::from(patient.arthritis)),
        Source::PriorTreatments => FeatureValue::Int(patient.prior_treatments),
        Source::FixedInt(default) => FeatureValue::Int(default),
    };
    Ok(value)
}

fn finite(column: &str, value: f64) -> Result<f64, CompareError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CompareError::InvalidAttributeValue {
            field: column.to_string(),
            reason: format!("{value} is not a finite number"),
        })
    }
}
