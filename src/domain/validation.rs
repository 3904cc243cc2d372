//! Input validation: raw form text → `PatientRecord`.
//!
//! Numeric fields must parse (surrounding whitespace is ignored) and be
//! finite. Only sign checks are applied; there are no clinical upper bounds.
//! Fields are checked in form order and the first failure is returned.

use std::num::IntErrorKind;

use crate::domain::constraints::check_surgical_combination;
use crate::domain::patient::bmi;
use crate::domain::{CategoricalField, Category, PatientRecord, RawPatientInput};
use crate::RfsError;

impl RawPatientInput {
    /// Validate every field and derive BMI.
    ///
    /// # Errors
    /// Returns `NotANumber`, `OutOfRange`, `UnknownCategory` or
    /// `InvalidCombination` for the first offending field.
    pub fn validate(&self) -> Result<PatientRecord, RfsError> {
        let age = parse_age(&self.age)?;
        let sex = categorical(CategoricalField::Sex, &self.sex)?;
        let height_cm = parse_positive("height", &self.height)?;
        let weight_kg = parse_positive("weight", &self.weight)?;
        let cea = parse_non_negative("cea", &self.cea)?;
        let ca19_9 = parse_non_negative("ca19_9", &self.ca19_9)?;
        let pre_chemo = categorical(CategoricalField::PreChemo, &self.pre_chemo)?;
        let asa_ps = categorical(CategoricalField::AsaPs, &self.asa_ps)?;
        let tumor_location = categorical(CategoricalField::TumorLocation, &self.tumor_location)?;
        let surgical_procedure =
            categorical(CategoricalField::SurgicalProcedure, &self.surgical_procedure)?;
        let reconstruction = categorical(CategoricalField::Reconstruction, &self.reconstruction)?;
        let macro_type = categorical(CategoricalField::MacroType, &self.macro_type)?;
        let diameter = categorical(CategoricalField::Diameter, &self.diameter)?;
        let histology = categorical(CategoricalField::Histology, &self.histology)?;
        let p_t = categorical(CategoricalField::PathologicalT, &self.p_t)?;
        let p_n = categorical(CategoricalField::PathologicalN, &self.p_n)?;
        let vascular_invasion =
            categorical(CategoricalField::VascularInvasion, &self.vascular_invasion)?;

        check_surgical_combination(tumor_location, surgical_procedure, reconstruction)?;

        Ok(PatientRecord {
            age,
            sex,
            height_cm,
            weight_kg,
            bmi: bmi(height_cm, weight_kg),
            cea,
            ca19_9,
            pre_chemo,
            asa_ps,
            tumor_location,
            surgical_procedure,
            reconstruction,
            macro_type,
            diameter,
            histology,
            p_t,
            p_n,
            vascular_invasion,
        })
    }

    /// BMI preview for the form; `None` until height and weight both parse.
    #[must_use]
    pub fn bmi_preview(&self) -> Option<f64> {
        bmi_preview(&self.height, &self.weight)
    }
}

/// BMI from raw height/weight text, if both are valid positive numbers.
#[must_use]
pub fn bmi_preview(height: &str, weight: &str) -> Option<f64> {
    let height_cm = parse_positive("height", height).ok()?;
    let weight_kg = parse_positive("weight", weight).ok()?;
    Some(bmi(height_cm, weight_kg))
}

fn categorical(field: CategoricalField, raw: &str) -> Result<Category, RfsError> {
    field.encode(raw)
}

fn parse_real(field: &'static str, raw: &str) -> Result<f64, RfsError> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(RfsError::NotANumber {
            field,
            value: raw.to_string(),
        }),
    }
}

fn parse_positive(field: &'static str, raw: &str) -> Result<f64, RfsError> {
    let value = parse_real(field, raw)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(RfsError::OutOfRange {
            field,
            value: raw.trim().to_string(),
            expected: "a value greater than 0",
        })
    }
}

fn parse_non_negative(field: &'static str, raw: &str) -> Result<f64, RfsError> {
    let value = parse_real(field, raw)?;
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(RfsError::OutOfRange {
            field,
            value: raw.trim().to_string(),
            expected: "a value of 0 or more",
        })
    }
}

fn parse_age(raw: &str) -> Result<u32, RfsError> {
    let out_of_range = || RfsError::OutOfRange {
        field: "age",
        value: raw.trim().to_string(),
        expected: "a positive whole number of years",
    };

    match raw.trim().parse::<u32>() {
        Ok(age) if age > 0 => Ok(age),
        Ok(_) => Err(out_of_range()),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => Err(out_of_range()),
            // A leading minus on an otherwise valid integer is a sign error.
            _ if is_negative_integer(raw.trim()) => Err(out_of_range()),
            _ => Err(RfsError::NotANumber {
                field: "age",
                value: raw.to_string(),
            }),
        },
    }
}

fn is_negative_integer(text: &str) -> bool {
    text.strip_prefix('-')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}
