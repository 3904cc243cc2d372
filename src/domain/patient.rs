//! Patient record types for gastric cancer recurrence prediction.
//!
//! `RawPatientInput` is what the form (or a JSON file) supplies: every field
//! as text. `PatientRecord` is the validated, typed counterpart produced by
//! [`RawPatientInput::validate`](crate::domain::RawPatientInput::validate).

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::domain::Category;

/// Raw patient input, one string per form field.
///
/// Missing keys deserialize to empty strings and are rejected by validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPatientInput {
    /// Age in whole years
    pub age: String,
    pub sex: String,
    /// Height in cm
    pub height: String,
    /// Weight in kg
    pub weight: String,
    /// CEA in ng/mL
    pub cea: String,
    /// CA19-9 in U/mL
    pub ca19_9: String,
    pub pre_chemo: String,
    pub asa_ps: String,
    pub tumor_location: String,
    pub surgical_procedure: String,
    pub reconstruction: String,
    pub macro_type: String,
    pub diameter: String,
    pub histology: String,
    pub p_t: String,
    pub p_n: String,
    pub vascular_invasion: String,
}

impl Zeroize for RawPatientInput {
    fn zeroize(&mut self) {
        for field in [
            &mut self.age,
            &mut self.sex,
            &mut self.height,
            &mut self.weight,
            &mut self.cea,
            &mut self.ca19_9,
            &mut self.pre_chemo,
            &mut self.asa_ps,
            &mut self.tumor_location,
            &mut self.surgical_procedure,
            &mut self.reconstruction,
            &mut self.macro_type,
            &mut self.diameter,
            &mut self.histology,
            &mut self.p_t,
            &mut self.p_n,
            &mut self.vascular_invasion,
        ] {
            field.zeroize();
        }
    }
}

/// A fully validated patient record.
///
/// Every categorical field holds a [`Category`] from its encoding table and the
/// surgical fields satisfy the cross-field rules. BMI is derived from height
/// and weight during validation.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct PatientRecord {
    pub age: u32,
    pub sex: Category,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub bmi: f64,
    pub cea: f64,
    pub ca19_9: f64,
    pub pre_chemo: Category,
    pub asa_ps: Category,
    pub tumor_location: Category,
    pub surgical_procedure: Category,
    pub reconstruction: Category,
    pub macro_type: Category,
    pub diameter: Category,
    pub histology: Category,
    pub p_t: Category,
    pub p_n: Category,
    pub vascular_invasion: Category,
}

/// Body mass index from height (cm) and weight (kg).
#[must_use]
pub fn bmi(height_cm: f64, weight_kg: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}
