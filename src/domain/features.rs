//! Feature contract and feature-vector construction.
//!
//! The ensemble was trained on 16 columns in a fixed order. That order lives
//! in exactly one place, [`FEATURE_CONTRACT`]; `FeatureVector::from_record`
//! walks it, and the artifact loader refuses ensembles whose manifest
//! declares anything else.

use crate::domain::PatientRecord;

/// Number of model input columns.
pub const FEATURE_COUNT: usize = 16;

/// One model input column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    PathologicalN,
    PathologicalT,
    SurgicalMethod,
    Age,
    Cea,
    Ca19_9,
    MacroType,
    Bmi,
    Reconstruction,
    VascularInvasion,
    AsaPs,
    Sex,
    DiameterOver80mm,
    Histology,
    TumorLocation,
    PreChemo,
}

impl Feature {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::PathologicalN => "p_n",
            Self::PathologicalT => "p_t",
            Self::SurgicalMethod => "surgical_method",
            Self::Age => "age",
            Self::Cea => "cea",
            Self::Ca19_9 => "ca19_9",
            Self::MacroType => "macro_type",
            Self::Bmi => "bmi",
            Self::Reconstruction => "reconstruction",
            Self::VascularInvasion => "vascular_invasion",
            Self::AsaPs => "asa_ps",
            Self::Sex => "sex",
            Self::DiameterOver80mm => "diameter_over_80mm",
            Self::Histology => "histology",
            Self::TumorLocation => "tumor_location",
            Self::PreChemo => "pre_chemo",
        }
    }

    /// Column name in the training data frame.
    #[must_use]
    pub fn training_column(self) -> &'static str {
        match self {
            Self::PathologicalN => "p_n_2",
            Self::PathologicalT => "p_t_2",
            Self::SurgicalMethod => "surgical_method2",
            Self::Age => "age",
            Self::Cea => "cea_2",
            Self::Ca19_9 => "ca19_9_2",
            Self::MacroType => "macro_cat",
            Self::Bmi => "bmi",
            Self::Reconstruction => "reconstruction2",
            Self::VascularInvasion => "v_cat",
            Self::AsaPs => "asa_ps_2",
            Self::Sex => "sex",
            Self::DiameterOver80mm => "diameter_o80",
            Self::Histology => "hystological_cat",
            Self::TumorLocation => "location_tumor2",
            Self::PreChemo => "pre_chemo2",
        }
    }
}

/// Versioned column contract shared with the model ensemble.
#[derive(Debug)]
pub struct FeatureContract {
    pub version: &'static str,
    pub columns: [Feature; FEATURE_COUNT],
}

impl FeatureContract {
    /// Training-time column names in contract order.
    pub fn training_columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|f| f.training_column())
    }

    /// Position of a feature in the vector.
    #[must_use]
    pub fn index_of(&self, feature: Feature) -> usize {
        self.columns
            .iter()
            .position(|f| *f == feature)
            .unwrap_or_else(|| unreachable!("every feature is in the contract"))
    }

    /// True if `version` and `columns` describe this contract exactly.
    #[must_use]
    pub fn matches<S: AsRef<str>>(&self, version: &str, columns: &[S]) -> bool {
        version == self.version
            && columns.len() == FEATURE_COUNT
            && columns
                .iter()
                .zip(self.training_columns())
                .all(|(given, expected)| given.as_ref() == expected)
    }
}

/// Column order used at training. Changing this requires retraining.
pub static FEATURE_CONTRACT: FeatureContract = FeatureContract {
    version: "gastric-rfs-features/v1",
    columns: [
        Feature::PathologicalN,
        Feature::PathologicalT,
        Feature::SurgicalMethod,
        Feature::Age,
        Feature::Cea,
        Feature::Ca19_9,
        Feature::MacroType,
        Feature::Bmi,
        Feature::Reconstruction,
        Feature::VascularInvasion,
        Feature::AsaPs,
        Feature::Sex,
        Feature::DiameterOver80mm,
        Feature::Histology,
        Feature::TumorLocation,
        Feature::PreChemo,
    ],
};

/// A single encoded model input row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Encode a validated record in contract order.
    #[must_use]
    pub fn from_record(record: &PatientRecord) -> Self {
        let mut values = [0.0; FEATURE_COUNT];
        for (slot, feature) in values.iter_mut().zip(FEATURE_CONTRACT.columns) {
            *slot = value_of(record, feature);
        }
        Self { values }
    }

    /// Wrap an already-encoded row (contract order).
    #[must_use]
    pub fn from_encoded(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn get(&self, feature: Feature) -> f64 {
        self.values[FEATURE_CONTRACT.index_of(feature)]
    }
}

fn value_of(record: &PatientRecord, feature: Feature) -> f64 {
    match feature {
        Feature::PathologicalN => f64::from(record.p_n.code()),
        Feature::PathologicalT => f64::from(record.p_t.code()),
        Feature::SurgicalMethod => f64::from(record.surgical_procedure.code()),
        Feature::Age => f64::from(record.age),
        Feature::Cea => record.cea,
        Feature::Ca19_9 => record.ca19_9,
        Feature::MacroType => f64::from(record.macro_type.code()),
        Feature::Bmi => record.bmi,
        Feature::Reconstruction => f64::from(record.reconstruction.code()),
        Feature::VascularInvasion => f64::from(record.vascular_invasion.code()),
        Feature::AsaPs => f64::from(record.asa_ps.code()),
        Feature::Sex => f64::from(record.sex.code()),
        Feature::DiameterOver80mm => f64::from(record.diameter.code()),
        Feature::Histology => f64::from(record.histology.code()),
        Feature::TumorLocation => f64::from(record.tumor_location.code()),
        Feature::PreChemo => f64::from(record.pre_chemo.code()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawPatientInput;

    fn raw() -> RawPatientInput {
        RawPatientInput {
            age: "72".into(),
            sex: "Female".into(),
            height: "160".into(),
            weight: "64".into(),
            cea: "4.5".into(),
            ca19_9: "38".into(),
            pre_chemo: "yes".into(),
            asa_ps: "3-4".into(),
            tumor_location: "U".into(),
            surgical_procedure: "TG".into(),
            reconstruction: "R-Y".into(),
            macro_type: "Type 4".into(),
            diameter: "≥80mm".into(),
            histology: "por/sig/muc".into(),
            p_t: "pT4".into(),
            p_n: "pN3".into(),
            vascular_invasion: "Unknown".into(),
        }
    }

    #[test]
    fn test_contract_order_is_frozen() {
        let names: Vec<_> = FEATURE_CONTRACT.columns.iter().map(|f| f.name()).collect();
        assert_eq!(
            names,
            [
                "p_n",
                "p_t",
                "surgical_method",
                "age",
                "cea",
                "ca19_9",
                "macro_type",
                "bmi",
                "reconstruction",
                "vascular_invasion",
                "asa_ps",
                "sex",
                "diameter_over_80mm",
                "histology",
                "tumor_location",
                "pre_chemo",
            ]
        );

        let training: Vec<_> = FEATURE_CONTRACT.training_columns().collect();
        assert_eq!(
            training,
            [
                "p_n_2",
                "p_t_2",
                "surgical_method2",
                "age",
                "cea_2",
                "ca19_9_2",
                "macro_cat",
                "bmi",
                "reconstruction2",
                "v_cat",
                "asa_ps_2",
                "sex",
                "diameter_o80",
                "hystological_cat",
                "location_tumor2",
                "pre_chemo2",
            ]
        );
    }

    #[test]
    fn test_from_record_layout() {
        let record = raw().validate().expect("Should validate");
        let v = FeatureVector::from_record(&record);
        let bmi = 64.0 / (1.6 * 1.6);

        let expected = [
            3.0, 4.0, 2.0, 72.0, 4.5, 38.0, 3.0, bmi, 2.0, 1.0, 2.0, 0.0, 2.0, 1.0, 3.0, 1.0,
        ];
        assert_eq!(v.as_slice().len(), FEATURE_COUNT);
        for (i, (got, want)) in v.as_slice().iter().zip(expected).enumerate() {
            assert!((got - want).abs() < 1e-12, "column {i}: {got} != {want}");
        }
    }

    #[test]
    fn test_get_by_feature() {
        let record = raw().validate().expect("Should validate");
        let v = FeatureVector::from_record(&record);
        assert_eq!(v.get(Feature::Age), 72.0);
        assert_eq!(v.get(Feature::TumorLocation), 3.0);
        assert_eq!(v.get(Feature::PreChemo), 1.0);
    }

    #[test]
    fn test_order_invariant_across_inputs() {
        // Varying one input moves exactly its own column.
        let base = FeatureVector::from_record(&raw().validate().unwrap());

        let cases: [(fn(&mut RawPatientInput), Feature, f64); 17] = [
            (|r| r.age = "41".into(), Feature::Age, 41.0),
            (|r| r.sex = "Male".into(), Feature::Sex, 1.0),
            (|r| r.height = "170".into(), Feature::Bmi, 64.0 / (1.7 * 1.7)),
            (|r| r.weight = "80".into(), Feature::Bmi, 80.0 / (1.6 * 1.6)),
            (|r| r.cea = "0".into(), Feature::Cea, 0.0),
            (|r| r.ca19_9 = "5".into(), Feature::Ca19_9, 5.0),
            (|r| r.pre_chemo = "no".into(), Feature::PreChemo, 0.0),
            (|r| r.asa_ps = "1".into(), Feature::AsaPs, 0.0),
            (|r| r.tumor_location = "M".into(), Feature::TumorLocation, 2.0),
            (|r| r.surgical_procedure = "DG".into(), Feature::SurgicalMethod, 0.0),
            (|r| r.reconstruction = "Other".into(), Feature::Reconstruction, 3.0),
            (|r| r.macro_type = "Type 0".into(), Feature::MacroType, 0.0),
            (|r| r.diameter = "<80mm".into(), Feature::DiameterOver80mm, 0.0),
            (|r| r.histology = "pap/tub".into(), Feature::Histology, 0.0),
            (|r| r.p_t = "pT1".into(), Feature::PathologicalT, 1.0),
            (|r| r.p_n = "pN0".into(), Feature::PathologicalN, 0.0),
            (|r| r.vascular_invasion = "Negative".into(), Feature::VascularInvasion, 0.0),
        ];

        for (change, feature, want) in cases {
            let mut changed = raw();
            change(&mut changed);
            let v = FeatureVector::from_record(&changed.validate().unwrap());
            let column = FEATURE_CONTRACT.index_of(feature);
            for (i, (a, b)) in base.as_slice().iter().zip(v.as_slice()).enumerate() {
                if i == column {
                    assert!((b - want).abs() < 1e-12, "{}: {b} != {want}", feature.name());
                    assert_ne!(a, b, "{} did not move", feature.name());
                } else {
                    assert_eq!(a, b, "column {i} moved when changing {}", feature.name());
                }
            }
        }
    }

    #[test]
    fn test_contract_matches() {
        let cols: Vec<String> = FEATURE_CONTRACT.training_columns().map(String::from).collect();
        assert!(FEATURE_CONTRACT.matches(FEATURE_CONTRACT.version, &cols));
        assert!(!FEATURE_CONTRACT.matches("gastric-rfs-features/v0", &cols));

        let mut swapped = cols.clone();
        swapped.swap(0, 1);
        assert!(!FEATURE_CONTRACT.matches(FEATURE_CONTRACT.version, &swapped));
        assert!(!FEATURE_CONTRACT.matches(FEATURE_CONTRACT.version, &cols[..15]));
    }
}
