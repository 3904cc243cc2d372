//! Categorical encoding tables.
//!
//! Each categorical covariate maps its human-readable labels to the integer
//! codes used when the survival ensemble was trained. Labels are listed in the
//! order the patient form presents them.

use std::fmt;

use crate::RfsError;

/// Categorical covariates collected by the patient form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoricalField {
    Sex,
    PreChemo,
    AsaPs,
    TumorLocation,
    SurgicalProcedure,
    Reconstruction,
    MacroType,
    Diameter,
    Histology,
    PathologicalT,
    PathologicalN,
    VascularInvasion,
}

impl CategoricalField {
    /// All categorical fields in form order.
    pub const ALL: [Self; 12] = [
        Self::Sex,
        Self::PreChemo,
        Self::AsaPs,
        Self::TumorLocation,
        Self::SurgicalProcedure,
        Self::Reconstruction,
        Self::MacroType,
        Self::Diameter,
        Self::Histology,
        Self::PathologicalT,
        Self::PathologicalN,
        Self::VascularInvasion,
    ];

    /// Field name used in error messages and raw input keys.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.table().field
    }

    /// Human-readable form label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Sex => "Sex",
            Self::PreChemo => "Neoadjuvant chemo",
            Self::AsaPs => "ASA-PS",
            Self::TumorLocation => "Tumor location",
            Self::SurgicalProcedure => "Surgical procedure",
            Self::Reconstruction => "Reconstruction",
            Self::MacroType => "Macroscopic type",
            Self::Diameter => "Tumor diameter",
            Self::Histology => "Histology",
            Self::PathologicalT => "Pathological T",
            Self::PathologicalN => "Pathological N",
            Self::VascularInvasion => "Vascular invasion (v)",
        }
    }

    /// The encoding table for this field.
    #[must_use]
    pub fn table(self) -> &'static EncodingTable {
        match self {
            Self::Sex => &SEX,
            Self::PreChemo => &PRE_CHEMO,
            Self::AsaPs => &ASA_PS,
            Self::TumorLocation => &TUMOR_LOCATION,
            Self::SurgicalProcedure => &SURGICAL_PROCEDURE,
            Self::Reconstruction => &RECONSTRUCTION,
            Self::MacroType => &MACRO_TYPE,
            Self::Diameter => &DIAMETER,
            Self::Histology => &HISTOLOGY,
            Self::PathologicalT => &PATHOLOGICAL_T,
            Self::PathologicalN => &PATHOLOGICAL_N,
            Self::VascularInvasion => &VASCULAR_INVASION,
        }
    }

    /// Encode a label for this field.
    ///
    /// # Errors
    /// Returns `RfsError::UnknownCategory` if the label is not in the table.
    pub fn encode(self, label: &str) -> Result<Category, RfsError> {
        self.table()
            .entry(label)
            .map(|(label, code)| Category {
                field: self,
                label,
                code,
            })
            .ok_or_else(|| RfsError::UnknownCategory {
                field: self.name(),
                value: label.to_string(),
            })
    }
}

impl fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed label/code mapping for one categorical field.
#[derive(Debug)]
pub struct EncodingTable {
    field: &'static str,
    entries: &'static [(&'static str, u8)],
}

impl EncodingTable {
    /// Valid labels in presentation order.
    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(label, _)| *label)
    }

    /// Integer code for a label, if present.
    #[must_use]
    pub fn code(&self, label: &str) -> Option<u8> {
        self.entry(label).map(|(_, code)| code)
    }

    /// Reverse lookup: label for a code, if present.
    #[must_use]
    pub fn label(&self, code: u8) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(_, c)| *c == code)
            .map(|(label, _)| *label)
    }

    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.entry(label).is_some()
    }

    fn entry(&self, label: &str) -> Option<(&'static str, u8)> {
        self.entries.iter().copied().find(|(l, _)| *l == label)
    }
}

/// A validated categorical value together with its training-time code.
///
/// Only obtainable through [`CategoricalField::encode`], so holding one proves
/// the label belongs to its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    field: CategoricalField,
    label: &'static str,
    code: u8,
}

impl Category {
    #[must_use]
    pub fn field(&self) -> CategoricalField {
        self.field
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }

    #[must_use]
    pub fn code(&self) -> u8 {
        self.code
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label)
    }
}

pub static SEX: EncodingTable = EncodingTable {
    field: "sex",
    entries: &[("Male", 1), ("Female", 0)],
};

pub static PRE_CHEMO: EncodingTable = EncodingTable {
    field: "pre_chemo",
    entries: &[("no", 0), ("yes", 1)],
};

pub static ASA_PS: EncodingTable = EncodingTable {
    field: "asa_ps",
    entries: &[("1", 0), ("2", 1), ("3-4", 2)],
};

pub static TUMOR_LOCATION: EncodingTable = EncodingTable {
    field: "tumor_location",
    entries: &[("EG", 0), ("U", 3), ("M", 2), ("L", 1)],
};

pub static SURGICAL_PROCEDURE: EncodingTable = EncodingTable {
    field: "surgical_procedure",
    entries: &[("DG", 0), ("TG", 2), ("PG", 1)],
};

pub static RECONSTRUCTION: EncodingTable = EncodingTable {
    field: "reconstruction",
    entries: &[("B-1", 0), ("B-2", 1), ("R-Y", 2), ("Other", 3)],
};

pub static MACRO_TYPE: EncodingTable = EncodingTable {
    field: "macro_type",
    entries: &[
        ("Type 0", 0),
        ("Type 1/2/3/5", 2),
        ("Type 4", 3),
        ("Unknown", 1),
    ],
};

pub static DIAMETER: EncodingTable = EncodingTable {
    field: "diameter",
    entries: &[("<80mm", 0), ("≥80mm", 2), ("Unknown", 1)],
};

pub static HISTOLOGY: EncodingTable = EncodingTable {
    field: "histology",
    entries: &[("pap/tub", 0), ("por/sig/muc", 1)],
};

pub static PATHOLOGICAL_T: EncodingTable = EncodingTable {
    field: "p_t",
    entries: &[("pT0", 0), ("pT1", 1), ("pT2", 2), ("pT3", 3), ("pT4", 4)],
};

pub static PATHOLOGICAL_N: EncodingTable = EncodingTable {
    field: "p_n",
    entries: &[("pN0", 0), ("pN1", 1), ("pN2", 2), ("pN3", 3)],
};

pub static VASCULAR_INVASION: EncodingTable = EncodingTable {
    field: "vascular_invasion",
    entries: &[("Negative", 0), ("Positive", 2), ("Unknown", 1)],
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tables_have_unique_labels_and_codes() {
        for field in CategoricalField::ALL {
            let table = field.table();
            let labels: HashSet<_> = table.labels().collect();
            let codes: HashSet<_> = table.entries.iter().map(|(_, c)| *c).collect();
            assert_eq!(labels.len(), table.entries.len(), "{field}: duplicate label");
            assert_eq!(codes.len(), table.entries.len(), "{field}: duplicate code");
        }
    }

    #[test]
    fn test_training_codes() {
        assert_eq!(SURGICAL_PROCEDURE.code("TG"), Some(2));
        assert_eq!(SURGICAL_PROCEDURE.code("PG"), Some(1));
        assert_eq!(TUMOR_LOCATION.code("U"), Some(3));
        assert_eq!(MACRO_TYPE.code("Unknown"), Some(1));
        assert_eq!(DIAMETER.code("≥80mm"), Some(2));
        assert_eq!(SEX.code("Male"), Some(1));
        assert_eq!(VASCULAR_INVASION.label(2), Some("Positive"));
    }

    #[test]
    fn test_encode_unknown_label() {
        let err = CategoricalField::Reconstruction
            .encode("Billroth")
            .expect_err("must fail");
        assert!(matches!(
            err,
            RfsError::UnknownCategory { field: "reconstruction", .. }
        ));

        // Lookups are exact: no case folding or trimming.
        assert!(CategoricalField::Sex.encode("male").is_err());
        assert!(CategoricalField::AsaPs.encode(" 1").is_err());
    }

    #[test]
    fn test_encode_returns_category() {
        let cat = CategoricalField::PathologicalT.encode("pT3").expect("valid");
        assert_eq!(cat.code(), 3);
        assert_eq!(cat.label(), "pT3");
        assert_eq!(cat.field(), CategoricalField::PathologicalT);
    }
}
