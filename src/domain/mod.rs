//! Domain layer: Core clinical types and logic.
//!
//! Pure Rust types with no I/O: encoding tables, validation, the feature
//! contract and survival-curve arithmetic.

pub mod constraints;
mod encoding;
mod features;
mod patient;
mod prediction;
mod survival;
mod validation;

pub use constraints::{allowed_procedures, allowed_reconstructions};
pub use encoding::{CategoricalField, Category, EncodingTable};
pub use features::{Feature, FeatureContract, FeatureVector, FEATURE_CONTRACT, FEATURE_COUNT};
pub use patient::{bmi, PatientRecord, RawPatientInput};
pub use prediction::RfsPrediction;
pub use survival::{
    time_grid, ConsensusCurve, CurveError, SurvivalCurve, GRID_POINTS, HORIZON_MONTHS,
};
pub use validation::bmi_preview;
