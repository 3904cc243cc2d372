//! # gastric-rfs
//!
//! 3-year recurrence-free survival (RFS) calculator for patients after
//! gastric cancer surgery.
//!
//! Clinical inputs are validated and encoded into a fixed 16-column feature
//! row, every model in a pretrained survival ensemble predicts survival
//! functions for that row, and the functions are averaged on a monthly grid
//! (months 0-36) into one consensus curve. The headline figure is the
//! consensus survival probability at 36 months.
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Encoding tables, validation, feature contract, survival curves
//! - `ports`: The `SurvivalModel` trait the ensemble is built from
//! - `adapters`: Model artifact loading (random survival forests)
//! - `application`: Ensemble aggregation and the prediction use case
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use application::{ModelEnsemble, PredictionService};
pub use domain::{ConsensusCurve, FeatureVector, PatientRecord, RawPatientInput, RfsPrediction};

/// Result type for RFS operations
pub type Result<T> = std::result::Result<T, RfsError>;

/// Main error type for RFS operations
#[derive(Debug, thiserror::Error)]
pub enum RfsError {
    #[error("{field}: {value:?} is not a number")]
    NotANumber { field: &'static str, value: String },

    #[error("{field}: {value} is out of range (expected {expected})")]
    OutOfRange {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("{field}: unknown category {value:?}")]
    UnknownCategory { field: &'static str, value: String },

    #[error("Invalid combination of {first} and {second}: {detail}")]
    InvalidCombination {
        first: &'static str,
        second: &'static str,
        detail: String,
    },

    #[error("Prediction unavailable: {0}")]
    PredictionUnavailable(String),

    #[error("Model artifact error: {0}")]
    Artifact(#[from] adapters::ArtifactError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RfsError {
    /// True for errors caused by the patient input rather than the models.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::NotANumber { .. }
                | Self::OutOfRange { .. }
                | Self::UnknownCategory { .. }
                | Self::InvalidCombination { .. }
        )
    }
}
