//! Survival model port: Trait for one member of the prediction ensemble.
//!
//! The ensemble treats every member uniformly. Whatever a model's internal
//! representation (a forest, a Cox model, a micro-ensemble), it only has to
//! turn one encoded feature row into one or more survival functions.

use thiserror::Error;

use crate::domain::{CurveError, FeatureVector, SurvivalCurve};

/// Errors raised by a model while predicting.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model {model}: {reason}")]
    Prediction { model: String, reason: String },

    #[error("model produced an invalid survival curve: {0}")]
    Curve(#[from] CurveError),
}

/// Trait for survival models.
///
/// Implementations must be read-only during prediction (`&self`) so a loaded
/// ensemble can be shared across threads without locks.
pub trait SurvivalModel: Send + Sync {
    /// Identifier used in logs and error messages.
    fn id(&self) -> &str;

    /// Predict survival functions for a single feature row.
    ///
    /// Returns one or more curves; an empty vector means the model has no
    /// prediction for this row.
    ///
    /// # Errors
    /// Returns `ModelError` if the model cannot evaluate the row.
    fn predict_survival(&self, features: &FeatureVector) -> Result<Vec<SurvivalCurve>, ModelError>;
}
