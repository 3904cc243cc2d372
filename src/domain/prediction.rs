//! Prediction result types.

use crate::domain::ConsensusCurve;

/// Outcome of one recurrence-free survival prediction.
///
/// Held in memory for display only; predictions are never persisted.
#[derive(Debug, Clone)]
pub struct RfsPrediction {
    /// Ensemble-averaged survival curve on months 0..=36
    pub curve: ConsensusCurve,

    /// Version string of the model artifact that produced the curve
    pub artifact_version: String,

    /// Timestamp of the prediction
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl RfsPrediction {
    #[must_use]
    pub fn new(curve: ConsensusCurve, artifact_version: impl Into<String>) -> Self {
        Self {
            curve,
            artifact_version: artifact_version.into(),
            created_at: chrono::Utc::now(),
        }
    }

    /// Predicted 3-year RFS as a percentage.
    #[must_use]
    pub fn rfs_percent(&self) -> f64 {
        self.curve.three_year_rfs_percent()
    }

    /// Headline text shown to the user.
    #[must_use]
    pub fn headline(&self) -> String {
        format!("Predicted 3-year RFS: {:.1}%", self.rfs_percent())
    }
}
