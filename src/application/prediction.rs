//! Prediction service: Orchestrates one RFS prediction.
//!
//! This service coordinates:
//! - Input validation
//! - Feature encoding
//! - Ensemble aggregation

use std::sync::Arc;

use crate::application::ModelEnsemble;
use crate::domain::{FeatureVector, PatientRecord, RawPatientInput, RfsPrediction};
use crate::RfsError;

/// Service for running survival predictions against the loaded ensemble.
///
/// Stateless per call: the only shared state is the read-only ensemble.
#[derive(Debug, Clone)]
pub struct PredictionService {
    ensemble: Option<Arc<ModelEnsemble>>,
}

impl PredictionService {
    /// Create a service backed by a loaded ensemble.
    #[must_use]
    pub fn new(ensemble: Arc<ModelEnsemble>) -> Self {
        tracing::info!(
            "Prediction service ready (artifact={}, models={})",
            ensemble.version(),
            ensemble.len()
        );
        Self {
            ensemble: Some(ensemble),
        }
    }

    /// Create a service with no ensemble; every prediction fails.
    #[must_use]
    pub fn unloaded() -> Self {
        Self { ensemble: None }
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.ensemble.is_some()
    }

    /// Validate raw input and predict.
    ///
    /// # Errors
    /// Returns the validation error for invalid input, or
    /// `PredictionUnavailable` if the ensemble cannot produce a curve.
    pub fn predict(&self, raw: &RawPatientInput) -> Result<RfsPrediction, RfsError> {
        tracing::debug!("Step 1: Validating patient input...");
        let record = raw.validate().map_err(|e| {
            tracing::info!("Patient input rejected: {}", e);
            e
        })?;
        self.predict_record(&record)
    }

    /// Predict for an already validated record.
    ///
    /// # Errors
    /// Returns `PredictionUnavailable` if the ensemble cannot produce a curve.
    pub fn predict_record(&self, record: &PatientRecord) -> Result<RfsPrediction, RfsError> {
        tracing::debug!("Step 2: Encoding feature vector...");
        let features = FeatureVector::from_record(record);
        self.predict_features(&features)
    }

    /// Predict for an encoded feature row.
    ///
    /// # Errors
    /// Returns `PredictionUnavailable` if no ensemble is loaded or it cannot
    /// produce a curve.
    pub fn predict_features(&self, features: &FeatureVector) -> Result<RfsPrediction, RfsError> {
        let ensemble = self.ensemble.as_ref().ok_or_else(|| {
            RfsError::PredictionUnavailable("model ensemble is not loaded".to_string())
        })?;

        tracing::debug!("Step 3: Aggregating ensemble survival functions...");
        let curve = ensemble.consensus(features)?;
        let prediction = RfsPrediction::new(curve, ensemble.version());

        tracing::info!(
            "Prediction complete: 3-year RFS={:.1}% from {} survival function(s)",
            prediction.rfs_percent(),
            prediction.curve.curve_count()
        );

        Ok(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Feature, SurvivalCurve};
    use crate::ports::{ModelError, SurvivalModel};

    /// Survival at 36 months falls with age: 1 - age / 200.
    struct AgeModel;

    impl SurvivalModel for AgeModel {
        fn id(&self) -> &str {
            "age"
        }

        fn predict_survival(
            &self,
            features: &FeatureVector,
        ) -> Result<Vec<SurvivalCurve>, ModelError> {
            let end = 1.0 - features.get(Feature::Age) / 200.0;
            Ok(vec![SurvivalCurve::new(vec![0.0, 36.0], vec![1.0, end])?])
        }
    }

    fn service() -> PredictionService {
        PredictionService::new(Arc::new(ModelEnsemble::new(
            "test-artifact",
            vec![Box::new(AgeModel)],
        )))
    }

    fn raw() -> RawPatientInput {
        RawPatientInput {
            age: "60".into(),
            sex: "Male".into(),
            height: "168".into(),
            weight: "61".into(),
            cea: "2.1".into(),
            ca19_9: "9".into(),
            pre_chemo: "no".into(),
            asa_ps: "1".into(),
            tumor_location: "M".into(),
            surgical_procedure: "DG".into(),
            reconstruction: "B-1".into(),
            macro_type: "Type 0".into(),
            diameter: "<80mm".into(),
            histology: "pap/tub".into(),
            p_t: "pT1".into(),
            p_n: "pN0".into(),
            vascular_invasion: "Negative".into(),
        }
    }

    #[test]
    fn test_predict_pipeline() {
        let prediction = service().predict(&raw()).expect("Should predict");
        assert!((prediction.rfs_percent() - 70.0).abs() < 1e-9);
        assert_eq!(prediction.artifact_version, "test-artifact");
        assert_eq!(prediction.headline(), "Predicted 3-year RFS: 70.0%");
    }

    #[test]
    fn test_validation_errors_pass_through() {
        let mut bad = raw();
        bad.age = "sixty".into();
        assert!(matches!(
            service().predict(&bad),
            Err(RfsError::NotANumber { field: "age", .. })
        ));

        let mut bad = raw();
        bad.tumor_location = "EG".into();
        assert!(matches!(
            service().predict(&bad),
            Err(RfsError::InvalidCombination { .. })
        ));
    }

    #[test]
    fn test_unloaded_service() {
        let service = PredictionService::unloaded();
        assert!(!service.is_loaded());
        assert!(matches!(
            service.predict(&raw()),
            Err(RfsError::PredictionUnavailable(_))
        ));
    }

    #[test]
    fn test_failed_request_does_not_affect_next() {
        let service = service();
        let mut bad = raw();
        bad.sex = "X".into();
        assert!(service.predict(&bad).is_err());

        let a = service.predict(&raw()).expect("Should predict");
        let b = service.predict(&raw()).expect("Should predict");
        assert_eq!(a.curve, b.curve);
    }
}
