//! Model ensemble: consensus survival curve from every member's predictions.
//!
//! Each model may return several survival functions for one row (a model can
//! itself be a micro-ensemble). All returned functions, from all models, are
//! resampled onto months 0..=36 and averaged with equal weight.

use crate::domain::{ConsensusCurve, FeatureVector};
use crate::ports::SurvivalModel;
use crate::RfsError;

/// Ordered, read-only collection of survival models.
///
/// Built once at startup and shared behind an `Arc`; prediction never mutates
/// it.
pub struct ModelEnsemble {
    version: String,
    models: Vec<Box<dyn SurvivalModel>>,
}

impl ModelEnsemble {
    /// Create an ensemble from models in artifact order.
    #[must_use]
    pub fn new(version: impl Into<String>, models: Vec<Box<dyn SurvivalModel>>) -> Self {
        Self {
            version: version.into(),
            models,
        }
    }

    /// Artifact version string.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn model_ids(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(|m| m.id())
    }

    /// Compute the consensus curve for one feature row.
    ///
    /// Curves are accumulated in model order, so identical inputs always give
    /// bit-identical output.
    ///
    /// # Errors
    /// Returns `RfsError::PredictionUnavailable` if any model fails, if no
    /// model returns a survival function, or if the mean is not finite.
    pub fn consensus(&self, features: &FeatureVector) -> Result<ConsensusCurve, RfsError> {
        let mut curves = Vec::new();

        for model in &self.models {
            let predicted = model.predict_survival(features).map_err(|e| {
                tracing::warn!("Model {} failed to predict: {}", model.id(), e);
                RfsError::PredictionUnavailable(e.to_string())
            })?;
            tracing::debug!(
                "Model {} returned {} survival function(s)",
                model.id(),
                predicted.len()
            );
            curves.extend(predicted);
        }

        let consensus = ConsensusCurve::mean_of(&curves).ok_or_else(|| {
            RfsError::PredictionUnavailable(format!(
                "no survival function returned by {} model(s)",
                self.models.len()
            ))
        })?;

        if !consensus.is_finite() {
            return Err(RfsError::PredictionUnavailable(
                "consensus curve contains non-finite values".to_string(),
            ));
        }

        Ok(consensus)
    }
}

impl std::fmt::Debug for ModelEnsemble {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelEnsemble")
            .field("version", &self.version)
            .field("models", &self.model_ids().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SurvivalCurve, FEATURE_COUNT};
    use crate::ports::ModelError;
    use std::sync::Arc;

    /// Returns the same curves for every row.
    struct FixedModel {
        id: String,
        curves: Vec<SurvivalCurve>,
    }

    impl FixedModel {
        fn boxed(id: &str, knots: &[&[(f64, f64)]]) -> Box<dyn SurvivalModel> {
            let curves = knots
                .iter()
                .map(|k| {
                    let (t, s): (Vec<f64>, Vec<f64>) = k.iter().copied().unzip();
                    SurvivalCurve::new(t, s).expect("valid curve")
                })
                .collect();
            Box::new(Self {
                id: id.to_string(),
                curves,
            })
        }
    }

    impl SurvivalModel for FixedModel {
        fn id(&self) -> &str {
            &self.id
        }

        fn predict_survival(&self, _: &FeatureVector) -> Result<Vec<SurvivalCurve>, ModelError> {
            Ok(self.curves.clone())
        }
    }

    struct FailingModel;

    impl SurvivalModel for FailingModel {
        fn id(&self) -> &str {
            "failing"
        }

        fn predict_survival(&self, _: &FeatureVector) -> Result<Vec<SurvivalCurve>, ModelError> {
            Err(ModelError::Prediction {
                model: "failing".into(),
                reason: "tree index out of bounds".into(),
            })
        }
    }

    fn row() -> FeatureVector {
        FeatureVector::from_encoded([1.0; FEATURE_COUNT])
    }

    #[test]
    fn test_two_models_average_to_seventy_percent() {
        let ensemble = ModelEnsemble::new(
            "test",
            vec![
                FixedModel::boxed("a", &[&[(0.0, 1.0), (36.0, 0.8)]]),
                FixedModel::boxed("b", &[&[(0.0, 1.0), (36.0, 0.6)]]),
            ],
        );

        let consensus = ensemble.consensus(&row()).expect("Should predict");
        assert_eq!(consensus.curve_count(), 2);
        assert!((consensus.three_year_rfs() - 0.7).abs() < 1e-12);
        assert_eq!(format!("{:.1}%", consensus.three_year_rfs_percent()), "70.0%");
    }

    #[test]
    fn test_all_curves_weighted_equally() {
        // Model "a" is a micro-ensemble with two curves; the mean is over three
        // curves, not over two models.
        let ensemble = ModelEnsemble::new(
            "test",
            vec![
                FixedModel::boxed("a", &[&[(0.0, 0.9)], &[(0.0, 0.6)]]),
                FixedModel::boxed("b", &[&[(0.0, 0.3)]]),
            ],
        );

        let consensus = ensemble.consensus(&row()).expect("Should predict");
        assert_eq!(consensus.curve_count(), 3);
        assert!((consensus.three_year_rfs() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_short_curve_is_held_constant() {
        let ensemble = ModelEnsemble::new(
            "test",
            vec![FixedModel::boxed("a", &[&[(0.0, 1.0), (12.0, 0.76), (24.0, 0.7)]])],
        );

        let consensus = ensemble.consensus(&row()).expect("Should predict");
        assert!((consensus.at_month(6).unwrap() - 0.88).abs() < 1e-12);
        for month in 24..=36 {
            assert_eq!(consensus.at_month(month), Some(0.7));
        }
    }

    #[test]
    fn test_no_curves_is_unavailable() {
        let empty = ModelEnsemble::new("test", Vec::new());
        assert!(matches!(
            empty.consensus(&row()),
            Err(RfsError::PredictionUnavailable(_))
        ));

        let silent = ModelEnsemble::new("test", vec![FixedModel::boxed("a", &[])]);
        assert!(matches!(
            silent.consensus(&row()),
            Err(RfsError::PredictionUnavailable(_))
        ));
    }

    #[test]
    fn test_model_failure_is_not_skipped() {
        let ensemble = ModelEnsemble::new(
            "test",
            vec![
                FixedModel::boxed("a", &[&[(0.0, 1.0), (36.0, 0.8)]]),
                Box::new(FailingModel),
            ],
        );

        let err = ensemble.consensus(&row()).expect_err("must fail");
        assert!(matches!(err, RfsError::PredictionUnavailable(ref m) if m.contains("failing")));
    }

    #[test]
    fn test_deterministic_across_calls_and_threads() {
        let ensemble = Arc::new(ModelEnsemble::new(
            "test",
            vec![
                FixedModel::boxed("a", &[&[(0.0, 1.0), (7.0, 0.93), (30.0, 0.61)]]),
                FixedModel::boxed("b", &[&[(1.5, 0.99), (36.0, 0.55)]]),
                FixedModel::boxed("c", &[&[(0.0, 1.0), (20.0, 0.8)], &[(0.0, 0.97)]]),
            ],
        ));

        let first = ensemble.consensus(&row()).expect("Should predict");
        let second = ensemble.consensus(&row()).expect("Should predict");
        let bits = |c: &ConsensusCurve| c.survival().map(f64::to_bits);
        assert_eq!(bits(&first), bits(&second));

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let ensemble = Arc::clone(&ensemble);
                    s.spawn(move || ensemble.consensus(&row()).expect("Should predict"))
                })
                .collect();
            for h in handles {
                let curve = h.join().expect("thread");
                assert_eq!(bits(&curve), bits(&first));
            }
        });
    }

    #[test]
    fn test_debug_lists_models() {
        let ensemble = ModelEnsemble::new("v1", vec![FixedModel::boxed("fold-1", &[])]);
        let dbg = format!("{ensemble:?}");
        assert!(dbg.contains("fold-1"));
        assert_eq!(ensemble.len(), 1);
        assert!(!ensemble.is_empty());
    }
}
