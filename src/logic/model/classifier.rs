//! Classifier capabilities
//!
//! A trained model either only predicts labels, or predicts labels and class
//! probabilities. The two cases are separate variants so the scorer never
//! checks for a method at runtime.

use thiserror::Error;

/// Class label; 0 = normal, anything else = anomaly
pub type Label = i64;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifierError {
    #[error("expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("model has no probability output")]
    NoProbabilityOutput,
    #[error("model failed: {0}")]
    Model(String),
}

/// Label prediction for a batch of feature rows
pub trait Predict: Send + Sync {
    fn predict(&self, batch: &[&[f64]]) -> Result<Vec<Label>, ClassifierError>;
}

/// Class probabilities, one row per input, one column per class
pub trait PredictProba: Predict {
    fn predict_proba(&self, batch: &[&[f64]]) -> Result<Vec<Vec<f64>>, ClassifierError>;

    /// Labels and probabilities for the same batch.
    ///
    /// Override when both come out of a single model run.
    fn predict_with_proba(
        &self,
        batch: &[&[f64]],
    ) -> Result<(Vec<Label>, Vec<Vec<f64>>), ClassifierError> {
        Ok((self.predict(batch)?, self.predict_proba(batch)?))
    }
}

/// Capability set of a loaded model
pub enum Classifier {
    PredictOnly(Box<dyn Predict>),
    WithProbability(Box<dyn PredictProba>),
}

impl Classifier {
    pub fn predict_only(model: impl Predict + 'static) -> Self {
        Classifier::PredictOnly(Box::new(model))
    }

    pub fn with_probability(model: impl PredictProba + 'static) -> Self {
        Classifier::WithProbability(Box::new(model))
    }

    pub fn has_probability(&self) -> bool {
        matches!(self, Classifier::WithProbability(_))
    }

    pub fn predict(&self, batch: &[&[f64]]) -> Result<Vec<Label>, ClassifierError> {
        match self {
            Classifier::PredictOnly(model) => model.predict(batch),
            Classifier::WithProbability(model) => model.predict(batch),
        }
    }
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classifier::PredictOnly(_) => write!(f, "Classifier::PredictOnly"),
            Classifier::WithProbability(_) => write!(f, "Classifier::WithProbability"),
        }
    }
}
