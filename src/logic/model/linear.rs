//! Linear (logistic) classifier exported as JSON coefficients

use serde::{Deserialize, Serialize};

use super::classifier::{ClassifierError, Label, Predict, PredictProba};

fn default_threshold() -> f64 {
    0.5
}

/// `p(anomaly) = sigmoid(w · x + b)`, anomaly when `p >= threshold`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearClassifier {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl LinearClassifier {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
            threshold: default_threshold(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    fn probability(&self, row: &[f64]) -> Result<f64, ClassifierError> {
        if row.len() != self.coefficients.len() {
            return Err(ClassifierError::DimensionMismatch {
                expected: self.coefficients.len(),
                actual: row.len(),
            });
        }

        let z: f64 = self
            .coefficients
            .iter()
            .zip(row.iter())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept;

        Ok(1.0 / (1.0 + (-z).exp()))
    }
}

impl Predict for LinearClassifier {
    fn predict(&self, batch: &[&[f64]]) -> Result<Vec<Label>, ClassifierError> {
        batch
            .iter()
            .map(|row| Ok(Label::from(self.probability(row)? >= self.threshold)))
            .collect()
    }
}

impl PredictProba for LinearClassifier {
    fn predict_proba(&self, batch: &[&[f64]]) -> Result<Vec<Vec<f64>>, ClassifierError> {
        batch
            .iter()
            .map(|row| {
                let p = self.probability(row)?;
                Ok(vec![1.0 - p, p])
            })
            .collect()
    }
}
