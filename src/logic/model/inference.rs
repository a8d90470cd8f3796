//! Anomaly Scorer - classifier output to score record
//!
//! Every failure on the scoring path is folded into an error record; callers
//! branch on `ScoreRecord::error()` instead of handling `Err`.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::classifier::{Classifier, ClassifierError};
use super::result::{ScoreRecord, Verdict};
use crate::logic::features::SensorReadings;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    #[error("classifier error: {0}")]
    Classifier(#[from] ClassifierError),
    #[error("classifier returned no prediction")]
    EmptyPrediction,
    #[error("classifier returned no probabilities")]
    EmptyProbabilities,
    #[error("classifier panicked: {0}")]
    Panicked(String),
}

// ============================================================================
// SCORING
// ============================================================================

/// Run the classifier on one feature row and interpret its output
pub fn evaluate(features: &[f64], classifier: &Classifier) -> Result<Verdict, ScoreError> {
    let batch = [features];

    let (labels, probabilities) = match classifier {
        Classifier::WithProbability(model) => {
            let (labels, rows) = model.predict_with_proba(&batch)?;
            (labels, Some(rows))
        }
        Classifier::PredictOnly(model) => (model.predict(&batch)?, None),
    };

    let label = *labels.first().ok_or(ScoreError::EmptyPrediction)?;
    let anomaly = label != 0;

    let confidence = match probabilities {
        Some(rows) => {
            let row = rows.first().ok_or(ScoreError::EmptyProbabilities)?;
            match row.as_slice() {
                [] => return Err(ScoreError::EmptyProbabilities),
                [only] => *only,
                [_, positive, ..] => *positive,
            }
        }
        None => {
            if anomaly { 1.0 } else { 0.0 }
        }
    };

    if !(0.0..=1.0).contains(&confidence) {
        log::warn!("Classifier confidence {} outside [0, 1]", confidence);
    }

    Ok(Verdict::new(anomaly, confidence))
}

/// `evaluate` with panics from the classifier turned into errors
fn evaluate_guarded(features: &[f64], classifier: &Classifier) -> Result<Verdict, ScoreError> {
    panic::catch_unwind(AssertUnwindSafe(|| evaluate(features, classifier)))
        .unwrap_or_else(|payload| Err(ScoreError::Panicked(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Score one feature row; never fails
pub fn score(
    features: &[f64],
    classifier: &Classifier,
    timestamp: NaiveDateTime,
    original_readings: Option<&SensorReadings>,
) -> ScoreRecord {
    match evaluate_guarded(features, classifier) {
        Ok(verdict) => ScoreRecord::verdict(timestamp, verdict, original_readings.cloned()),
        Err(e) => {
            log::error!("Scoring failed: {}", e);
            ScoreRecord::failure(timestamp, e.to_string())
        }
    }
}

// ============================================================================
// SCORER
// ============================================================================

/// Scorer status for logging/UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerStatus {
    pub has_probability: bool,
    pub score_count: u64,
    pub error_count: u64,
    pub anomaly_count: u64,
    pub avg_latency_ms: f32,
}

/// Classifier plus lock-free call statistics
#[derive(Debug)]
pub struct AnomalyScorer {
    classifier: Classifier,
    score_count: AtomicU64,
    error_count: AtomicU64,
    anomaly_count: AtomicU64,
    latency_sum_us: AtomicU64,
}

impl AnomalyScorer {
    pub fn new(classifier: Classifier) -> Self {
        Self {
            classifier,
            score_count: AtomicU64::new(0),
            error_count: AtomicU64::new(0),
            anomaly_count: AtomicU64::new(0),
            latency_sum_us: AtomicU64::new(0),
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn try_score(&self, features: &[f64]) -> Result<Verdict, ScoreError> {
        evaluate_guarded(features, &self.classifier)
    }

    pub fn score(
        &self,
        features: &[f64],
        timestamp: NaiveDateTime,
        original_readings: Option<&SensorReadings>,
    ) -> ScoreRecord {
        let start_time = std::time::Instant::now();

        let record = score(features, &self.classifier, timestamp, original_readings);

        // Track metrics
        self.latency_sum_us
            .fetch_add(start_time.elapsed().as_micros() as u64, Ordering::Relaxed);
        self.score_count.fetch_add(1, Ordering::Relaxed);
        if record.is_error() {
            self.error_count.fetch_add(1, Ordering::Relaxed);
        } else if record.is_anomaly() {
            self.anomaly_count.fetch_add(1, Ordering::Relaxed);
        }

        record
    }

    pub fn status(&self) -> ScorerStatus {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.score_count.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f32 / count as f32) / 1000.0 } else { 0.0 };

        ScorerStatus {
            has_probability: self.classifier.has_probability(),
            score_count: count,
            error_count: self.error_count.load(Ordering::Relaxed),
            anomaly_count: self.anomaly_count.load(Ordering::Relaxed),
            avg_latency_ms: avg,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
