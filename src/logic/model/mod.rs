//! Model Module - Classifier capabilities and scoring
//!
//! The trained model is opaque: anything implementing `Predict` (and
//! optionally `PredictProba`) can be plugged in.

pub mod classifier;
pub mod inference;
pub mod linear;
pub mod metadata;
pub mod result;

#[cfg(feature = "onnx")]
pub mod onnx;

// Re-export common types
pub use classifier::{Classifier, ClassifierError, Label, Predict, PredictProba};
pub use inference::{AnomalyScorer, ScoreError, ScorerStatus};
pub use linear::LinearClassifier;
pub use metadata::{MetadataError, ModelMetadata};
pub use result::{Outcome, ScoreRecord, Status, Verdict};

#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;
