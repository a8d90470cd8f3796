//! Sensor Anomaly Core
//!
//! Turns raw VAV temperature channel readings into an anomaly verdict:
//! readings -> feature assembly -> classifier -> score record.

pub mod constants;
pub mod logic;

pub use logic::clock::{Clock, FixedClock, SystemClock};
pub use logic::config::{ChannelConfig, ConfigError, DetectorConfig};
pub use logic::detector::{AnomalyDetector, DetectorError, DetectorStatus};
pub use logic::features::{
    assemble, FeatureAssembler, FeatureSchema, FeatureVector, Reconciliation, SensorReadings,
};
pub use logic::model::{
    AnomalyScorer, Classifier, ClassifierError, LinearClassifier, ModelMetadata, Predict,
    PredictProba, ScoreRecord, Status, Verdict,
};
