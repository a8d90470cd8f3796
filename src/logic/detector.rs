//! Anomaly Detector - readings in, score record out
//!
//! Holds the immutable tuple loaded once at startup (schema, reference
//! temperature, classifier, channel vocabulary, clock) and runs
//! assembly -> scoring per call. Safe to share across threads.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::clock::{Clock, SystemClock};
use super::config::{ConfigError, DetectorConfig};
use super::features::{FeatureAssembler, FeatureVector, LayoutCheck, Reconciliation, SensorReadings};
use super::model::{AnomalyScorer, Classifier, MetadataError, ModelMetadata, ScoreRecord, ScorerStatus};

#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid metadata: {0}")]
    Metadata(#[from] MetadataError),
}

/// Detector status for logging/UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorStatus {
    pub schema_fingerprint: u32,
    pub feature_count: usize,
    pub assembled_len: usize,
    pub channel_count: usize,
    pub reference_temperature: f64,
    pub fallback_value: f64,
    pub padded_count: u64,
    pub truncated_count: u64,
    pub fallback_channel_count: u64,
    pub scorer: ScorerStatus,
}

pub struct AnomalyDetector {
    assembler: FeatureAssembler,
    scorer: AnomalyScorer,
    clock: Box<dyn Clock>,
    echo_readings: bool,
    layout: LayoutCheck,
    padded_count: AtomicU64,
    truncated_count: AtomicU64,
    fallback_channel_count: AtomicU64,
}

impl AnomalyDetector {
    pub fn new(
        metadata: ModelMetadata,
        classifier: Classifier,
        config: DetectorConfig,
    ) -> Result<Self, DetectorError> {
        metadata.validate()?;
        config.validate()?;

        let schema = metadata.schema()?;
        let channels = config.channels.channel_keys();
        let layout = schema.check_against(&channels);
        let fallback_value = config.resolve_fallback(metadata.reference_temperature);

        log::info!(
            "Anomaly detector ready: {} channels, {} features (schema {:08x}), reference {}",
            channels.len(),
            schema.len(),
            schema.fingerprint(),
            metadata.reference_temperature
        );

        if !layout.lengths_match() {
            log::warn!(
                "Schema has {} features but assembly produces {}; every vector will be {}",
                layout.schema_len,
                layout.assembled_len,
                if layout.schema_len > layout.assembled_len { "padded" } else { "truncated" }
            );
        } else if let Some(index) = layout.first_mismatch {
            log::debug!(
                "Schema feature names diverge from assembly names at position {}",
                index
            );
        }

        Ok(Self {
            assembler: FeatureAssembler::new(
                channels,
                schema,
                metadata.reference_temperature,
                fallback_value,
            ),
            scorer: AnomalyScorer::new(classifier),
            clock: Box::new(SystemClock),
            echo_readings: config.echo_readings,
            layout,
            padded_count: AtomicU64::new(0),
            truncated_count: AtomicU64::new(0),
            fallback_channel_count: AtomicU64::new(0),
        })
    }

    /// Replace the wall clock (tests, replay)
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn assembler(&self) -> &FeatureAssembler {
        &self.assembler
    }

    pub fn scorer(&self) -> &AnomalyScorer {
        &self.scorer
    }

    pub fn layout_check(&self) -> &LayoutCheck {
        &self.layout
    }

    fn resolve_timestamp(&self, timestamp: Option<NaiveDateTime>) -> NaiveDateTime {
        timestamp.unwrap_or_else(|| self.clock.now())
    }

    /// Assemble the schema-length vector for `readings`
    pub fn prepare_features(
        &self,
        readings: &SensorReadings,
        timestamp: Option<NaiveDateTime>,
    ) -> FeatureVector {
        let timestamp = self.resolve_timestamp(timestamp);
        let vector = self.assembler.assemble(readings, &timestamp);
        self.track(&vector);
        vector
    }

    /// Score one batch of readings; never fails
    pub fn predict(&self, readings: &SensorReadings, timestamp: Option<NaiveDateTime>) -> ScoreRecord {
        let timestamp = self.resolve_timestamp(timestamp);
        let vector = self.prepare_features(readings, Some(timestamp));

        let echoed = if self.echo_readings { Some(readings) } else { None };
        let record = self.scorer.score(vector.as_slice(), timestamp, echoed);

        if let Some(verdict) = record.verdict_ref() {
            log::debug!(
                "Prediction at {}: {} (confidence {:.3})",
                timestamp, verdict.status, verdict.confidence
            );
        }

        record
    }

    fn track(&self, vector: &FeatureVector) {
        match vector.reconciliation {
            Reconciliation::Exact => {}
            Reconciliation::Padded { .. } => {
                self.padded_count.fetch_add(1, Ordering::Relaxed);
            }
            Reconciliation::Truncated { .. } => {
                self.truncated_count.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.fallback_channel_count
            .fetch_add(vector.fallback_channels.len() as u64, Ordering::Relaxed);
    }

    pub fn status(&self) -> DetectorStatus {
        let schema = self.assembler.schema();
        DetectorStatus {
            schema_fingerprint: schema.fingerprint(),
            feature_count: schema.len(),
            assembled_len: self.layout.assembled_len,
            channel_count: self.assembler.channels().len(),
            reference_temperature: self.assembler.reference_temperature(),
            fallback_value: self.assembler.fallback_value(),
            padded_count: self.padded_count.load(Ordering::Relaxed),
            truncated_count: self.truncated_count.load(Ordering::Relaxed),
            fallback_channel_count: self.fallback_channel_count.load(Ordering::Relaxed),
            scorer: self.scorer.status(),
        }
    }
}

impl std::fmt::Debug for AnomalyDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnomalyDetector")
            .field("assembler", &self.assembler)
            .field("scorer", &self.scorer)
            .field("echo_readings", &self.echo_readings)
            .field("layout", &self.layout)
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================
