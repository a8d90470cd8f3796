//! Feature Vector - model input assembled from raw readings
//!
//! **Schema-length vector with reconciliation metadata**
//!
//! The assembler always returns exactly `schema.len()` values:
//! - shorter assemblies are right-padded with 0.0
//! - longer assemblies lose their tail
//!
//! This lossy policy matches what the model was trained against and must not
//! change. Every pad/truncate is logged and recorded on the vector.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::calendar::CalendarFeatures;
use super::layout::{assembled_len, FeatureSchema};
use super::readings::{ChannelIssue, SensorReadings};
use super::stats::AggregateStats;
use crate::logic::clock::Clock;

// ============================================================================
// RECONCILIATION
// ============================================================================

/// What happened when fitting the assembly to the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reconciliation {
    Exact,
    Padded { added: usize },
    Truncated { dropped: usize },
}

/// Pad with 0.0 or drop trailing entries until `values.len() == target`
pub fn reconcile(mut values: Vec<f64>, target: usize) -> (Vec<f64>, Reconciliation) {
    let len = values.len();

    let outcome = if len < target {
        values.resize(target, 0.0);
        Reconciliation::Padded { added: target - len }
    } else if len > target {
        values.truncate(target);
        Reconciliation::Truncated { dropped: len - target }
    } else {
        Reconciliation::Exact
    };

    (values, outcome)
}

// ============================================================================
// FEATURE VECTOR
// ============================================================================

/// Channel that was replaced by the fallback value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackChannel {
    pub key: String,
    pub issue: ChannelIssue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Fingerprint of the schema this vector was fitted to
    pub schema_fingerprint: u32,
    /// Values in schema order
    pub values: Vec<f64>,
    pub reconciliation: Reconciliation,
    pub fallback_channels: Vec<FallbackChannel>,
}

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn get_by_name(&self, schema: &FeatureSchema, name: &str) -> Option<f64> {
        schema.index_of(name).and_then(|i| self.get(i))
    }

    /// Was the assembly padded or truncated
    pub fn is_reconciled(&self) -> bool {
        self.reconciliation != Reconciliation::Exact
    }

    /// JSON-serializable form for logging
    pub fn to_log_entry(&self, schema: &FeatureSchema) -> serde_json::Value {
        serde_json::json!({
            "schema_fingerprint": self.schema_fingerprint,
            "reconciliation": self.reconciliation,
            "fallback_channels": self.fallback_channels,
            "values": self.values,
            "named_values": schema.names().iter()
                .zip(self.values.iter())
                .map(|(name, value)| (name.clone(), *value))
                .collect::<std::collections::BTreeMap<_, _>>(),
        })
    }
}

// ============================================================================
// ASSEMBLY
// ============================================================================

/// Build the schema-length vector for one call.
///
/// Missing or non-numeric channels take `fallback_value` and are logged.
pub fn assemble_with_fallback(
    readings: &SensorReadings,
    timestamp: &NaiveDateTime,
    channels: &[String],
    schema: &FeatureSchema,
    reference_temperature: f64,
    fallback_value: f64,
) -> FeatureVector {
    let mut raw = Vec::with_capacity(channels.len());
    let mut fallback_channels = Vec::new();

    for key in channels {
        match readings.lookup(key) {
            Ok(value) => raw.push(value),
            Err(issue) => {
                log::warn!(
                    "Sensor channel {} is {:?}, using fallback {}",
                    key, issue, fallback_value
                );
                fallback_channels.push(FallbackChannel { key: key.clone(), issue });
                raw.push(fallback_value);
            }
        }
    }

    let mut features = Vec::with_capacity(assembled_len(raw.len()));

    // Raw values
    features.extend_from_slice(&raw);

    // Deviation from reference
    for &value in &raw {
        let deviation = value - reference_temperature;
        features.push(deviation);
        features.push(deviation.abs());
    }

    // Cross-sensor statistics
    features.extend_from_slice(&AggregateStats::compute(&raw).to_array());

    // Time features
    features.extend_from_slice(&CalendarFeatures::from_timestamp(timestamp).to_array());

    let assembled = features.len();
    let (values, reconciliation) = reconcile(features, schema.len());

    match reconciliation {
        Reconciliation::Exact => {
            log::trace!("Feature vector matches schema ({} features)", assembled);
        }
        Reconciliation::Padded { added } => {
            log::warn!(
                "Feature vector padded: assembled {} < schema {}, added {} zeros",
                assembled, schema.len(), added
            );
        }
        Reconciliation::Truncated { dropped } => {
            log::warn!(
                "Feature vector truncated: assembled {} > schema {}, dropped {} trailing features",
                assembled, schema.len(), dropped
            );
        }
    }

    FeatureVector {
        schema_fingerprint: schema.fingerprint(),
        values,
        reconciliation,
        fallback_channels,
    }
}

/// Assemble using the reference temperature as the fallback value
pub fn assemble(
    readings: &SensorReadings,
    timestamp: &NaiveDateTime,
    channels: &[String],
    schema: &FeatureSchema,
    reference_temperature: f64,
) -> FeatureVector {
    assemble_with_fallback(
        readings,
        timestamp,
        channels,
        schema,
        reference_temperature,
        reference_temperature,
    )
}

/// Assembler bound to one deployment and one model's metadata
#[derive(Debug, Clone)]
pub struct FeatureAssembler {
    channels: Vec<String>,
    schema: FeatureSchema,
    reference_temperature: f64,
    fallback_value: f64,
}

impl FeatureAssembler {
    pub fn new(
        channels: Vec<String>,
        schema: FeatureSchema,
        reference_temperature: f64,
        fallback_value: f64,
    ) -> Self {
        Self { channels, schema, reference_temperature, fallback_value }
    }

    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn reference_temperature(&self) -> f64 {
        self.reference_temperature
    }

    pub fn fallback_value(&self) -> f64 {
        self.fallback_value
    }

    pub fn assemble(&self, readings: &SensorReadings, timestamp: &NaiveDateTime) -> FeatureVector {
        assemble_with_fallback(
            readings,
            timestamp,
            &self.channels,
            &self.schema,
            self.reference_temperature,
            self.fallback_value,
        )
    }

    /// Use `timestamp` if given, otherwise ask the clock
    pub fn assemble_at(
        &self,
        readings: &SensorReadings,
        timestamp: Option<NaiveDateTime>,
        clock: &dyn Clock,
    ) -> FeatureVector {
        let timestamp = timestamp.unwrap_or_else(|| clock.now());
        self.assemble(readings, &timestamp)
    }
}

// ============================================================================
// TESTS
// ============================================================================
