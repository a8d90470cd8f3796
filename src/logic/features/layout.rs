//! Feature Layout - schema the model was trained against
//!
//! **The schema controls the output vector**
//!
//! The model metadata carries an ordered list of feature names. The assembled
//! vector is always reconciled to exactly that length, so the schema (not the
//! assembler) is the authority on vector size and position.
//!
//! The assembler itself produces a fixed block layout:
//! 1. raw channel values (driving list order)
//! 2. `(value - ref, |value - ref|)` per raw value
//! 3. aggregate statistics over the raw block
//! 4. calendar features

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// BLOCK NAMES
// ============================================================================

pub const DEV_SUFFIX: &str = "_DevFromRef";
pub const ABS_DEV_SUFFIX: &str = "_AbsDevFromRef";

pub const AGGREGATE_FEATURES: [&str; 5] = [
    "Mean_All_Sensors",
    "Std_All_Sensors",
    "Min_All_Sensors",
    "Max_All_Sensors",
    "Range_All_Sensors",
];

pub const CALENDAR_FEATURES: [&str; 5] = [
    "Hour",
    "DayOfWeek",
    "Month",
    "IsWeekend",
    "IsBusinessHours",
];

/// Length of the assembled vector before reconciliation
pub fn assembled_len(channel_count: usize) -> usize {
    channel_count * 3 + AGGREGATE_FEATURES.len() + CALENDAR_FEATURES.len()
}

/// Names of every assembled entry, in assembly order
pub fn canonical_feature_names(channels: &[String]) -> Vec<String> {
    let mut names = Vec::with_capacity(assembled_len(channels.len()));

    names.extend(channels.iter().cloned());
    for channel in channels {
        names.push(format!("{}{}", channel, DEV_SUFFIX));
        names.push(format!("{}{}", channel, ABS_DEV_SUFFIX));
    }
    names.extend(AGGREGATE_FEATURES.iter().map(|s| s.to_string()));
    names.extend(CALENDAR_FEATURES.iter().map(|s| s.to_string()));

    names
}

// ============================================================================
// FEATURE SCHEMA
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("feature schema is empty")]
    Empty,
}

/// Ordered feature names, fixed at training time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    names: Vec<String>,
    fingerprint: u32,
}

impl FeatureSchema {
    pub fn new(names: Vec<String>) -> Result<Self, SchemaError> {
        if names.is_empty() {
            return Err(SchemaError::Empty);
        }
        let fingerprint = compute_fingerprint(&names);
        Ok(Self { names, fingerprint })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Never true for a constructed schema
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// CRC32 over the ordered names, used to tag vectors and logs
    pub fn fingerprint(&self) -> u32 {
        self.fingerprint
    }

    /// O(n), schemas are small
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn info(&self) -> SchemaInfo {
        SchemaInfo {
            fingerprint: self.fingerprint,
            feature_count: self.names.len(),
            feature_names: self.names.clone(),
        }
    }

    /// Compare against what the assembler will produce for `channels`
    pub fn check_against(&self, channels: &[String]) -> LayoutCheck {
        let canonical = canonical_feature_names(channels);
        let first_mismatch = self
            .names
            .iter()
            .zip(canonical.iter())
            .position(|(a, b)| a != b);

        LayoutCheck {
            schema_len: self.names.len(),
            assembled_len: canonical.len(),
            first_mismatch,
        }
    }
}

fn compute_fingerprint(names: &[String]) -> u32 {
    let mut hasher = Hasher::new();
    for name in names {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }
    hasher.finalize()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Serializable schema description for logging/status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaInfo {
    pub fingerprint: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

/// Result of comparing the schema with the assembler's own layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutCheck {
    pub schema_len: usize,
    pub assembled_len: usize,
    /// First position where schema and canonical names differ
    pub first_mismatch: Option<usize>,
}

impl LayoutCheck {
    /// Vectors will be neither padded nor truncated
    pub fn lengths_match(&self) -> bool {
        self.schema_len == self.assembled_len
    }

    pub fn is_exact(&self) -> bool {
        self.lengths_match() && self.first_mismatch.is_none()
    }
}

// ============================================================================
// TESTS
// ============================================================================
