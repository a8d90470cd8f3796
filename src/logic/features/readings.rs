//! Sensor Readings - raw per-call input
//!
//! Values arrive from the collector as loosely typed JSON. Anything that is
//! not a finite number (or a numeric string/bool) is treated as missing by
//! the assembler.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One raw reading value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReadingValue {
    Number(f64),
    Bool(bool),
    Text(String),
    Null,
}

impl ReadingValue {
    /// Coerce to f64; `None` if the value is not numeric or not finite
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            ReadingValue::Number(v) => Some(*v),
            ReadingValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            ReadingValue::Text(s) => s.trim().parse::<f64>().ok(),
            ReadingValue::Null => None,
        };
        value.filter(|v| v.is_finite())
    }
}

impl From<f64> for ReadingValue {
    fn from(v: f64) -> Self {
        ReadingValue::Number(v)
    }
}

impl From<bool> for ReadingValue {
    fn from(b: bool) -> Self {
        ReadingValue::Bool(b)
    }
}

impl From<&str> for ReadingValue {
    fn from(s: &str) -> Self {
        ReadingValue::Text(s.to_string())
    }
}

/// Why a channel could not be used as-is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelIssue {
    Missing,
    NotNumeric,
}

/// Channel key -> reading, for one inference call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorReadings(BTreeMap<String, ReadingValue>);

impl SensorReadings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ReadingValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ReadingValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ReadingValue> {
        self.0.get(key)
    }

    /// Numeric value of a channel, or the reason it is unusable
    pub fn lookup(&self, key: &str) -> Result<f64, ChannelIssue> {
        match self.0.get(key) {
            None => Err(ChannelIssue::Missing),
            Some(value) => value.as_f64().ok_or(ChannelIssue::NotNumeric),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ReadingValue)> {
        self.0.iter()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl<K: Into<String>, V: Into<ReadingValue>> FromIterator<(K, V)> for SensorReadings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
