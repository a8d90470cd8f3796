//! Score Record - the only externally visible output
//!
//! Serializes flat:
//! - `{timestamp, anomaly, confidence, status, sensor_data?}`
//! - `{timestamp, error}`

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::logic::features::SensorReadings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Anomaly,
    Normal,
}

impl Status {
    pub fn from_anomaly(anomaly: bool) -> Self {
        if anomaly { Status::Anomaly } else { Status::Normal }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Anomaly => "ANOMALY",
            Status::Normal => "NORMAL",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub anomaly: bool,
    /// 0.0 - 1.0, not re-validated
    pub confidence: f64,
    pub status: Status,
}

impl Verdict {
    pub fn new(anomaly: bool, confidence: f64) -> Self {
        Self {
            anomaly,
            confidence,
            status: Status::from_anomaly(anomaly),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outcome {
    Verdict(Verdict),
    Error { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub timestamp: NaiveDateTime,
    #[serde(flatten)]
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_data: Option<SensorReadings>,
}

impl ScoreRecord {
    pub fn verdict(timestamp: NaiveDateTime, verdict: Verdict, sensor_data: Option<SensorReadings>) -> Self {
        Self {
            timestamp,
            outcome: Outcome::Verdict(verdict),
            sensor_data,
        }
    }

    pub fn failure(timestamp: NaiveDateTime, error: impl Into<String>) -> Self {
        Self {
            timestamp,
            outcome: Outcome::Error { error: error.into() },
            sensor_data: None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, Outcome::Error { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Error { error } => Some(error.as_str()),
            Outcome::Verdict(_) => None,
        }
    }

    pub fn verdict_ref(&self) -> Option<&Verdict> {
        match &self.outcome {
            Outcome::Verdict(v) => Some(v),
            Outcome::Error { .. } => None,
        }
    }

    pub fn is_anomaly(&self) -> bool {
        self.verdict_ref().map(|v| v.anomaly).unwrap_or(false)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            serde_json::json!({ "timestamp": self.timestamp, "error": e.to_string() })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 9, 11).unwrap().and_hms_opt(10, 36, 54).unwrap()
    }

    #[test]
    fn test_verdict_serializes_flat() {
        let record = ScoreRecord::verdict(ts(), Verdict::new(true, 0.875), None);
        let json = record.to_json();

        assert_eq!(json["anomaly"], true);
        assert_eq!(json["confidence"], 0.875);
        assert_eq!(json["status"], "ANOMALY");
        assert_eq!(json["timestamp"], "2025-09-11T10:36:54");
        assert!(json.get("error").is_none());
        assert!(json.get("sensor_data").is_none());
    }

    #[test]
    fn test_error_serializes_flat() {
        let record = ScoreRecord::failure(ts(), "boom");
        let json = record.to_json();

        assert_eq!(json["error"], "boom");
        assert!(json.get("anomaly").is_none());
        assert!(json.get("status").is_none());
        assert!(record.is_error());
        assert!(!record.is_anomaly());
    }

    #[test]
    fn test_record_json_roundtrip_keeps_outcome() {
        let readings = SensorReadings::new().with("t1", 25.5);
        let ok = ScoreRecord::verdict(ts(), Verdict::new(false, 0.1), Some(readings));
        let err = ScoreRecord::failure(ts(), "classifier failed");

        let ok_back: ScoreRecord = serde_json::from_value(ok.to_json()).unwrap();
        let err_back: ScoreRecord = serde_json::from_value(err.to_json()).unwrap();

        assert_eq!(ok_back, ok);
        assert_eq!(err_back.error(), Some("classifier failed"));
    }

    #[test]
    fn test_status_mirrors_anomaly() {
        assert_eq!(Verdict::new(true, 1.0).status, Status::Anomaly);
        assert_eq!(Verdict::new(false, 0.0).status, Status::Normal);
        assert_eq!(Status::Normal.to_string(), "NORMAL");
    }
}
