//! Deployment configuration
//!
//! Channel vocabulary of a site: which keys drive the raw feature block and in
//! what order. Keys follow `{site}_{unit}-{index}_{suffix}`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{self, TEMP_STEM};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("sensor_count must be at least 1")]
    NoSensors,
    #[error("suffix group {0} is empty")]
    EmptySuffixGroup(usize),
    #[error("no suffix groups configured")]
    NoSuffixGroups,
    #[error("explicit channel list is empty")]
    EmptyChannelList,
    #[error("channel '{0}' is listed more than once")]
    DuplicateChannel(String),
    #[error("fallback value must be finite, got {0}")]
    NonFiniteFallback(f64),
    #[error("invalid config file: {0}")]
    Parse(String),
}

/// Suffix groups of the reference deployment.
///
/// Each group is walked sensor by sensor, emitting the group's suffixes for
/// one sensor before moving to the next.
pub fn default_suffix_groups() -> Vec<Vec<String>> {
    let group = |suffixes: &[&str]| -> Vec<String> {
        suffixes
            .iter()
            .map(|s| if s.is_empty() { TEMP_STEM.to_string() } else { format!("{}_{}", TEMP_STEM, s) })
            .collect()
    };

    vec![
        group(&[""]),
        group(&["Status"]),
        group(&["ZScore", "ZScore_Anomaly"]),
        group(&["MA", "MA_Deviation", "MA_Anomaly"]),
        group(&["Ensemble_Score", "Ensemble_Anomaly"]),
    ]
}

// ============================================================================
// CHANNEL CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Site identifier, e.g. "SNE22-1"
    pub site: String,
    /// Unit identifier, e.g. "VAV1-2"
    pub unit: String,
    /// Sensors per unit, indexed from 1
    pub sensor_count: usize,
    /// Ordered suffix groups
    pub suffix_groups: Vec<Vec<String>>,
    /// Explicit key list; replaces the generated vocabulary when set
    pub channels: Option<Vec<String>>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            site: constants::DEFAULT_SITE_ID.to_string(),
            unit: constants::DEFAULT_UNIT_ID.to_string(),
            sensor_count: constants::DEFAULT_SENSOR_COUNT,
            suffix_groups: default_suffix_groups(),
            channels: None,
        }
    }
}

impl ChannelConfig {
    pub fn new(site: &str, unit: &str, sensor_count: usize) -> Self {
        Self {
            site: site.to_string(),
            unit: unit.to_string(),
            sensor_count,
            ..Default::default()
        }
    }

    /// Use an explicit, pre-ordered key list
    pub fn explicit(channels: Vec<String>) -> Self {
        Self {
            channels: Some(channels),
            ..Default::default()
        }
    }

    /// Load site/unit/count from environment with defaults
    pub fn from_env() -> Self {
        Self::new(
            &constants::get_site_id(),
            &constants::get_unit_id(),
            constants::get_sensor_count(),
        )
    }

    /// Key for one sensor channel
    pub fn channel_key(&self, index: usize, suffix: &str) -> String {
        format!("{}_{}-{}_{}", self.site, self.unit, index, suffix)
    }

    /// Driving channel list in feature order
    pub fn channel_keys(&self) -> Vec<String> {
        if let Some(explicit) = &self.channels {
            return explicit.clone();
        }

        let per_sensor: usize = self.suffix_groups.iter().map(Vec::len).sum();
        let mut keys = Vec::with_capacity(per_sensor * self.sensor_count);

        for group in &self.suffix_groups {
            for index in 1..=self.sensor_count {
                for suffix in group {
                    keys.push(self.channel_key(index, suffix));
                }
            }
        }

        keys
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let keys = match &self.channels {
            Some(explicit) => {
                if explicit.is_empty() {
                    return Err(ConfigError::EmptyChannelList);
                }
                explicit.clone()
            }
            None => {
                if self.sensor_count == 0 {
                    return Err(ConfigError::NoSensors);
                }
                if self.suffix_groups.is_empty() {
                    return Err(ConfigError::NoSuffixGroups);
                }
                if let Some(i) = self.suffix_groups.iter().position(|g| g.is_empty()) {
                    return Err(ConfigError::EmptySuffixGroup(i));
                }
                self.channel_keys()
            }
        };

        let mut seen = std::collections::HashSet::with_capacity(keys.len());
        for key in keys {
            if !seen.insert(key.clone()) {
                return Err(ConfigError::DuplicateChannel(key));
            }
        }

        Ok(())
    }
}

// ============================================================================
// DETECTOR CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub channels: ChannelConfig,
    /// Substitute for missing/invalid readings. `None` = reference temperature.
    pub fallback_value: Option<f64>,
    /// Echo the input readings back in each score record
    pub echo_readings: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            channels: ChannelConfig::default(),
            fallback_value: None,
            echo_readings: true,
        }
    }
}

impl DetectorConfig {
    pub fn from_env() -> Self {
        Self {
            channels: ChannelConfig::from_env(),
            fallback_value: None,
            echo_readings: constants::is_echo_readings_enabled(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(value) = self.fallback_value {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteFallback(value));
            }
        }
        self.channels.validate()
    }

    /// Fallback actually used for a given reference temperature
    pub fn resolve_fallback(&self, reference_temperature: f64) -> f64 {
        self.fallback_value.unwrap_or(reference_temperature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_vocabulary_size() {
        let config = ChannelConfig::default();
        assert_eq!(config.channel_keys().len(), 36);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_vocabulary_order() {
        let keys = ChannelConfig::default().channel_keys();

        assert_eq!(keys[0], "SNE22-1_VAV1-2-1_Temp");
        assert_eq!(keys[3], "SNE22-1_VAV1-2-4_Temp");
        assert_eq!(keys[4], "SNE22-1_VAV1-2-1_Temp_Status");
        assert_eq!(keys[8], "SNE22-1_VAV1-2-1_Temp_ZScore");
        assert_eq!(keys[9], "SNE22-1_VAV1-2-1_Temp_ZScore_Anomaly");
        assert_eq!(keys[10], "SNE22-1_VAV1-2-2_Temp_ZScore");
        assert_eq!(keys[16], "SNE22-1_VAV1-2-1_Temp_MA");
        assert_eq!(keys[18], "SNE22-1_VAV1-2-1_Temp_MA_Anomaly");
        assert_eq!(keys[28], "SNE22-1_VAV1-2-1_Temp_Ensemble_Score");
        assert_eq!(keys[35], "SNE22-1_VAV1-2-4_Temp_Ensemble_Anomaly");
    }

    #[test]
    fn test_other_site_generalizes() {
        let config = ChannelConfig::new("BLD7", "AHU3", 2);
        let keys = config.channel_keys();

        assert_eq!(keys.len(), 18);
        assert_eq!(keys[0], "BLD7_AHU3-1_Temp");
        assert_eq!(keys[1], "BLD7_AHU3-2_Temp");
        assert_eq!(keys[2], "BLD7_AHU3-1_Temp_Status");
    }

    #[test]
    fn test_validate_rejects_bad_configs() {
        assert_eq!(ChannelConfig::new("S", "U", 0).validate(), Err(ConfigError::NoSensors));

        let empty = ChannelConfig::explicit(vec![]);
        assert_eq!(empty.validate(), Err(ConfigError::EmptyChannelList));

        let dup = ChannelConfig::explicit(vec!["a".into(), "b".into(), "a".into()]);
        assert_eq!(dup.validate(), Err(ConfigError::DuplicateChannel("a".into())));

        let mut groups = ChannelConfig::default();
        groups.suffix_groups.push(vec![]);
        assert_eq!(groups.validate(), Err(ConfigError::EmptySuffixGroup(5)));
    }

    #[test]
    fn test_detector_config_from_json() {
        let config = DetectorConfig::from_json(
            r#"{"channels": {"site": "X", "unit": "Y", "sensor_count": 1}, "fallback_value": 21.5}"#,
        )
        .unwrap();

        assert_eq!(config.channels.channel_keys().len(), 9);
        assert_eq!(config.resolve_fallback(25.0), 21.5);
        assert!(config.echo_readings);

        assert!(DetectorConfig::from_json("{not json").is_err());
    }

    #[test]
    fn test_fallback_defaults_to_reference() {
        let config = DetectorConfig::default();
        assert_eq!(config.resolve_fallback(19.0), 19.0);
    }
}
