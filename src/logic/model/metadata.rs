//! Model metadata exported alongside the trained model
//!
//! ```json
//! { "feature_columns": ["..."], "reference_temperature": 25.0 }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::features::{FeatureSchema, SchemaError};

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("failed to read metadata: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse metadata: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("reference temperature must be finite, got {0}")]
    NonFiniteReference(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub feature_columns: Vec<String>,
    pub reference_temperature: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl ModelMetadata {
    pub fn new(feature_columns: Vec<String>, reference_temperature: f64) -> Self {
        Self {
            feature_columns,
            reference_temperature,
            model_name: None,
            created_at: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, MetadataError> {
        let metadata: Self = serde_json::from_str(json)?;
        metadata.validate()?;
        Ok(metadata)
    }

    /// Load metadata from JSON file
    pub fn from_file(path: &Path) -> Result<Self, MetadataError> {
        log::info!("Loading model metadata from: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> Result<(), MetadataError> {
        if !self.reference_temperature.is_finite() {
            return Err(MetadataError::NonFiniteReference(self.reference_temperature));
        }
        if self.feature_columns.is_empty() {
            return Err(SchemaError::Empty.into());
        }
        Ok(())
    }

    pub fn schema(&self) -> Result<FeatureSchema, MetadataError> {
        Ok(FeatureSchema::new(self.feature_columns.clone())?)
    }
}
