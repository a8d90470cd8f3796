//! ONNX classifier - ONNX Runtime Integration
//!
//! Loads a classifier exported with skl2onnx (`zipmap=False`):
//! - output 0: int64 labels
//! - output 1 (optional): float32 class probabilities, `[rows, classes]`

use std::path::Path;

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use super::classifier::{Classifier, ClassifierError, Label, Predict, PredictProba};

pub struct OnnxClassifier {
    session: Mutex<Session>,
    label_output: String,
    probability_output: Option<String>,
}

impl OnnxClassifier {
    /// Load ONNX model from file
    pub fn load(model_path: &Path) -> Result<Self, ClassifierError> {
        log::info!("Loading ONNX classifier from: {}", model_path.display());

        if !model_path.exists() {
            return Err(ClassifierError::Model(format!("Model not found: {}", model_path.display())));
        }

        let session = Session::builder()
            .map_err(|e| ClassifierError::Model(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ClassifierError::Model(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| ClassifierError::Model(format!("Failed to load model: {}", e)))?;

        Self::from_session(session)
    }

    /// Load ONNX model from bytes
    pub fn load_from_bytes(model_bytes: &[u8]) -> Result<Self, ClassifierError> {
        log::info!("Loading ONNX classifier from memory ({} bytes)", model_bytes.len());

        let session = Session::builder()
            .map_err(|e| ClassifierError::Model(format!("Session builder error: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ClassifierError::Model(format!("Optimization error: {}", e)))?
            .commit_from_memory(model_bytes)
            .map_err(|e| ClassifierError::Model(format!("Load from memory error: {}", e)))?;

        Self::from_session(session)
    }

    fn from_session(session: Session) -> Result<Self, ClassifierError> {
        let mut names = session.outputs.iter().map(|o| o.name.clone());

        let label_output = names
            .next()
            .ok_or_else(|| ClassifierError::Model("No output defined".to_string()))?;
        let probability_output = names.next();

        log::info!(
            "ONNX classifier loaded (label: {}, probabilities: {})",
            label_output,
            probability_output.as_deref().unwrap_or("none")
        );

        Ok(Self {
            session: Mutex::new(session),
            label_output,
            probability_output,
        })
    }

    /// Wrap in the capability variant this graph supports
    pub fn into_classifier(self) -> Classifier {
        if self.probability_output.is_some() {
            Classifier::with_probability(self)
        } else {
            Classifier::predict_only(self)
        }
    }

    fn to_input(batch: &[&[f64]]) -> Result<Array2<f32>, ClassifierError> {
        let cols = batch.first().map(|row| row.len()).unwrap_or(0);

        if let Some(row) = batch.iter().find(|row| row.len() != cols) {
            return Err(ClassifierError::DimensionMismatch { expected: cols, actual: row.len() });
        }

        let data: Vec<f32> = batch.iter().flat_map(|row| row.iter().map(|&v| v as f32)).collect();

        Array2::<f32>::from_shape_vec((batch.len(), cols), data)
            .map_err(|e| ClassifierError::Model(format!("Array error: {}", e)))
    }

    /// One session run; probabilities are extracted only when asked for
    fn run(
        &self,
        batch: &[&[f64]],
        with_probability: bool,
    ) -> Result<(Vec<Label>, Option<Vec<Vec<f64>>>), ClassifierError> {
        let probability_output = if with_probability {
            Some(
                self.probability_output
                    .as_deref()
                    .ok_or(ClassifierError::NoProbabilityOutput)?,
            )
        } else {
            None
        };

        let input = Value::from_array(Self::to_input(batch)?)
            .map_err(|e| ClassifierError::Model(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| ClassifierError::Model(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(self.label_output.as_str())
            .ok_or_else(|| ClassifierError::Model(format!("No output '{}'", self.label_output)))?;

        let (_, labels) = output
            .try_extract_tensor::<i64>()
            .map_err(|e| ClassifierError::Model(format!("Extract error: {}", e)))?;
        let labels = labels.to_vec();

        let Some(name) = probability_output else {
            return Ok((labels, None));
        };

        let output = outputs
            .get(name)
            .ok_or_else(|| ClassifierError::Model(format!("No output '{}'", name)))?;

        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Model(format!("Extract error: {}", e)))?;

        if batch.is_empty() || data.is_empty() {
            return Ok((labels, Some(Vec::new())));
        }

        let classes = data.len() / batch.len();
        let rows: Vec<Vec<f64>> = data
            .chunks(classes.max(1))
            .map(|row| row.iter().map(|&p| p as f64).collect())
            .collect();

        Ok((labels, Some(rows)))
    }
}

impl Predict for OnnxClassifier {
    fn predict(&self, batch: &[&[f64]]) -> Result<Vec<Label>, ClassifierError> {
        self.run(batch, false).map(|(labels, _)| labels)
    }
}

impl PredictProba for OnnxClassifier {
    fn predict_proba(&self, batch: &[&[f64]]) -> Result<Vec<Vec<f64>>, ClassifierError> {
        self.predict_with_proba(batch).map(|(_, rows)| rows)
    }

    fn predict_with_proba(
        &self,
        batch: &[&[f64]],
    ) -> Result<(Vec<Label>, Vec<Vec<f64>>), ClassifierError> {
        let (labels, rows) = self.run(batch, true)?;
        Ok((labels, rows.unwrap_or_default()))
    }
}
