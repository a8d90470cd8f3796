//! Cross-sensor aggregate statistics

use super::layout::AGGREGATE_FEATURES;

/// Aggregates over the raw block
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AggregateStats {
    pub mean: f64,
    /// Population standard deviation (ddof = 0)
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
}

impl AggregateStats {
    /// Inputs are finite (coercion rejects NaN/inf). Empty input yields all
    /// zeros; a single value has std 0.0
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self {
            mean,
            std: variance.sqrt(),
            min,
            max,
            range: max - min,
        }
    }

    /// Values in `AGGREGATE_FEATURES` order
    pub fn to_array(&self) -> [f64; AGGREGATE_FEATURES.len()] {
        [self.mean, self.std, self.min, self.max, self.range]
    }
}
