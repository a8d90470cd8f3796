//! Features Module - Feature Assembly Engine
//!
//! Turns a sparse channel->reading map into the fixed-order vector the model
//! was trained on.

pub mod layout;
pub mod readings;
pub mod stats;
pub mod calendar;
pub mod vector;

#[cfg(test)]
mod tests;

// Re-export common types
pub use layout::{FeatureSchema, SchemaError, SchemaInfo, LayoutCheck};
pub use readings::{SensorReadings, ReadingValue, ChannelIssue};
pub use vector::{FeatureVector, FeatureAssembler, Reconciliation, assemble};
