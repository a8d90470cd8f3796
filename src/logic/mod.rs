//! Logic Module - Feature assembly & anomaly scoring
//!
//! - `features/` - readings -> schema-ordered feature vector
//! - `model/` - classifier capabilities, scoring, score records
//! - `detector` - the two wired together over a loaded model

pub mod clock;
pub mod config;
pub mod detector;
pub mod features;
pub mod model;
