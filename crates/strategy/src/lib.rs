//! Channel statistics and the multi-variant setup detector.

pub mod config;
pub mod detector;
pub mod indicators;
pub mod rules;

pub use config::DetectorConfig;
pub use detector::{baseline_direction, detect, Detector, NoSnapshot, Snapshot};
pub use indicators::{channel_at, trailing_average, Channel};
pub use rules::{Risk, RuleSpec, RULES};
