//! Walk-forward replay of the baseline (Level-1) rule.
//!
//! The score is an in-sample estimate: each historical decision is judged
//! with the bars that followed it, and the whole history is rescored on every
//! call. It describes how the baseline rule behaved on this history, not how
//! any variant would trade live.

pub mod scorer;

pub use scorer::{score, Outcome, Scorer, ScorerConfig, Trial};
