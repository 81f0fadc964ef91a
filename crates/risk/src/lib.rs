pub mod sizer;

pub use sizer::{round2, size, PositionSizer, SizingConfig, DEFAULT_RISK_FRACTION, REDUCED_RISK_FRACTION};
