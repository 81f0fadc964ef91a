use serde::{Deserialize, Serialize};
use tracing::trace;

/// Fraction of balance put at risk by a standard setup.
pub const DEFAULT_RISK_FRACTION: f64 = 0.02;

/// Fraction of balance put at risk by scalp-style setups.
pub const REDUCED_RISK_FRACTION: f64 = 0.01;

/// Bounds applied to every computed lot size.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SizingConfig {
    /// Floor for any lot size (e.g. 0.01 = one micro lot).
    pub min_lot: f64,
    /// Ceiling is `balance / max_lot_divisor`.
    pub max_lot_divisor: f64,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            min_lot: 0.01,
            max_lot_divisor: 100.0,
        }
    }
}

/// Converts risk capital and stop distance into a trade size.
///
/// Total over every `f64` input: non-finite or negative capital is treated
/// as zero and a zero or non-finite stop distance as one, so the result is
/// always a finite number no smaller than `min_lot`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionSizer {
    config: SizingConfig,
}

impl PositionSizer {
    pub fn new(config: SizingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SizingConfig {
        &self.config
    }

    /// `max(min(round2(balance * risk_fraction / |entry - stop|), balance / divisor), min_lot)`
    pub fn size(&self, balance: f64, entry: f64, stop: f64, risk_fraction: f64) -> f64 {
        let balance = non_negative(balance);
        let risk_fraction = non_negative(risk_fraction);

        let distance = (entry - stop).abs();
        let distance = if distance.is_finite() && distance > 0.0 {
            distance
        } else {
            1.0
        };

        let raw = (balance * risk_fraction) / distance;
        let ceiling = balance / self.config.max_lot_divisor;
        let lot = round2(raw).min(ceiling).max(self.config.min_lot);

        trace!(balance, distance, raw, ceiling, lot, "Position sized");
        lot
    }
}

/// Size with the default bounds.
pub fn size(balance: f64, entry: f64, stop: f64, risk_fraction: f64) -> f64 {
    PositionSizer::default().size(balance, entry, stop, risk_fraction)
}

/// Round to two decimals, exact halves to even.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
