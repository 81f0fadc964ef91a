use thiserror::Error;
use tracing::debug;

use common::{Direction, Series, Signal, Trend};
use risk::{round2, PositionSizer};

use crate::config::DetectorConfig;
use crate::indicators::channel::channel_window_at;
use crate::indicators::{trend_at, Channel};
use crate::rules::{self, Risk, RuleSpec, RULES};

/// Everything a rule guard may look at for one evaluation point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    /// Bar index this snapshot was taken at.
    pub index: usize,
    /// Close at `index`.
    pub price: f64,
    /// Close at `index - 1`.
    pub prev_close: f64,
    pub trend: Trend,
    pub channel: Channel,
}

/// Why no snapshot could be taken. Expected for short histories and never
/// surfaced to callers as a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NoSnapshot {
    #[error("insufficient history: have {have} bars, need {need}")]
    InsufficientHistory { have: usize, need: usize },
}

impl Snapshot {
    /// Snapshot of the most recent bar.
    pub fn latest(series: &Series, config: &DetectorConfig) -> Result<Self, NoSnapshot> {
        let need = config.min_bars();
        if series.len() < need {
            return Err(NoSnapshot::InsufficientHistory {
                have: series.len(),
                need,
            });
        }
        Self::at(series, series.len() - 1, config)
    }

    /// Snapshot at an arbitrary index. Requires `index + 1 >= min_bars()`.
    pub fn at(series: &Series, index: usize, config: &DetectorConfig) -> Result<Self, NoSnapshot> {
        let need = config.min_bars();
        let insufficient = NoSnapshot::InsufficientHistory {
            have: (index + 1).min(series.len()),
            need,
        };
        if index + 1 < need || index >= series.len() {
            return Err(insufficient);
        }

        let trend = trend_at(series, index, config.trend_window).ok_or(insufficient)?;
        let channel = channel_window_at(series, index, config.channel_window, config.band_fraction)
            .ok_or(insufficient)?;
        let bars = series.bars();

        Ok(Self {
            index,
            price: bars[index].close,
            prev_close: bars[index - 1].close,
            trend,
            channel,
        })
    }
}

/// Direction implied by the Level-1 rule alone, if any.
pub fn baseline_direction(snapshot: &Snapshot) -> Option<Direction> {
    let rule = rules::baseline();
    rule.sides
        .iter()
        .copied()
        .find(|&side| (rule.guard)(snapshot, side))
}

/// Evaluates the rule table against the latest bar of a series.
#[derive(Debug, Clone, Default)]
pub struct Detector {
    config: DetectorConfig,
    sizer: PositionSizer,
}

impl Detector {
    pub fn new(config: DetectorConfig, sizer: PositionSizer) -> Self {
        Self { config, sizer }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// All setups firing on the latest bar, in rule-table order.
    /// Empty when the series is too short to classify.
    pub fn detect(&self, series: &Series, balance: f64) -> Vec<Signal> {
        match Snapshot::latest(series, &self.config) {
            Ok(snapshot) => self.evaluate(&snapshot, balance),
            Err(reason) => {
                debug!(pair = %series.pair(), %reason, "No snapshot; detector idle");
                Vec::new()
            }
        }
    }

    /// Run every rule against one snapshot.
    pub fn evaluate(&self, snapshot: &Snapshot, balance: f64) -> Vec<Signal> {
        let signals: Vec<Signal> = RULES
            .iter()
            .flat_map(|rule| {
                rule.sides
                    .iter()
                    .copied()
                    .filter(move |&side| (rule.guard)(snapshot, side))
                    .map(move |side| self.build_signal(rule, side, snapshot, balance))
            })
            .collect();

        debug!(
            index = snapshot.index,
            price = snapshot.price,
            trend = %snapshot.trend,
            width = snapshot.channel.width,
            fired = signals.len(),
            "Detector evaluated"
        );
        signals
    }

    fn build_signal(
        &self,
        rule: &RuleSpec,
        side: Direction,
        snapshot: &Snapshot,
        balance: f64,
    ) -> Signal {
        let width = snapshot.channel.width;
        let entry = snapshot.price;
        let target = entry + side.sign() * rule.target_width * width;
        let stop = entry - side.sign() * rule.stop_width * width;
        let risk_fraction = match rule.risk {
            Risk::Standard => self.config.risk_fraction,
            Risk::Reduced => self.config.reduced_risk_fraction,
        };

        Signal {
            variant: rule.variant,
            direction: side,
            entry,
            take_profit: round2(target),
            stop_loss: round2(stop),
            confidence: rule.confidence,
            lot_size: round2(self.sizer.size(balance, entry, stop, risk_fraction)),
        }
    }
}

/// Detect with default parameters and sizing bounds.
pub fn detect(series: &Series, balance: f64) -> Vec<Signal> {
    Detector::default().detect(series, balance)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
