use serde::{Deserialize, Serialize};
use tracing::debug;

use common::{BacktestResult, Direction, Series};
use strategy::indicators::{channels, classify_trend, rolling_mean, TREND_WINDOW};
use strategy::{baseline_direction, DetectorConfig, Snapshot};

/// Replay parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScorerConfig {
    /// First bar index evaluated.
    pub start_index: usize,
    /// Bars scanned after each decision for a take-profit or stop touch.
    pub lookahead: usize,
    /// Take-profit and stop distance, as a fraction of the decision bar's
    /// high-low range.
    pub exit_fraction: f64,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            start_index: TREND_WINDOW,
            lookahead: 6,
            exit_fraction: 0.25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
}

/// One historical baseline signal and how it played out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trial {
    pub index: usize,
    pub direction: Direction,
    pub entry: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
    /// `None` when neither level was touched inside the lookahead window.
    pub outcome: Option<Outcome>,
}

#[derive(Debug, Clone, Default)]
pub struct Scorer {
    detector: DetectorConfig,
    config: ScorerConfig,
}

impl Scorer {
    pub fn new(detector: DetectorConfig, config: ScorerConfig) -> Self {
        Self { detector, config }
    }

    /// Every baseline signal in `start_index ..= len - 3`, with its outcome.
    pub fn simulate(&self, series: &Series) -> Vec<Trial> {
        let len = series.len();
        if len < self.detector.min_bars() {
            return Vec::new();
        }

        let bars = series.bars();
        let closes = series.closes();
        let averages = rolling_mean(&closes, self.detector.trend_window);
        let channels = channels(
            series,
            self.detector.channel_window,
            self.detector.band_fraction,
        );

        let first = self.config.start_index.max(1);
        let end = len.saturating_sub(2);

        (first..end)
            .filter_map(|i| {
                let snapshot = Snapshot {
                    index: i,
                    price: closes[i],
                    prev_close: closes[i - 1],
                    trend: classify_trend(closes[i], averages[i]?),
                    channel: channels[i]?,
                };
                let direction = baseline_direction(&snapshot)?;

                let entry = closes[i];
                let offset = (bars[i].high - bars[i].low) * self.config.exit_fraction;
                let take_profit = entry + direction.sign() * offset;
                let stop_loss = entry - direction.sign() * offset;

                let last = (i + self.config.lookahead).min(len - 1);
                let outcome = resolve(direction, take_profit, stop_loss, &closes[i + 1..=last]);

                Some(Trial {
                    index: i,
                    direction,
                    entry,
                    take_profit,
                    stop_loss,
                    outcome,
                })
            })
            .collect()
    }

    /// Win rate over trials that resolved; `(0.0, 0)` when none did.
    pub fn score(&self, series: &Series) -> BacktestResult {
        let trials = self.simulate(series);
        let (wins, samples) = trials
            .iter()
            .filter_map(|t| t.outcome)
            .fold((0usize, 0usize), |(wins, samples), outcome| {
                (wins + usize::from(outcome == Outcome::Win), samples + 1)
            });

        debug!(
            pair = %series.pair(),
            signals = trials.len(),
            samples,
            wins,
            "Baseline backtest scored"
        );

        if samples == 0 {
            return BacktestResult::empty();
        }
        BacktestResult {
            win_rate: wins as f64 / samples as f64,
            sample_count: samples,
        }
    }
}

/// Score with default parameters.
pub fn score(series: &Series) -> BacktestResult {
    Scorer::default().score(series)
}

/// First close in `window` that reaches either level decides the trial.
/// The take-profit check runs first on each bar.
fn resolve(
    direction: Direction,
    take_profit: f64,
    stop_loss: f64,
    window: &[f64],
) -> Option<Outcome> {
    window.iter().find_map(|&close| match direction {
        Direction::Buy if close >= take_profit => Some(Outcome::Win),
        Direction::Buy if close <= stop_loss => Some(Outcome::Loss),
        Direction::Sell if close <= take_profit => Some(Outcome::Win),
        Direction::Sell if close >= stop_loss => Some(Outcome::Loss),
        _ => None,
    })
}

// ─── Tests ────────────────────────────────────────────────────────────────────
