use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One OHLC price bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Ordered bars for one instrument at one sampling interval.
///
/// Timestamps are strictly increasing and every price is finite. A `Series`
/// is never mutated after construction; indicators derive new arrays from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pair: String,
    bars: Vec<Bar>,
}

impl Series {
    /// Validate and wrap a bar sequence.
    pub fn new(pair: impl Into<String>, bars: Vec<Bar>) -> Result<Self> {
        let pair = pair.into();

        if let Some(bad) = bars
            .iter()
            .position(|b| ![b.open, b.high, b.low, b.close].iter().all(|v| v.is_finite()))
        {
            return Err(Error::MalformedSeries(format!(
                "{pair}: bar {bad} has a non-finite price"
            )));
        }

        if let Some(i) = bars
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(Error::MalformedSeries(format!(
                "{pair}: timestamp at bar {} does not increase ({} -> {})",
                i + 1,
                bars[i].timestamp,
                bars[i + 1].timestamp
            )));
        }

        Ok(Self { pair, bars })
    }

    pub fn pair(&self) -> &str {
        &self.pair
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }
}

/// Side of a trade setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    /// `+1.0` for buys, `-1.0` for sells. Targets sit on the signed side of
    /// entry, stops on the opposite side.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Buy => 1.0,
            Direction::Sell => -1.0,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Buy => write!(f, "buy"),
            Direction::Sell => write!(f, "sell"),
        }
    }
}

/// Coarse trend: price relative to the long moving average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Up => write!(f, "up"),
            Trend::Down => write!(f, "down"),
        }
    }
}

/// Named trade-setup rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Breakout continuation beyond the channel bands.
    Level1,
    /// Reversal back inside the bands after closing outside them.
    Level2,
    /// Scalp against a touch of the channel extreme.
    ExtremeReversal,
    /// Close beyond the channel high/low by a 0.1% margin.
    ChannelBreakout,
    /// Price hugging the channel midpoint.
    MicroRange,
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Variant::Level1 => write!(f, "level1"),
            Variant::Level2 => write!(f, "level2"),
            Variant::ExtremeReversal => write!(f, "extreme_reversal"),
            Variant::ChannelBreakout => write!(f, "channel_breakout"),
            Variant::MicroRange => write!(f, "micro_range"),
        }
    }
}

/// A fired setup for the latest bar. Prices and lot size are rounded to
/// two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub variant: Variant,
    pub direction: Direction,
    pub entry: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
    /// In `[0, 1]`.
    pub confidence: f64,
    pub lot_size: f64,
}

/// Empirical outcome of the baseline rule over history.
///
/// This is an in-sample estimate built with future bars relative to each
/// historical decision point. It is not live-tradable performance, and it
/// always describes the Level-1 rule even when another variant fired.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// In `[0, 1]`.
    pub win_rate: f64,
    pub sample_count: usize,
}

impl BacktestResult {
    pub fn empty() -> Self {
        Self {
            win_rate: 0.0,
            sample_count: 0,
        }
    }
}

/// Final recommendation attached to a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suggestion {
    Execute,
    Ignore,
}

/// How the orchestrator turns detector output into a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SignalMode {
    /// Level-1 only, gated by backtest win rate and sample count.
    Single,
    /// Every fired variant, executed whenever at least one fires.
    #[default]
    Multi,
}

impl FromStr for SignalMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "single" => Ok(SignalMode::Single),
            "multi" => Ok(SignalMode::Multi),
            other => Err(Error::Config(format!(
                "signal mode must be 'single' or 'multi', got: '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for SignalMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalMode::Single => write!(f, "single"),
            SignalMode::Multi => write!(f, "multi"),
        }
    }
}
