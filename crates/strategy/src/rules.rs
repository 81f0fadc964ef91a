//! Declarative rule table for the channel detector.
//!
//! Each entry pairs a guard with the width multiples used to place the
//! target and stop. Targets sit `target_width * width` on the trade side of
//! entry, stops `stop_width * width` on the other side. The detector walks
//! the table in order and every rule sees the same snapshot.

use common::{Direction, Trend, Variant};

use crate::detector::Snapshot;

/// Close must clear the channel high/low by this fraction for a breakout.
pub const BREAKOUT_MARGIN: f64 = 0.001;

/// Half-width of the micro-range around the band midpoint, as a fraction of
/// channel width.
pub const MICRO_BAND: f64 = 0.05;

/// Which risk fraction a rule sizes with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Risk {
    Standard,
    Reduced,
}

pub struct RuleSpec {
    pub variant: Variant,
    /// Sides to test, in output order.
    pub sides: &'static [Direction],
    pub guard: fn(&Snapshot, Direction) -> bool,
    pub target_width: f64,
    pub stop_width: f64,
    pub confidence: f64,
    pub risk: Risk,
}

impl std::fmt::Debug for RuleSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSpec")
            .field("variant", &self.variant)
            .field("target_width", &self.target_width)
            .field("stop_width", &self.stop_width)
            .field("confidence", &self.confidence)
            .field("risk", &self.risk)
            .finish()
    }
}

pub static RULES: [RuleSpec; 5] = [
    RuleSpec {
        variant: Variant::Level1,
        sides: &[Direction::Buy, Direction::Sell],
        guard: level1,
        target_width: 0.2,
        stop_width: 0.1,
        confidence: 1.0,
        risk: Risk::Standard,
    },
    RuleSpec {
        variant: Variant::Level2,
        sides: &[Direction::Sell, Direction::Buy],
        guard: level2,
        target_width: 0.1,
        stop_width: 0.1,
        confidence: 0.8,
        risk: Risk::Standard,
    },
    RuleSpec {
        variant: Variant::ExtremeReversal,
        sides: &[Direction::Sell, Direction::Buy],
        guard: extreme_reversal,
        target_width: 0.1,
        stop_width: 0.1,
        confidence: 0.6,
        risk: Risk::Reduced,
    },
    RuleSpec {
        variant: Variant::ChannelBreakout,
        sides: &[Direction::Buy, Direction::Sell],
        guard: channel_breakout,
        target_width: 0.3,
        stop_width: 0.1,
        confidence: 0.7,
        risk: Risk::Standard,
    },
    RuleSpec {
        variant: Variant::MicroRange,
        sides: &[Direction::Buy, Direction::Sell],
        guard: micro_range,
        target_width: 0.05,
        stop_width: 0.05,
        confidence: 0.5,
        risk: Risk::Reduced,
    },
];

/// The Level-1 rule. Also the baseline replayed by the backtest.
pub fn baseline() -> &'static RuleSpec {
    &RULES[0]
}

fn with_trend(trend: Trend, side: Direction) -> bool {
    matches!(
        (trend, side),
        (Trend::Up, Direction::Buy) | (Trend::Down, Direction::Sell)
    )
}

/// Breakout continuation beyond the inner bands, with the trend.
pub fn level1(s: &Snapshot, side: Direction) -> bool {
    let beyond = match side {
        Direction::Buy => s.price > s.channel.upper_band,
        Direction::Sell => s.price < s.channel.lower_band,
    };
    beyond && with_trend(s.trend, side)
}

/// Previous close outside the bands, current close back inside.
pub fn level2(s: &Snapshot, side: Direction) -> bool {
    let ch = &s.channel;
    let inside = ch.lower_band < s.price && s.price < ch.upper_band;
    let came_from_outside = match side {
        Direction::Sell => s.prev_close > ch.upper_band,
        Direction::Buy => s.prev_close < ch.lower_band,
    };
    inside && came_from_outside && with_trend(s.trend, side)
}

/// Fade a touch of the channel extreme, regardless of trend.
pub fn extreme_reversal(s: &Snapshot, side: Direction) -> bool {
    match side {
        Direction::Sell => s.price >= s.channel.high,
        Direction::Buy => s.price <= s.channel.low,
    }
}

/// Close beyond the channel extreme by `BREAKOUT_MARGIN`, with the trend.
///
/// The channel window includes the current bar, so this only fires when a
/// bar's close lies outside its own high/low range.
pub fn channel_breakout(s: &Snapshot, side: Direction) -> bool {
    let beyond = match side {
        Direction::Buy => s.price > s.channel.high * (1.0 + BREAKOUT_MARGIN),
        Direction::Sell => s.price < s.channel.low * (1.0 - BREAKOUT_MARGIN),
    };
    beyond && with_trend(s.trend, side)
}

pub fn micro_range(s: &Snapshot, side: Direction) -> bool {
    let ch = &s.channel;
    let micro_mid = (ch.upper_band + ch.lower_band) / 2.0;
    (s.price - micro_mid).abs() < MICRO_BAND * ch.width && with_trend(s.trend, side)
}
