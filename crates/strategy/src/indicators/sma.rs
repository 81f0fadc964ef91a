use common::{Series, Trend};

use super::channel::rolling;

/// Long moving average used for trend classification.
pub const TREND_WINDOW: usize = 200;

/// Simple mean of `close` over the `window` bars ending at `index` (inclusive).
/// Returns `None` if `index < window - 1` or `index` is out of range.
pub fn trailing_average(series: &Series, index: usize, window: usize) -> Option<f64> {
    if window == 0 || index >= series.len() || index + 1 < window {
        return None;
    }
    let bars = &series.bars()[index + 1 - window..=index];
    Some(bars.iter().map(|b| b.close).sum::<f64>() / window as f64)
}

/// Simple moving average at every index, `None` before the window fills.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// `Up` when the close at `index` is strictly above its trailing average.
pub fn trend_at(series: &Series, index: usize, window: usize) -> Option<Trend> {
    let average = trailing_average(series, index, window)?;
    Some(classify_trend(series.bars()[index].close, average))
}

/// `Up` iff `close > average`.
pub fn classify_trend(close: f64, average: f64) -> Trend {
    if close > average {
        Trend::Up
    } else {
        Trend::Down
    }
}
