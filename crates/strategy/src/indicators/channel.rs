//! Trailing channel: highest high / lowest low over a lookback window,
//! plus the inner bands at `mid ± band_fraction * width`.
//!
//! All functions here are pure. They read the series and return freshly
//! allocated values; nothing is cached on or written back to the input.

use common::Series;
use serde::Serialize;

/// One trading week of hourly bars.
pub const CHANNEL_WINDOW: usize = 168;

/// Distance of the inner bands from the midpoint, as a fraction of width.
pub const BAND_FRACTION: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Channel {
    pub high: f64,
    pub low: f64,
    pub mid: f64,
    pub width: f64,
    pub upper_band: f64,
    pub lower_band: f64,
}

impl Channel {
    pub fn from_extremes(high: f64, low: f64, band_fraction: f64) -> Self {
        let mid = (high + low) / 2.0;
        let width = high - low;
        Self {
            high,
            low,
            mid,
            width,
            upper_band: mid + band_fraction * width,
            lower_band: mid - band_fraction * width,
        }
    }
}

/// Channel for the default 168-bar window ending at `index` (inclusive).
/// `None` when `index < 167` or `index` is past the end of the series.
pub fn channel_at(series: &Series, index: usize) -> Option<Channel> {
    channel_window_at(series, index, CHANNEL_WINDOW, BAND_FRACTION)
}

/// Channel for an arbitrary window ending at `index` (inclusive).
pub fn channel_window_at(
    series: &Series,
    index: usize,
    window: usize,
    band_fraction: f64,
) -> Option<Channel> {
    if window == 0 || index >= series.len() || index + 1 < window {
        return None;
    }
    let bars = &series.bars()[index + 1 - window..=index];
    let high = bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let low = bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    Some(Channel::from_extremes(high, low, band_fraction))
}

/// Channel at every index of the series, `None` until the window fills.
pub fn channels(series: &Series, window: usize, band_fraction: f64) -> Vec<Option<Channel>> {
    let highs = rolling_max(&series.highs(), window);
    let lows = rolling_min(&series.lows(), window);
    highs
        .into_iter()
        .zip(lows)
        .map(|(h, l)| Some(Channel::from_extremes(h?, l?, band_fraction)))
        .collect()
}

/// `max(values[i+1-window..=i])` at each `i`, `None` before the window fills.
pub fn rolling_max(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| w.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

/// `min(values[i+1-window..=i])` at each `i`, `None` before the window fills.
pub fn rolling_min(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| w.iter().copied().fold(f64::INFINITY, f64::min))
}

pub(crate) fn rolling(
    values: &[f64],
    window: usize,
    reduce: impl Fn(&[f64]) -> f64,
) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if window == 0 || i + 1 < window {
                None
            } else {
                Some(reduce(&values[i + 1 - window..=i]))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use common::Bar;

    fn make_series(data: &[(f64, f64, f64)]) -> Series {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let bars = data
            .iter()
            .enumerate()
            .map(|(i, &(high, low, close))| Bar {
                timestamp: start + Duration::hours(i as i64),
                open: close,
                high,
                low,
                close,
            })
            .collect();
        Series::new("TEST", bars).unwrap()
    }

    #[test]
    fn channel_geometry() {
        let ch = Channel::from_extremes(110.0, 90.0, BAND_FRACTION);
        assert_eq!(ch.mid, 100.0);
        assert_eq!(ch.width, 20.0);
        assert_eq!(ch.upper_band, 102.0);
        assert_eq!(ch.lower_band, 98.0);
    }

    #[test]
    fn rolling_extremes_fill_after_window() {
        let values = [3.0, 1.0, 4.0, 1.0, 5.0];
        assert_eq!(
            rolling_max(&values, 3),
            vec![None, None, Some(4.0), Some(4.0), Some(5.0)]
        );
        assert_eq!(
            rolling_min(&values, 3),
            vec![None, None, Some(1.0), Some(1.0), Some(1.0)]
        );
    }

    #[test]
    fn zero_window_is_never_defined() {
        assert_eq!(rolling_max(&[1.0, 2.0], 0), vec![None, None]);
    }

    #[test]
    fn channel_window_uses_inclusive_range() {
        let series = make_series(&[(10.0, 5.0, 7.0), (12.0, 6.0, 8.0), (11.0, 4.0, 9.0)]);
        assert!(channel_window_at(&series, 1, 3, BAND_FRACTION).is_none());
        let ch = channel_window_at(&series, 2, 3, BAND_FRACTION).unwrap();
        assert_eq!(ch.high, 12.0);
        assert_eq!(ch.low, 4.0);
        let ch = channel_window_at(&series, 2, 2, BAND_FRACTION).unwrap();
        assert_eq!(ch.low, 4.0);
        assert_eq!(ch.high, 12.0);
        assert!(channel_window_at(&series, 3, 2, BAND_FRACTION).is_none());
    }

    #[test]
    fn default_channel_needs_168_bars() {
        let data: Vec<(f64, f64, f64)> = (0..200)
            .map(|i| (i as f64 + 1.0, i as f64 - 1.0, i as f64))
            .collect();
        let series = make_series(&data);
        assert!(channel_at(&series, 166).is_none());
        let ch = channel_at(&series, 167).unwrap();
        assert_eq!(ch.high, 168.0);
        assert_eq!(ch.low, -1.0);
        let ch = channel_at(&series, 199).unwrap();
        assert_eq!(ch.high, 200.0);
        assert_eq!(ch.low, 31.0);
    }

    #[test]
    fn channel_array_agrees_with_point_lookup() {
        let data: Vec<(f64, f64, f64)> = (0..40)
            .map(|i| {
                let c = 100.0 + ((i * 7) % 11) as f64;
                (c + 2.0, c - 3.0, c)
            })
            .collect();
        let series = make_series(&data);
        let all = channels(&series, 10, BAND_FRACTION);
        assert_eq!(all.len(), series.len());
        for (i, ch) in all.iter().enumerate() {
            assert_eq!(*ch, channel_window_at(&series, i, 10, BAND_FRACTION));
        }
    }
}
