pub mod channel;
pub mod sma;

pub use channel::{channel_at, channel_window_at, channels, rolling_max, rolling_min, Channel, BAND_FRACTION, CHANNEL_WINDOW};
pub use sma::{classify_trend, rolling_mean, trailing_average, trend_at, TREND_WINDOW};
