use serde::{Deserialize, Serialize};

use common::{Error, Result};
use risk::{DEFAULT_RISK_FRACTION, REDUCED_RISK_FRACTION};

use crate::indicators::{BAND_FRACTION, CHANNEL_WINDOW, TREND_WINDOW};

/// Detector parameters, optionally loaded from TOML.
///
/// Example `config/detector.toml`:
/// ```toml
/// channel_window = 168
/// trend_window = 200
/// band_fraction = 0.1
/// risk_fraction = 0.02
/// reduced_risk_fraction = 0.01
/// ```
/// Missing keys keep their defaults.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DetectorConfig {
    /// Bars in the trailing channel window.
    pub channel_window: usize,
    /// Bars in the trend moving average.
    pub trend_window: usize,
    /// Inner band offset from the midpoint, as a fraction of channel width.
    pub band_fraction: f64,
    /// Risk fraction for standard setups.
    pub risk_fraction: f64,
    /// Risk fraction for scalp setups (extreme reversal, micro-range).
    pub reduced_risk_fraction: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            channel_window: CHANNEL_WINDOW,
            trend_window: TREND_WINDOW,
            band_fraction: BAND_FRACTION,
            risk_fraction: DEFAULT_RISK_FRACTION,
            reduced_risk_fraction: REDUCED_RISK_FRACTION,
        }
    }
}

impl DetectorConfig {
    /// Bars required before any rule can be evaluated: the longer window
    /// plus the current bar.
    pub fn min_bars(&self) -> usize {
        self.channel_window.max(self.trend_window) + 1
    }

    /// Load from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
            .map_err(|e| Error::Config(format!("failed to parse detector config at '{path}': {e}")))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.channel_window == 0 || self.trend_window == 0 {
            return Err(Error::Config("window sizes must be at least 1".into()));
        }
        if !(self.band_fraction.is_finite() && self.band_fraction >= 0.0) {
            return Err(Error::Config(format!(
                "band_fraction must be a non-negative number, got {}",
                self.band_fraction
            )));
        }
        Ok(())
    }
}
