use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use backtest::{Scorer, ScorerConfig};
use common::{
    BacktestResult, Config, Direction, Error, HistoryProvider, HistoryRequest, Result, Series,
    Signal, SignalMode, Suggestion, Trend,
};
use risk::{PositionSizer, SizingConfig};
use strategy::{baseline_direction, Detector, DetectorConfig, Snapshot};

/// Everything the orchestrator needs besides the data source.
#[derive(Debug, Clone)]
pub struct PredictorConfig {
    pub mode: SignalMode,
    /// Single mode executes only above this backtest win rate...
    pub min_win_rate: f64,
    /// ...and with more than this many resolved historical trials.
    pub min_samples: usize,
    pub default_balance: f64,
    pub interval: String,
    pub lookback_months: u32,
    pub detector: DetectorConfig,
    pub scorer: ScorerConfig,
    pub sizing: SizingConfig,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            mode: SignalMode::default(),
            min_win_rate: 0.65,
            min_samples: 30,
            default_balance: 200.0,
            interval: "1h".to_string(),
            lookback_months: 12,
            detector: DetectorConfig::default(),
            scorer: ScorerConfig::default(),
            sizing: SizingConfig::default(),
        }
    }
}

impl PredictorConfig {
    pub fn from_config(cfg: &Config, detector: DetectorConfig) -> Self {
        Self {
            mode: cfg.signal_mode,
            min_win_rate: cfg.min_win_rate,
            min_samples: cfg.min_samples,
            default_balance: cfg.default_balance,
            interval: cfg.history_interval.clone(),
            lookback_months: cfg.history_months,
            detector,
            ..Self::default()
        }
    }
}

/// Body of a prediction request.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    pub pair: String,
    /// Risk capital; the configured default applies when absent.
    #[serde(default)]
    pub balance: Option<f64>,
    /// Overrides the configured mode for this request.
    #[serde(default)]
    pub mode: Option<SignalMode>,
}

/// Channel state of the latest bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketContext {
    pub pair: String,
    pub price: f64,
    pub channel_width: f64,
    pub upper_band: f64,
    pub lower_band: f64,
    pub trend: Trend,
    pub timestamp: DateTime<Utc>,
}

/// Legacy single-signal answer: Level-1 direction gated by its backtest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SinglePrediction {
    pub mode: SignalMode,
    #[serde(flatten)]
    pub context: Option<MarketContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<Direction>,
    pub score: f64,
    pub ntrades: usize,
    pub suggestion: Suggestion,
}

/// Multi-variant answer: every fired setup, plus the baseline backtest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiPrediction {
    pub mode: SignalMode,
    #[serde(flatten)]
    pub context: Option<MarketContext>,
    pub signals: Vec<Signal>,
    /// Win rate of the Level-1 baseline, whichever variants fired.
    pub score: f64,
    pub ntrades: usize,
    pub suggestion: Suggestion,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Prediction {
    Single(SinglePrediction),
    Multi(MultiPrediction),
}

impl Prediction {
    pub fn suggestion(&self) -> Suggestion {
        match self {
            Prediction::Single(p) => p.suggestion,
            Prediction::Multi(p) => p.suggestion,
        }
    }
}

/// The pure part of a prediction: detector, sizer and scorer over a series.
#[derive(Debug, Clone)]
pub struct Evaluator {
    detector: Detector,
    scorer: Scorer,
    min_win_rate: f64,
    min_samples: usize,
}

impl Evaluator {
    pub fn new(config: &PredictorConfig) -> Self {
        Self {
            detector: Detector::new(config.detector.clone(), PositionSizer::new(config.sizing)),
            scorer: Scorer::new(config.detector.clone(), config.scorer),
            min_win_rate: config.min_win_rate,
            min_samples: config.min_samples,
        }
    }

    pub fn evaluate(&self, series: &Series, balance: f64, mode: SignalMode) -> Prediction {
        let snapshot = match Snapshot::latest(series, self.detector.config()) {
            Ok(snapshot) => Some(snapshot),
            Err(reason) => {
                debug!(pair = %series.pair(), %reason, "Latest bar not classifiable");
                None
            }
        };
        match mode {
            SignalMode::Single => Prediction::Single(self.single(series, snapshot)),
            SignalMode::Multi => Prediction::Multi(self.multi(series, snapshot, balance)),
        }
    }

    fn single(&self, series: &Series, snapshot: Option<Snapshot>) -> SinglePrediction {
        let fired = snapshot.and_then(|s| baseline_direction(&s).map(|d| (s, d)));
        let Some((snapshot, direction)) = fired else {
            return SinglePrediction {
                mode: SignalMode::Single,
                context: None,
                signal: None,
                score: 0.0,
                ntrades: 0,
                suggestion: Suggestion::Ignore,
            };
        };

        let backtest = self.scorer.score(series);
        let suggestion = self.gate(&backtest);

        SinglePrediction {
            mode: SignalMode::Single,
            context: Some(context(series, &snapshot)),
            signal: Some(direction),
            score: backtest.win_rate,
            ntrades: backtest.sample_count,
            suggestion,
        }
    }

    fn multi(&self, series: &Series, snapshot: Option<Snapshot>, balance: f64) -> MultiPrediction {
        let signals = snapshot
            .as_ref()
            .map(|s| self.detector.evaluate(s, balance))
            .unwrap_or_default();

        let (backtest, suggestion) = if signals.is_empty() {
            (BacktestResult::empty(), Suggestion::Ignore)
        } else {
            (self.scorer.score(series), Suggestion::Execute)
        };

        MultiPrediction {
            mode: SignalMode::Multi,
            context: snapshot.as_ref().map(|s| context(series, s)),
            signals,
            score: backtest.win_rate,
            ntrades: backtest.sample_count,
            suggestion,
        }
    }

    fn gate(&self, backtest: &BacktestResult) -> Suggestion {
        if backtest.win_rate > self.min_win_rate && backtest.sample_count > self.min_samples {
            Suggestion::Execute
        } else {
            Suggestion::Ignore
        }
    }
}

fn context(series: &Series, snapshot: &Snapshot) -> MarketContext {
    MarketContext {
        pair: series.pair().to_string(),
        price: snapshot.price,
        channel_width: snapshot.channel.width,
        upper_band: snapshot.channel.upper_band,
        lower_band: snapshot.channel.lower_band,
        trend: snapshot.trend,
        timestamp: series.bars()[snapshot.index].timestamp,
    }
}

/// Fetches history and runs the evaluator for one request.
///
/// Stateless between calls: every request downloads its own series and the
/// evaluation runs on a blocking worker over that private copy.
pub struct Predictor {
    provider: Arc<dyn HistoryProvider>,
    evaluator: Arc<Evaluator>,
    config: PredictorConfig,
}

impl Predictor {
    pub fn new(provider: Arc<dyn HistoryProvider>, config: PredictorConfig) -> Self {
        Self {
            provider,
            evaluator: Arc::new(Evaluator::new(&config)),
            config,
        }
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    pub async fn predict(&self, request: PredictRequest) -> Result<Prediction> {
        let pair = request.pair.trim().to_string();
        if pair.is_empty() {
            return Err(Error::MalformedRequest("missing 'pair'".into()));
        }
        let balance = request.balance.unwrap_or(self.config.default_balance);
        if !balance.is_finite() || balance < 0.0 {
            return Err(Error::MalformedRequest(format!(
                "'balance' must be a non-negative number, got {balance}"
            )));
        }
        let mode = request.mode.unwrap_or(self.config.mode);

        let series = self
            .provider
            .fetch(&HistoryRequest {
                pair: pair.clone(),
                interval: self.config.interval.clone(),
                lookback_months: self.config.lookback_months,
            })
            .await?;
        debug!(%pair, bars = series.len(), "History loaded");

        let evaluator = self.evaluator.clone();
        let prediction = tokio::task::spawn_blocking(move || evaluator.evaluate(&series, balance, mode))
            .await
            .map_err(|e| Error::Other(format!("evaluation task failed: {e}")))?;

        info!(%pair, %mode, suggestion = ?prediction.suggestion(), "Prediction ready");
        Ok(prediction)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
