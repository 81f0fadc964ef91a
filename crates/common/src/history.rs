use async_trait::async_trait;

use crate::{Result, Series};

/// Parameters for one history download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    /// Pair identifier as the caller names it, e.g. "EURUSD" or "XAUUSD".
    pub pair: String,
    /// Sampling interval in the provider's notation, e.g. "1h".
    pub interval: String,
    /// How far back to fetch, in 30-day months.
    pub lookback_months: u32,
}

/// Abstraction over the historical data source.
///
/// `YahooClient` implements this for live requests; tests use in-memory
/// fixtures. Every call returns a freshly built `Series` owned by the caller,
/// so concurrent requests never share bar storage.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    async fn fetch(&self, request: &HistoryRequest) -> Result<Series>;
}
