use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use common::{Bar, Error, HistoryProvider, HistoryRequest, Result, Series};

use super::symbol::yahoo_symbol;

const BASE_URL: &str = "https://query2.finance.yahoo.com";

/// History client for Yahoo Finance's v8 chart API.
pub struct YahooClient {
    base_url: String,
    http: Client,
}

impl YahooClient {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Point the client at a different host (mirrors, test servers).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::builder()
                .use_rustls_tls()
                .timeout(StdDuration::from_secs(30))
                .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    fn chart_url(&self, symbol: &str, interval: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> String {
        format!(
            "{}/v8/finance/chart/{symbol}?period1={}&period2={}&interval={interval}",
            self.base_url,
            start.timestamp(),
            end.timestamp()
        )
    }
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryProvider for YahooClient {
    async fn fetch(&self, request: &HistoryRequest) -> Result<Series> {
        let symbol = yahoo_symbol(&request.pair)?;
        let end = Utc::now();
        let start = end - Duration::days(30 * i64::from(request.lookback_months));
        let url = self.chart_url(&symbol, &request.interval, start, end);

        debug!(pair = %request.pair, %symbol, interval = %request.interval, "Fetching history");
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;

        if status == StatusCode::NOT_FOUND {
            return Err(Error::SymbolNotFound(symbol));
        }
        if !status.is_success() {
            return Err(Error::Http(format!("HTTP {status}: {body}")));
        }

        let chart: ChartResponse =
            serde_json::from_str(&body).map_err(|e| Error::Data(e.to_string()))?;
        parse_chart(&request.pair, &symbol, chart)
    }
}

/// Turn a chart payload into a validated series.
///
/// Rows with any missing price are dropped, as are rows whose timestamp does
/// not advance past the previous kept row.
fn parse_chart(pair: &str, symbol: &str, chart: ChartResponse) -> Result<Series> {
    let result = match (chart.chart.result, chart.chart.error) {
        (_, Some(err)) if err.code == "Not Found" => {
            return Err(Error::SymbolNotFound(symbol.to_string()))
        }
        (_, Some(err)) => return Err(Error::Data(format!("{}: {}", err.code, err.description))),
        (Some(result), None) => result,
        (None, None) => return Err(Error::Data("empty result with no error".into())),
    };

    let data = result
        .into_iter()
        .next()
        .ok_or_else(|| Error::Data("result array is empty".into()))?;
    let timestamps = data.timestamp.unwrap_or_default();
    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| Error::Data("no quote data".into()))?;

    let mut bars: Vec<Bar> = Vec::with_capacity(timestamps.len());
    let mut skipped = 0usize;

    for (i, &ts) in timestamps.iter().enumerate() {
        let field = |v: &Vec<Option<f64>>| v.get(i).copied().flatten().filter(|x| x.is_finite());
        let (Some(open), Some(high), Some(low), Some(close)) = (
            field(&quote.open),
            field(&quote.high),
            field(&quote.low),
            field(&quote.close),
        ) else {
            skipped += 1;
            continue;
        };
        let timestamp = DateTime::from_timestamp(ts, 0)
            .ok_or_else(|| Error::Data(format!("invalid timestamp: {ts}")))?;
        if bars.last().is_some_and(|prev| prev.timestamp >= timestamp) {
            skipped += 1;
            continue;
        }
        bars.push(Bar {
            timestamp,
            open,
            high,
            low,
            close,
        });
    }

    if skipped > 0 {
        warn!(%pair, skipped, kept = bars.len(), "Dropped incomplete or out-of-order bars");
    }
    if bars.is_empty() {
        return Err(Error::SymbolNotFound(symbol.to_string()));
    }

    Series::new(pair, bars)
}

// ─── Response types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Series> {
        let chart: ChartResponse = serde_json::from_str(json).unwrap();
        parse_chart("EURUSD", "EURUSD=X", chart)
    }

    #[test]
    fn parses_bars_and_drops_gaps() {
        let series = parse(
            r#"{"chart":{"result":[{
                "timestamp":[1700000000,1700003600,1700007200,1700007200],
                "indicators":{"quote":[{
                    "open":[1.08,1.09,null,1.10],
                    "high":[1.09,1.10,1.11,1.12],
                    "low":[1.07,1.08,1.09,1.09],
                    "close":[1.085,1.095,1.10,1.11]
                }]}
            }],"error":null}}"#,
        )
        .unwrap();
        // Row 3 has a null open; row 4 then repeats row 3's timestamp but is
        // still the first bar at that time, so it is kept.
        assert_eq!(series.len(), 3);
        assert_eq!(series.pair(), "EURUSD");
        assert_eq!(series.closes(), vec![1.085, 1.095, 1.11]);
    }

    #[test]
    fn repeated_timestamp_keeps_first_bar() {
        let series = parse(
            r#"{"chart":{"result":[{
                "timestamp":[1700000000,1700000000,1700003600],
                "indicators":{"quote":[{
                    "open":[1.0,2.0,3.0],"high":[1.0,2.0,3.0],
                    "low":[1.0,2.0,3.0],"close":[1.0,2.0,3.0]
                }]}
            }],"error":null}}"#,
        )
        .unwrap();
        assert_eq!(series.closes(), vec![1.0, 3.0]);
    }

    #[test]
    fn not_found_error_maps_to_symbol_not_found() {
        let err = parse(
            r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::SymbolNotFound(s) if s == "EURUSD=X"));
    }

    #[test]
    fn other_chart_errors_are_data_errors() {
        let err = parse(
            r#"{"chart":{"result":null,"error":{"code":"Bad Request","description":"Invalid interval"}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Data(_)));
    }

    #[test]
    fn empty_quote_is_symbol_not_found() {
        let err = parse(
            r#"{"chart":{"result":[{"timestamp":null,"indicators":{"quote":[{}]}}],"error":null}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::SymbolNotFound(_)));
    }

    #[test]
    fn chart_url_carries_range_and_interval() {
        let client = YahooClient::with_base_url("http://localhost:9999/");
        let start = DateTime::from_timestamp(1_000, 0).unwrap();
        let end = DateTime::from_timestamp(2_000, 0).unwrap();
        assert_eq!(
            client.chart_url("GC=F", "1h", start, end),
            "http://localhost:9999/v8/finance/chart/GC=F?period1=1000&period2=2000&interval=1h"
        );
    }
}
