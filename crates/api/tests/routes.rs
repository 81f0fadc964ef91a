use std::sync::Arc;

use api::{app, AppState};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use chrono::{Duration, TimeZone, Utc};
use common::{Bar, Error, HistoryProvider, HistoryRequest, Result, Series, SignalMode};
use engine::{Predictor, PredictorConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Serves a rising hourly series for any pair except a few reserved names.
struct FixtureHistory;

#[async_trait]
impl HistoryProvider for FixtureHistory {
    async fn fetch(&self, request: &HistoryRequest) -> Result<Series> {
        match request.pair.as_str() {
            "MISSING" => Err(Error::SymbolNotFound("MISSING=X".into())),
            "UPSTREAM" => Err(Error::Http("connection reset".into())),
            "BROKEN" => Err(Error::Other("worker crashed".into())),
            pair => {
                let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
                let bars = (0..400)
                    .map(|i| {
                        let close = 100.0 + i as f64;
                        Bar {
                            timestamp: start + Duration::hours(i),
                            open: close,
                            high: close + 0.5,
                            low: close - 0.5,
                            close,
                        }
                    })
                    .collect();
                Series::new(pair, bars)
            }
        }
    }
}

fn router(mode: SignalMode) -> axum::Router {
    let predictor = Predictor::new(
        Arc::new(FixtureHistory),
        PredictorConfig {
            mode,
            ..PredictorConfig::default()
        },
    );
    app(AppState {
        predictor: Arc::new(predictor),
    })
}

async fn post_predict(mode: SignalMode, body: &str) -> (StatusCode, Value) {
    let response = router(mode)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn healthz_reports_mode() {
    let response = router(SignalMode::Single)
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({"status": "ok", "mode": "single", "interval": "1h"}));
}

#[tokio::test]
async fn multi_mode_lists_signals() {
    let (status, body) = post_predict(SignalMode::Multi, r#"{"pair":"EURUSD","balance":1000}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["suggestion"], "execute");
    assert_eq!(body["signals"][0]["variant"], "level1");
    assert_eq!(body["signals"][0]["lot_size"], 1.19);
    assert_eq!(body["ntrades"], 198);
}

#[tokio::test]
async fn single_mode_gates_on_backtest() {
    let (status, body) = post_predict(SignalMode::Multi, r#"{"pair":"XAUUSD","mode":"single"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "single");
    assert_eq!(body["signal"], "buy");
    assert_eq!(body["score"], 1.0);
    assert_eq!(body["suggestion"], "execute");
    assert_eq!(body["pair"], "XAUUSD");
}

#[tokio::test]
async fn malformed_bodies_are_bad_requests() {
    for body in [
        r#"{"balance": 100}"#,
        r#"{"pair":"EURUSD","balance":"lots"}"#,
        r#"{"pair":"EURUSD","mode":"both"}"#,
        "not json",
    ] {
        let (status, json) = post_predict(SignalMode::Multi, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert!(json["error"].is_string());
    }
}

#[tokio::test]
async fn unknown_symbol_is_not_found() {
    let (status, body) = post_predict(SignalMode::Multi, r#"{"pair":"MISSING"}"#).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("MISSING=X"));
}

#[tokio::test]
async fn upstream_and_internal_failures_carry_detail() {
    let (status, body) = post_predict(SignalMode::Multi, r#"{"pair":"UPSTREAM"}"#).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "prediction failed");
    assert!(body["detail"].as_str().unwrap().contains("connection reset"));

    let (status, body) = post_predict(SignalMode::Multi, r#"{"pair":"BROKEN"}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "worker crashed");
}
