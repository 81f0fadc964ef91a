use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use common::Error;
use engine::{PredictRequest, Prediction};

use crate::{ApiError, AppState};

pub fn predict_router() -> Router<AppState> {
    Router::new().route("/predict", post(predict))
}

/// Score the latest bar of a pair and suggest whether to act on it.
async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<Prediction>, ApiError> {
    let Json(request) = payload.map_err(|e| Error::MalformedRequest(e.body_text()))?;

    let span = info_span!("predict", request_id = %Uuid::new_v4(), pair = %request.pair);
    let prediction = state.predictor.predict(request).instrument(span).await?;
    Ok(Json(prediction))
}
