use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::record::{AnswerRecord, AnswerRequest};
use crate::server::AppState;
use crate::storage::StoreStats;

#[derive(Deserialize)]
pub struct AskParams {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { error: error.into() }))
}

pub async fn ask(
    State(state): State<Arc<AppState>>,
    Json(params): Json<AskParams>,
) -> Result<Json<AnswerRecord>, ApiError> {
    answer(state, &params.question).await
}

pub async fn ask_query(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AskParams>,
) -> Result<Json<AnswerRecord>, ApiError> {
    answer(state, &params.question).await
}

async fn answer(state: Arc<AppState>, raw: &str) -> Result<Json<AnswerRecord>, ApiError> {
    let request = AnswerRequest::parse(raw)
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "question must not be empty"))?;

    let pipeline = Arc::clone(&state.pipeline);
    let record = tokio::task::spawn_blocking(move || pipeline.process(request.question()))
        .await
        .map_err(|e| {
            tracing::error!("Request task failed: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("request task failed: {}", e))
        })?;

    Ok(Json(record))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

pub async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<StoreStats>, ApiError> {
    let store = Arc::clone(&state.store);
    let stats = tokio::task::spawn_blocking(move || store.stats())
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(stats))
}
