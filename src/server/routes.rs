//! HTTP route handlers for the whiteboard API.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{OriginalUri, Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::session::{Message, SessionError, Submission};

use super::error::ApiError;
use super::state::AppState;

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/session/sessions", get(list_sessions))
        .route("/session/{id}/submit", post(submit))
        .route("/session/{id}/history", get(history))
        .route("/session/{id}/summary", get(summary))
        .route("/session/{id}/reset", post(reset))
        .fallback(not_found)
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "whiteboard",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Submission response.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    /// Fresh summary or the waiting placeholder.
    pub summary: String,
    /// Full session log after the append.
    pub history: Vec<Message>,
}

/// Handle `POST /session/{id}/submit`.
async fn submit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<Submission>, JsonRejection>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let Json(submission) = payload?;
    let outcome = state.service.submit(&id, submission).await?;

    Ok(Json(SubmitResponse {
        summary: outcome.summary,
        history: outcome.history,
    }))
}

/// History response.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    /// Ordered session log, empty for unknown sessions.
    pub history: Vec<Message>,
}

/// Handle `GET /session/{id}/history`.
async fn history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let history = state.service.history(&id).await?;
    Ok(Json(HistoryResponse { history }))
}

/// Summary response.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    /// Last persisted summary.
    pub summary: String,
}

/// Handle `GET /session/{id}/summary`.
async fn summary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let summary = state.service.summary(&id).await?;
    Ok(Json(SummaryResponse { summary }))
}

/// Session listing response.
#[derive(Debug, Serialize)]
pub struct SessionsResponse {
    /// Ids of every session that currently has a log.
    pub sessions: Vec<String>,
}

/// Handle `GET /session/sessions`.
async fn list_sessions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionsResponse>, ApiError> {
    let sessions = state.service.list_sessions().await?;
    Ok(Json(SessionsResponse { sessions }))
}

/// Reset response.
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    /// Always `true` on success.
    pub ok: bool,
}

/// Handle `POST /session/{id}/reset`.
async fn reset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ResetResponse>, ApiError> {
    state.service.reset(&id).await?;
    Ok(Json(ResetResponse { ok: true }))
}

/// Any route not matched above.
async fn not_found(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError(SessionError::NotFound(uri.path().to_string()))
}
