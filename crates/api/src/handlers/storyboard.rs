//! Handlers for the storyboard lifecycle.
//!
//! Routes:
//! - `GET  /storyboard`          — full board snapshot
//! - `POST /storyboard/analyze`  — analyze a transcript (202)
//! - `POST /storyboard/reset`    — clear the board

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use storyreel_core::storyboard;

use crate::background;
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub transcript: String,
}

/// GET /api/v1/storyboard
///
/// Returns the full board state: phase, analysis error, timestamp, and the
/// scene list with per-scene generation status. The UI polls this while any
/// work is in flight.
pub async fn get_snapshot(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let snapshot = state.store.snapshot().await;
    Ok(Json(DataResponse { data: snapshot }))
}

/// POST /api/v1/storyboard/analyze
///
/// Validates the transcript, transitions the board to `analyzing` (clearing
/// the previous scene list wholesale), and spawns the analysis task.
/// Returns 202 with the cleared snapshot; the UI polls for the result.
pub async fn analyze_transcript(
    State(state): State<AppState>,
    Json(input): Json<AnalyzeRequest>,
) -> AppResult<impl IntoResponse> {
    storyboard::validate_transcript(&input.transcript)?;
    let client = state.gemini()?;

    state.store.begin_analysis().await?;
    tracing::info!(chars = input.transcript.chars().count(), "Transcript analysis accepted");

    let store = state.store.clone();
    state.tasks.spawn(background::generation::run_analysis(
        store,
        client,
        input.transcript,
    ));

    let snapshot = state.store.snapshot().await;
    Ok((StatusCode::ACCEPTED, Json(DataResponse { data: snapshot })))
}

/// POST /api/v1/storyboard/reset
///
/// Clears everything and returns the board to `idle`. Completions from
/// tasks still in flight against the old board are dropped by the store.
pub async fn reset_board(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    state.store.reset().await;
    tracing::info!("Storyboard reset");

    let snapshot = state.store.snapshot().await;
    Ok(Json(DataResponse { data: snapshot }))
}
