//! Handlers for per-scene operations.
//!
//! Routes:
//! - `PATCH /scenes/{id}/prompt`     — edit the image prompt
//! - `POST  /scenes/{id}/image`      — generate a still image (202)
//! - `POST  /scenes/{id}/video`      — generate a video clip (202)
//! - `POST  /scenes/generate-all`    — batch image generation (202)
//!
//! All generation requests are accepted atomically in the store (flag set,
//! conflict on double trigger) and executed by a spawned background task.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use storyreel_core::storyboard;
use storyreel_core::types::SceneId;

use crate::background;
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdatePromptRequest {
    pub image_prompt: String,
}

/// Accepted-batch payload: how many scenes the walk will visit.
#[derive(Debug, Serialize)]
pub struct BatchAccepted {
    pub scheduled: usize,
}

/// PATCH /api/v1/scenes/{id}/prompt
///
/// Replaces exactly that scene's editable image prompt; every other field
/// and scene is untouched. The next image generation uses the edited text.
pub async fn update_prompt(
    State(state): State<AppState>,
    Path(id): Path<SceneId>,
    Json(input): Json<UpdatePromptRequest>,
) -> AppResult<impl IntoResponse> {
    storyboard::validate_prompt(&input.image_prompt)?;

    let scene = state.store.update_prompt(&id, input.image_prompt).await?;
    tracing::debug!(scene_id = %id, "Image prompt updated");

    Ok(Json(DataResponse { data: scene }))
}

/// POST /api/v1/scenes/{id}/image
///
/// Marks the scene as generating (409 if it already is) and spawns the
/// image task with the scene's current prompt. Returns 202 with the scene
/// as accepted; the result lands in the snapshot.
pub async fn generate_image(
    State(state): State<AppState>,
    Path(id): Path<SceneId>,
) -> AppResult<impl IntoResponse> {
    let client = state.gemini()?;
    let scene = state.store.begin_image(&id).await?;
    tracing::info!(scene_id = %id, "Image generation accepted");

    let store = state.store.clone();
    state.tasks.spawn(background::generation::run_image(
        store,
        client,
        id,
        scene.image_prompt.clone(),
    ));

    Ok((StatusCode::ACCEPTED, Json(DataResponse { data: scene })))
}

/// POST /api/v1/scenes/{id}/video
///
/// Requires a previously generated image on the scene (400 without one);
/// marks the scene as generating (409 if it already is) and spawns the
/// video task seeded by that image. Returns 202 with the scene as accepted.
pub async fn generate_video(
    State(state): State<AppState>,
    Path(id): Path<SceneId>,
) -> AppResult<impl IntoResponse> {
    let client = state.gemini()?;
    let (scene, image_uri) = state.store.begin_video(&id).await?;
    tracing::info!(scene_id = %id, "Video generation accepted");

    let store = state.store.clone();
    let cancel = state.shutdown.clone();
    state.tasks.spawn(background::generation::run_video(
        store,
        client,
        id,
        scene.image_prompt.clone(),
        image_uri,
        cancel,
    ));

    Ok((StatusCode::ACCEPTED, Json(DataResponse { data: scene })))
}

/// POST /api/v1/scenes/generate-all
///
/// Starts a sequential batch image run over every scene that has no image
/// and is not already generating one. 409 while a batch is running, 400 on
/// an empty board. Returns 202 with the number of scheduled scenes.
pub async fn generate_all_images(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let client = state.gemini()?;
    let (token, candidates) = state.store.begin_batch().await?;
    tracing::info!(scheduled = candidates.len(), "Batch image generation accepted");

    let scheduled = candidates.len();
    let store = state.store.clone();
    state.tasks.spawn(background::generation::run_batch(
        store, client, token, candidates,
    ));

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: BatchAccepted { scheduled },
        }),
    ))
}
