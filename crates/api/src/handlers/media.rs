//! Handler serving generated video bytes from the in-memory registry.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;

use storyreel_core::error::CoreError;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /media/{id}
///
/// Serves the stored bytes with their recorded content type. Entries exist
/// only while the owning scene references them; a replaced or reset video's
/// id is a 404.
pub async fn get_media(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let payload = state
        .store
        .media(&id)
        .await
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Media",
            id,
        }))?;

    Ok(([(header::CONTENT_TYPE, payload.mime_type)], payload.bytes))
}
