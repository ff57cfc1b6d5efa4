pub mod health;
pub mod media;
pub mod scene;
pub mod storyboard;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /storyboard                      full board snapshot (GET)
/// /storyboard/analyze              analyze a transcript (POST, 202)
/// /storyboard/reset                clear the board (POST)
///
/// /scenes/generate-all             batch image generation (POST, 202)
/// /scenes/{id}/prompt              edit the image prompt (PATCH)
/// /scenes/{id}/image               generate a still image (POST, 202)
/// /scenes/{id}/video               generate a video clip (POST, 202)
/// ```
///
/// `/health` and `/media/{id}` are mounted at root level, outside this tree.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/storyboard", storyboard::router())
        .nest("/scenes", scene::router())
}
