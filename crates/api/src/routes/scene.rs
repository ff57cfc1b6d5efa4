//! Route definitions for per-scene operations.
//!
//! ```text
//! POST   /generate-all             generate_all_images
//! PATCH  /{id}/prompt              update_prompt
//! POST   /{id}/image               generate_image
//! POST   /{id}/video               generate_video
//! ```

use axum::routing::{patch, post};
use axum::Router;

use crate::handlers::scene;
use crate::state::AppState;

/// Scene routes -- mounted at `/scenes`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate-all", post(scene::generate_all_images))
        .route("/{id}/prompt", patch(scene::update_prompt))
        .route("/{id}/image", post(scene::generate_image))
        .route("/{id}/video", post(scene::generate_video))
}
