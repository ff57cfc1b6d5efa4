//! Route definition for generated media playback.
//!
//! ```text
//! GET    /media/{id}               get_media
//! ```
//!
//! Mounted at root level so scene `generated_video_url` values
//! (`/media/<uuid>`) resolve directly in the browser.

use axum::routing::get;
use axum::Router;

use crate::handlers::media;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/media/{id}", get(media::get_media))
}
