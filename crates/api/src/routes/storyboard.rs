//! Route definitions for the storyboard lifecycle.
//!
//! ```text
//! GET    /                         get_snapshot
//! POST   /analyze                  analyze_transcript
//! POST   /reset                    reset_board
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::storyboard;
use crate::state::AppState;

/// Storyboard routes -- mounted at `/storyboard`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(storyboard::get_snapshot))
        .route("/analyze", post(storyboard::analyze_transcript))
        .route("/reset", post(storyboard::reset_board))
}
