use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use storyreel_gemini::GeminiClient;

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::store::SceneStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// In-memory storyboard state and media registry.
    pub store: Arc<SceneStore>,
    /// Provider client, built once at startup; `None` when `GEMINI_API_KEY`
    /// is unset.
    pub gemini: Option<Arc<GeminiClient>>,
    /// Tracker for spawned generation tasks, awaited during shutdown.
    pub tasks: TaskTracker,
    /// Cancelled at shutdown; aborts video polls at their next wait point.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// The provider client, or [`AppError::ApiKeyMissing`] when generation
    /// is not configured.
    pub fn gemini(&self) -> Result<Arc<GeminiClient>, AppError> {
        self.gemini.clone().ok_or(AppError::ApiKeyMissing)
    }
}
