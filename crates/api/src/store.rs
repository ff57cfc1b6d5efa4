//! In-memory storyboard state and media registry.
//!
//! [`SceneStore`] owns the scene list, the board phase, and the bytes of
//! generated videos. Every transition is an atomic check-and-set under one
//! write lock, so a double-triggered operation is rejected rather than
//! raced. Completion writes identify their scene by id; when the board was
//! reset or re-analyzed in the meantime and the id is gone, the write is
//! silently dropped so stale task results never resurrect discarded scenes.

use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use storyreel_core::error::CoreError;
use storyreel_core::media::MediaPayload;
use storyreel_core::scene::{
    scenes_from_analysis, AnalysisItem, Phase, Scene, StoryboardSnapshot,
};
use storyreel_core::storyboard::batch_candidates;
use storyreel_core::types::SceneId;

/// Ownership token for a running batch walk. A new analysis or a reset
/// invalidates the token, which stops the walk at its next claim.
pub type BatchToken = Uuid;

/// Outcome of claiming one scene during a batch walk.
#[derive(Debug)]
pub enum BatchStep {
    /// Scene claimed: generate an image with this prompt.
    Generate(String),
    /// Scene is gone, already has an image, or is mid-generation.
    Skip,
    /// The token no longer owns the batch; stop walking.
    Stale,
}

/// URL prefix generated videos are served under.
const MEDIA_ROUTE_PREFIX: &str = "/media/";

struct BoardState {
    phase: Phase,
    error: Option<String>,
    analyzed_at: Option<storyreel_core::types::Timestamp>,
    scenes: Vec<Scene>,
    /// Generated video bytes, keyed by the id in the scene's media URL.
    media: HashMap<String, MediaPayload>,
    /// Token of the currently running batch, if any.
    batch: Option<BatchToken>,
}

impl BoardState {
    fn new() -> Self {
        Self {
            phase: Phase::Idle,
            error: None,
            analyzed_at: None,
            scenes: Vec::new(),
            media: HashMap::new(),
            batch: None,
        }
    }

    fn scene_mut(&mut self, id: &SceneId) -> Option<&mut Scene> {
        self.scenes.iter_mut().find(|scene| &scene.id == id)
    }

    /// Drop the media registry entry backing a scene's video URL.
    fn drop_media_for(&mut self, video_url: &str) {
        if let Some(media_id) = video_url.strip_prefix(MEDIA_ROUTE_PREFIX) {
            self.media.remove(media_id);
        }
    }
}

/// Thread-safe storyboard store; designed to be wrapped in `Arc` and shared
/// between handlers and background tasks.
pub struct SceneStore {
    board: RwLock<BoardState>,
}

impl SceneStore {
    /// Create an empty store in the `idle` phase.
    pub fn new() -> Self {
        Self {
            board: RwLock::new(BoardState::new()),
        }
    }

    /// Current full board state, for the UI.
    pub async fn snapshot(&self) -> StoryboardSnapshot {
        let board = self.board.read().await;
        StoryboardSnapshot {
            phase: board.phase,
            error: board.error.clone(),
            analyzed_at: board.analyzed_at,
            scenes: board.scenes.clone(),
        }
    }

    /// A clone of one scene.
    pub async fn scene(&self, id: &SceneId) -> Result<Scene, CoreError> {
        let board = self.board.read().await;
        board
            .scenes
            .iter()
            .find(|scene| &scene.id == id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound {
                entity: "Scene",
                id: id.clone(),
            })
    }

    /// Error unless the scene exists.
    pub async fn ensure_scene(&self, id: &SceneId) -> Result<(), CoreError> {
        self.scene(id).await.map(|_| ())
    }

    // ---- analysis ----

    /// Accept an analysis request: transition to `analyzing` and clear the
    /// previous board, including its media registry entries.
    ///
    /// Rejects with a conflict while another analysis is running.
    pub async fn begin_analysis(&self) -> Result<(), CoreError> {
        let mut board = self.board.write().await;
        if board.phase == Phase::Analyzing {
            return Err(CoreError::Conflict(
                "transcript analysis is already running".into(),
            ));
        }
        board.phase = Phase::Analyzing;
        board.error = None;
        board.analyzed_at = None;
        board.scenes.clear();
        board.media.clear();
        board.batch = None;
        Ok(())
    }

    /// Record a successful analysis: replace the scene list wholesale and
    /// transition to `ready`.
    ///
    /// Dropped silently when the board is no longer `analyzing` (reset won).
    pub async fn finish_analysis(&self, items: Vec<AnalysisItem>) {
        let mut board = self.board.write().await;
        if board.phase != Phase::Analyzing {
            tracing::debug!("Dropping stale analysis result");
            return;
        }
        board.scenes = scenes_from_analysis(items);
        board.analyzed_at = Some(chrono::Utc::now());
        board.phase = Phase::Ready;
    }

    /// Record a failed analysis: transition to `error` with a user-facing
    /// message. The scene list stays empty.
    ///
    /// Dropped silently when the board is no longer `analyzing`.
    pub async fn fail_analysis(&self, message: &str) {
        let mut board = self.board.write().await;
        if board.phase != Phase::Analyzing {
            tracing::debug!("Dropping stale analysis failure");
            return;
        }
        board.error = Some(message.to_string());
        board.phase = Phase::Error;
    }

    // ---- prompt editing ----

    /// Replace one scene's editable image prompt. Returns the updated scene.
    pub async fn update_prompt(&self, id: &SceneId, prompt: String) -> Result<Scene, CoreError> {
        let mut board = self.board.write().await;
        let scene = board.scene_mut(id).ok_or_else(|| CoreError::NotFound {
            entity: "Scene",
            id: id.clone(),
        })?;
        scene.image_prompt = prompt;
        Ok(scene.clone())
    }

    // ---- image generation ----

    /// Accept an image generation request for a scene: set the in-flight
    /// flag and clear the scene's last error. Returns the updated scene
    /// (whose `image_prompt` seeds the generation task).
    ///
    /// Rejects with a conflict while an image generation for the same scene
    /// is in flight.
    pub async fn begin_image(&self, id: &SceneId) -> Result<Scene, CoreError> {
        let mut board = self.board.write().await;
        let scene = board.scene_mut(id).ok_or_else(|| CoreError::NotFound {
            entity: "Scene",
            id: id.clone(),
        })?;
        if scene.is_generating_image {
            return Err(CoreError::Conflict(
                "image generation is already running for this scene".into(),
            ));
        }
        scene.is_generating_image = true;
        scene.last_error = None;
        Ok(scene.clone())
    }

    /// Record the outcome of an image generation task and clear the
    /// in-flight flag.
    ///
    /// `Ok` carries the image data URI; `Err` carries a user-readable
    /// failure message. A failure leaves any previously generated image
    /// untouched. No-op when the scene has been discarded.
    pub async fn complete_image(&self, id: &SceneId, result: Result<String, String>) {
        let mut board = self.board.write().await;
        let Some(scene) = board.scene_mut(id) else {
            tracing::debug!(scene_id = %id, "Dropping image result for discarded scene");
            return;
        };
        scene.is_generating_image = false;
        match result {
            Ok(data_uri) => scene.generated_image_url = Some(data_uri),
            Err(message) => scene.last_error = Some(message),
        }
    }

    // ---- video generation ----

    /// Accept a video generation request for a scene. Returns the updated
    /// scene and the image data URI seeding the job.
    ///
    /// Requires a previously generated image; rejects with a conflict while
    /// a video generation for the same scene is in flight.
    pub async fn begin_video(&self, id: &SceneId) -> Result<(Scene, String), CoreError> {
        let mut board = self.board.write().await;
        let scene = board.scene_mut(id).ok_or_else(|| CoreError::NotFound {
            entity: "Scene",
            id: id.clone(),
        })?;
        let Some(image_uri) = scene.generated_image_url.clone() else {
            return Err(CoreError::Validation("scene has no generated image".into()));
        };
        if scene.is_generating_video {
            return Err(CoreError::Conflict(
                "video generation is already running for this scene".into(),
            ));
        }
        scene.is_generating_video = true;
        scene.last_error = None;
        Ok((scene.clone(), image_uri))
    }

    /// Record the outcome of a video generation task and clear the
    /// in-flight flag.
    ///
    /// `Ok` registers the video bytes under a fresh media id and points the
    /// scene at `/media/<id>`, dropping the registry entry of any video it
    /// replaces. `Err` carries a user-readable failure message and leaves
    /// any previous video untouched. No-op when the scene has been
    /// discarded (the bytes are dropped, not registered).
    pub async fn complete_video(&self, id: &SceneId, result: Result<MediaPayload, String>) {
        let mut board = self.board.write().await;
        if board.scene_mut(id).is_none() {
            tracing::debug!(scene_id = %id, "Dropping video result for discarded scene");
            return;
        }
        match result {
            Ok(payload) => {
                let media_id = Uuid::new_v4().to_string();
                let url = format!("{MEDIA_ROUTE_PREFIX}{media_id}");
                board.media.insert(media_id, payload);
                // scene_mut re-borrow: the insert above needs the board.
                let scene = board.scene_mut(id).expect("scene checked above");
                scene.is_generating_video = false;
                if let Some(previous) = scene.generated_video_url.replace(url) {
                    board.drop_media_for(&previous);
                }
            }
            Err(message) => {
                let scene = board.scene_mut(id).expect("scene checked above");
                scene.is_generating_video = false;
                scene.last_error = Some(message);
            }
        }
    }

    /// Stored media bytes for `GET /media/{id}`.
    pub async fn media(&self, media_id: &str) -> Option<MediaPayload> {
        self.board.read().await.media.get(media_id).cloned()
    }

    // ---- batch image generation ----

    /// Accept a batch image run: mark the batch as running and return its
    /// ownership token plus the candidate scene ids in board order.
    ///
    /// Scenes that already have an image or are mid-generation are not
    /// candidates. Rejects when the board is empty or a batch is running.
    pub async fn begin_batch(&self) -> Result<(BatchToken, Vec<SceneId>), CoreError> {
        let mut board = self.board.write().await;
        if board.scenes.is_empty() {
            return Err(CoreError::Validation("no scenes to generate".into()));
        }
        if board.batch.is_some() {
            return Err(CoreError::Conflict(
                "batch image generation is already running".into(),
            ));
        }
        let token = Uuid::new_v4();
        board.batch = Some(token);
        Ok((token, batch_candidates(&board.scenes)))
    }

    /// Claim the next scene of a batch walk.
    ///
    /// Re-checks the scene's current state so work finished since the batch
    /// was accepted is skipped, and stops the walk when the token was
    /// invalidated by a reset or re-analysis.
    pub async fn claim_batch_scene(&self, token: &BatchToken, id: &SceneId) -> BatchStep {
        let mut board = self.board.write().await;
        if board.batch != Some(*token) {
            return BatchStep::Stale;
        }
        let Some(scene) = board.scene_mut(id) else {
            return BatchStep::Skip;
        };
        if scene.generated_image_url.is_some() || scene.is_generating_image {
            return BatchStep::Skip;
        }
        scene.is_generating_image = true;
        scene.last_error = None;
        BatchStep::Generate(scene.image_prompt.clone())
    }

    /// Release the batch flag, if the token still owns it.
    pub async fn finish_batch(&self, token: &BatchToken) {
        let mut board = self.board.write().await;
        if board.batch == Some(*token) {
            board.batch = None;
        }
    }

    // ---- reset ----

    /// Clear everything and return to the `idle` phase. In-flight task
    /// completions against the old board become no-ops.
    pub async fn reset(&self) {
        let mut board = self.board.write().await;
        *board = BoardState::new();
    }
}

impl Default for SceneStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_matches::assert_matches;

    fn items(n: usize) -> Vec<AnalysisItem> {
        (0..n)
            .map(|i| AnalysisItem {
                segment: format!("segment {i}"),
                visual_idea: format!("idea {i}"),
                image_prompt: format!("prompt {i}"),
            })
            .collect()
    }

    async fn ready_store(n: usize) -> SceneStore {
        let store = SceneStore::new();
        store.begin_analysis().await.unwrap();
        store.finish_analysis(items(n)).await;
        store
    }

    fn png_payload() -> MediaPayload {
        MediaPayload {
            mime_type: "video/mp4".to_string(),
            bytes: b"clip".to_vec(),
        }
    }

    // -- analysis lifecycle --

    #[tokio::test]
    async fn analysis_success_replaces_board_and_reaches_ready() {
        let store = ready_store(3).await;
        let snapshot = store.snapshot().await;

        assert_eq!(snapshot.phase, Phase::Ready);
        assert_eq!(snapshot.scenes.len(), 3);
        assert_eq!(snapshot.scenes[0].id, "0");
        assert!(snapshot.analyzed_at.is_some());
        assert!(snapshot.error.is_none());
    }

    #[tokio::test]
    async fn second_analysis_while_analyzing_conflicts() {
        let store = SceneStore::new();
        store.begin_analysis().await.unwrap();

        assert_matches!(store.begin_analysis().await, Err(CoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn re_analysis_clears_previous_scenes_immediately() {
        let store = ready_store(2).await;
        store.begin_analysis().await.unwrap();

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.phase, Phase::Analyzing);
        assert!(snapshot.scenes.is_empty());
        assert!(snapshot.analyzed_at.is_none());
    }

    #[tokio::test]
    async fn failed_analysis_reaches_error_with_message() {
        let store = SceneStore::new();
        store.begin_analysis().await.unwrap();
        store.fail_analysis("Failed to analyze transcript.").await;

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.phase, Phase::Error);
        assert_eq!(snapshot.error.as_deref(), Some("Failed to analyze transcript."));
        assert!(snapshot.scenes.is_empty());
    }

    #[tokio::test]
    async fn analysis_result_after_reset_is_dropped() {
        let store = SceneStore::new();
        store.begin_analysis().await.unwrap();
        store.reset().await;
        store.finish_analysis(items(2)).await;

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.phase, Phase::Idle);
        assert!(snapshot.scenes.is_empty());
    }

    // -- prompt editing --

    #[tokio::test]
    async fn update_prompt_touches_only_that_scene() {
        let store = ready_store(2).await;
        let updated = store
            .update_prompt(&"1".to_string(), "edited".to_string())
            .await
            .unwrap();
        assert_eq!(updated.image_prompt, "edited");

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.scenes[0].image_prompt, "prompt 0");
        assert_eq!(snapshot.scenes[1].image_prompt, "edited");
        assert_eq!(snapshot.scenes[1].segment_text, "segment 1");
    }

    #[tokio::test]
    async fn update_prompt_unknown_scene_is_not_found() {
        let store = ready_store(1).await;
        let result = store.update_prompt(&"9".to_string(), "x".to_string()).await;
        assert_matches!(result, Err(CoreError::NotFound { entity: "Scene", .. }));
    }

    // -- image generation --

    #[tokio::test]
    async fn begin_image_sets_flag_and_clears_error() {
        let store = ready_store(1).await;
        let id = "0".to_string();
        store.complete_image(&id, Err("boom".to_string())).await;

        let scene = store.begin_image(&id).await.unwrap();
        assert!(scene.is_generating_image);
        assert!(scene.last_error.is_none());
    }

    #[tokio::test]
    async fn begin_image_twice_conflicts() {
        let store = ready_store(1).await;
        let id = "0".to_string();
        store.begin_image(&id).await.unwrap();

        assert_matches!(store.begin_image(&id).await, Err(CoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn image_failure_preserves_previous_image() {
        let store = ready_store(1).await;
        let id = "0".to_string();

        store.begin_image(&id).await.unwrap();
        store
            .complete_image(&id, Ok("data:image/png;base64,AAAA".to_string()))
            .await;

        store.begin_image(&id).await.unwrap();
        store.complete_image(&id, Err("failed".to_string())).await;

        let scene = store.scene(&id).await.unwrap();
        assert!(!scene.is_generating_image);
        assert_eq!(
            scene.generated_image_url.as_deref(),
            Some("data:image/png;base64,AAAA")
        );
        assert_eq!(scene.last_error.as_deref(), Some("failed"));
    }

    #[tokio::test]
    async fn image_completion_for_discarded_scene_is_dropped() {
        let store = ready_store(1).await;
        let id = "0".to_string();
        store.begin_image(&id).await.unwrap();
        store.reset().await;

        store
            .complete_image(&id, Ok("data:image/png;base64,AAAA".to_string()))
            .await;

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.phase, Phase::Idle);
        assert!(snapshot.scenes.is_empty());
    }

    // -- video generation --

    #[tokio::test]
    async fn begin_video_requires_generated_image() {
        let store = ready_store(1).await;
        let result = store.begin_video(&"0".to_string()).await;
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn begin_video_returns_seed_image_and_sets_flag() {
        let store = ready_store(1).await;
        let id = "0".to_string();
        store
            .complete_image(&id, Ok("data:image/png;base64,AAAA".to_string()))
            .await;

        let (scene, image_uri) = store.begin_video(&id).await.unwrap();
        assert!(scene.is_generating_video);
        assert_eq!(image_uri, "data:image/png;base64,AAAA");

        assert_matches!(store.begin_video(&id).await, Err(CoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn video_success_registers_media_and_replacement_drops_old_entry() {
        let store = ready_store(1).await;
        let id = "0".to_string();
        store
            .complete_image(&id, Ok("data:image/png;base64,AAAA".to_string()))
            .await;

        store.begin_video(&id).await.unwrap();
        store.complete_video(&id, Ok(png_payload())).await;

        let first_url = store.scene(&id).await.unwrap().generated_video_url.unwrap();
        let first_media_id = first_url.strip_prefix("/media/").unwrap().to_string();
        assert!(store.media(&first_media_id).await.is_some());

        store.begin_video(&id).await.unwrap();
        store.complete_video(&id, Ok(png_payload())).await;

        let second_url = store.scene(&id).await.unwrap().generated_video_url.unwrap();
        assert_ne!(first_url, second_url);
        assert!(store.media(&first_media_id).await.is_none());
    }

    #[tokio::test]
    async fn video_completion_for_discarded_scene_registers_nothing() {
        let store = ready_store(1).await;
        let id = "0".to_string();
        store
            .complete_image(&id, Ok("data:image/png;base64,AAAA".to_string()))
            .await;
        store.begin_video(&id).await.unwrap();

        store.reset().await;
        store.complete_video(&id, Ok(png_payload())).await;

        let board = store.board.read().await;
        assert!(board.media.is_empty());
    }

    // -- batch --

    #[tokio::test]
    async fn batch_candidates_skip_generated_and_in_flight_scenes() {
        let store = ready_store(3).await;
        store
            .complete_image(&"1".to_string(), Ok("data:image/png;base64,AAAA".to_string()))
            .await;
        store.begin_image(&"2".to_string()).await.unwrap();

        let (_, candidates) = store.begin_batch().await.unwrap();
        assert_eq!(candidates, vec!["0"]);
    }

    #[tokio::test]
    async fn batch_on_empty_board_is_validation_error() {
        let store = SceneStore::new();
        assert_matches!(store.begin_batch().await, Err(CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn second_batch_conflicts_until_finished() {
        let store = ready_store(1).await;
        let (token, _) = store.begin_batch().await.unwrap();

        assert_matches!(store.begin_batch().await, Err(CoreError::Conflict(_)));

        store.finish_batch(&token).await;
        assert!(store.begin_batch().await.is_ok());
    }

    #[tokio::test]
    async fn batch_claim_skips_scene_that_gained_an_image() {
        let store = ready_store(2).await;
        let (token, candidates) = store.begin_batch().await.unwrap();
        assert_eq!(candidates.len(), 2);

        // Scene 0 gets an image from a single-scene request mid-batch.
        store
            .complete_image(&"0".to_string(), Ok("data:image/png;base64,AAAA".to_string()))
            .await;

        assert_matches!(
            store.claim_batch_scene(&token, &"0".to_string()).await,
            BatchStep::Skip
        );
        assert_matches!(
            store.claim_batch_scene(&token, &"1".to_string()).await,
            BatchStep::Generate(prompt) if prompt == "prompt 1"
        );
    }

    #[tokio::test]
    async fn batch_token_goes_stale_on_reset_and_re_analysis() {
        let store = ready_store(1).await;
        let (token, _) = store.begin_batch().await.unwrap();
        store.reset().await;
        assert_matches!(
            store.claim_batch_scene(&token, &"0".to_string()).await,
            BatchStep::Stale
        );

        let store = ready_store(1).await;
        let (token, _) = store.begin_batch().await.unwrap();
        store.begin_analysis().await.unwrap();
        assert_matches!(
            store.claim_batch_scene(&token, &"0".to_string()).await,
            BatchStep::Stale
        );
    }

    // -- reset --

    #[tokio::test]
    async fn reset_clears_scenes_media_and_error() {
        let store = ready_store(1).await;
        let id = "0".to_string();
        store
            .complete_image(&id, Ok("data:image/png;base64,AAAA".to_string()))
            .await;
        store.begin_video(&id).await.unwrap();
        store.complete_video(&id, Ok(png_payload())).await;

        store.reset().await;

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.phase, Phase::Idle);
        assert!(snapshot.scenes.is_empty());
        assert!(snapshot.error.is_none());
        assert!(snapshot.analyzed_at.is_none());

        let board = store.board.read().await;
        assert!(board.media.is_empty());
        assert!(board.batch.is_none());
    }
}
