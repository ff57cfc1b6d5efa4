//! Provider-facing generation tasks: analysis, image, video, batch.
//!
//! Failures never abort the board. Each task logs the underlying cause and
//! records a generic user-facing message; the prior media reference on the
//! scene survives.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use storyreel_core::error::CoreError;
use storyreel_core::media::{self, MediaPayload};
use storyreel_core::storyboard::{
    ANALYSIS_FAILED_MESSAGE, IMAGE_FAILED_MESSAGE, VIDEO_FAILED_MESSAGE,
};
use storyreel_core::types::SceneId;
use storyreel_gemini::messages::first_video_uri;
use storyreel_gemini::{poll, GeminiClient, GeminiError};

use crate::store::{BatchStep, BatchToken, SceneStore};

/// Failure modes of the video task before and after the provider call.
#[derive(Debug, thiserror::Error)]
enum VideoTaskError {
    /// The scene's stored image data URI would not decode.
    #[error(transparent)]
    Media(#[from] CoreError),
    /// The provider rejected or failed the job.
    #[error(transparent)]
    Gemini(#[from] GeminiError),
}

/// Analyze a transcript and replace the board with the resulting scenes.
pub async fn run_analysis(store: Arc<SceneStore>, client: Arc<GeminiClient>, transcript: String) {
    match client.analyze_transcript(&transcript).await {
        Ok(items) => {
            tracing::info!(scenes = items.len(), "Transcript analysis complete");
            store.finish_analysis(items).await;
        }
        Err(error) => {
            tracing::warn!(error = %error, "Transcript analysis failed");
            store.fail_analysis(ANALYSIS_FAILED_MESSAGE).await;
        }
    }
}

/// Generate a still image for one scene and store it as a data URI.
pub async fn run_image(
    store: Arc<SceneStore>,
    client: Arc<GeminiClient>,
    scene_id: SceneId,
    prompt: String,
) {
    let result = match client.generate_image(&prompt).await {
        Ok(payload) => {
            tracing::info!(scene_id = %scene_id, bytes = payload.bytes.len(), "Image generated");
            Ok(media::encode_data_uri(&payload.mime_type, &payload.bytes))
        }
        Err(error) => {
            tracing::warn!(scene_id = %scene_id, error = %error, "Image generation failed");
            Err(IMAGE_FAILED_MESSAGE.to_string())
        }
    };
    store.complete_image(&scene_id, result).await;
}

/// Generate a video clip for one scene: submit the job seeded by the
/// scene's image, poll until done, download the result, and register the
/// bytes in the media registry.
pub async fn run_video(
    store: Arc<SceneStore>,
    client: Arc<GeminiClient>,
    scene_id: SceneId,
    prompt: String,
    image_uri: String,
    cancel: CancellationToken,
) {
    let result = match generate_clip(&client, &prompt, &image_uri, &cancel).await {
        Ok(payload) => {
            tracing::info!(scene_id = %scene_id, bytes = payload.bytes.len(), "Video generated");
            Ok(payload)
        }
        Err(error) => {
            tracing::warn!(scene_id = %scene_id, error = %error, "Video generation failed");
            Err(VIDEO_FAILED_MESSAGE.to_string())
        }
    };
    store.complete_video(&scene_id, result).await;
}

/// The full video pipeline for one scene, without store writes.
async fn generate_clip(
    client: &GeminiClient,
    prompt: &str,
    image_uri: &str,
    cancel: &CancellationToken,
) -> Result<MediaPayload, VideoTaskError> {
    let image = media::decode_data_uri(image_uri)?;

    let operation = client.submit_video(prompt, &image).await?;
    tracing::debug!(operation = %operation.name, "Video job submitted");

    let operation = poll::wait_until_done(client, operation, &client.config().poll, cancel).await?;

    let uri = first_video_uri(&operation)
        .ok_or(GeminiError::InvalidResponse("completed video operation has no sample URI"))?;

    Ok(client.download_file(uri).await?)
}

/// Walk the batch candidates sequentially, generating an image for each
/// scene that still needs one.
///
/// Each claim re-checks the scene's current state under the store lock, so
/// work finished since the batch was accepted is skipped, and a reset or
/// re-analysis stales the token and ends the walk. Individual failures are
/// recorded per scene and do not stop the walk.
pub async fn run_batch(
    store: Arc<SceneStore>,
    client: Arc<GeminiClient>,
    token: BatchToken,
    candidates: Vec<SceneId>,
) {
    for scene_id in candidates {
        match store.claim_batch_scene(&token, &scene_id).await {
            BatchStep::Generate(prompt) => {
                run_image(store.clone(), client.clone(), scene_id, prompt).await;
            }
            BatchStep::Skip => continue,
            BatchStep::Stale => {
                tracing::debug!("Batch token stale; stopping walk");
                break;
            }
        }
    }
    store.finish_batch(&token).await;
    tracing::info!("Batch image generation finished");
}
