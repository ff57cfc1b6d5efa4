//! Validation and batch-selection rules for storyboard operations.

use crate::error::CoreError;
use crate::scene::Scene;
use crate::types::{SceneId, MAX_PROMPT_CHARS, MAX_TRANSCRIPT_CHARS};

/// Generic user-facing message for a failed analysis. The underlying
/// cause goes to the log, not the UI.
pub const ANALYSIS_FAILED_MESSAGE: &str = "Failed to analyze transcript. Please try again.";

/// Generic user-facing message for a failed image generation.
pub const IMAGE_FAILED_MESSAGE: &str = "Image generation failed. Please try again.";

/// Generic user-facing message for a failed video generation.
pub const VIDEO_FAILED_MESSAGE: &str = "Video generation failed. Please try again.";

/// Validate a transcript submitted for analysis.
///
/// Rejects empty (after trimming) and oversized input.
pub fn validate_transcript(transcript: &str) -> Result<(), CoreError> {
    if transcript.trim().is_empty() {
        return Err(CoreError::Validation("transcript must not be empty".into()));
    }
    if transcript.chars().count() > MAX_TRANSCRIPT_CHARS {
        return Err(CoreError::Validation(format!(
            "transcript exceeds {MAX_TRANSCRIPT_CHARS} characters"
        )));
    }
    Ok(())
}

/// Validate an edited image prompt.
pub fn validate_prompt(prompt: &str) -> Result<(), CoreError> {
    if prompt.trim().is_empty() {
        return Err(CoreError::Validation("image prompt must not be empty".into()));
    }
    if prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err(CoreError::Validation(format!(
            "image prompt exceeds {MAX_PROMPT_CHARS} characters"
        )));
    }
    Ok(())
}

/// Scenes eligible for a batch image run, in board order.
///
/// A scene is skipped when it already has a generated image or when an
/// image generation for it is currently in flight.
pub fn batch_candidates(scenes: &[Scene]) -> Vec<SceneId> {
    scenes
        .iter()
        .filter(|scene| scene.generated_image_url.is_none() && !scene.is_generating_image)
        .map(|scene| scene.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{scenes_from_analysis, AnalysisItem};

    fn board(n: usize) -> Vec<Scene> {
        let items = (0..n)
            .map(|i| AnalysisItem {
                segment: format!("segment {i}"),
                visual_idea: format!("idea {i}"),
                image_prompt: format!("prompt {i}"),
            })
            .collect();
        scenes_from_analysis(items)
    }

    // -- validate_transcript --

    #[test]
    fn transcript_rejects_empty() {
        assert!(validate_transcript("").is_err());
        assert!(validate_transcript("   \n\t ").is_err());
    }

    #[test]
    fn transcript_accepts_plain_text() {
        assert!(validate_transcript("Hello world.").is_ok());
    }

    #[test]
    fn transcript_rejects_oversized() {
        let huge = "a".repeat(MAX_TRANSCRIPT_CHARS + 1);
        assert!(validate_transcript(&huge).is_err());
    }

    #[test]
    fn transcript_accepts_exact_limit() {
        let max = "a".repeat(MAX_TRANSCRIPT_CHARS);
        assert!(validate_transcript(&max).is_ok());
    }

    // -- validate_prompt --

    #[test]
    fn prompt_rejects_empty() {
        assert!(validate_prompt("").is_err());
        assert!(validate_prompt("  ").is_err());
    }

    #[test]
    fn prompt_rejects_oversized() {
        let huge = "p".repeat(MAX_PROMPT_CHARS + 1);
        assert!(validate_prompt(&huge).is_err());
    }

    #[test]
    fn prompt_accepts_normal_text() {
        assert!(validate_prompt("A wide shot of a harbor at dawn").is_ok());
    }

    // -- batch_candidates --

    #[test]
    fn batch_selects_all_fresh_scenes_in_order() {
        let scenes = board(3);
        assert_eq!(batch_candidates(&scenes), vec!["0", "1", "2"]);
    }

    #[test]
    fn batch_skips_scenes_with_images_and_in_flight_scenes() {
        let mut scenes = board(4);
        scenes[1].generated_image_url = Some("data:image/png;base64,AAAA".into());
        scenes[2].is_generating_image = true;

        assert_eq!(batch_candidates(&scenes), vec!["0", "3"]);
    }

    #[test]
    fn batch_of_fully_generated_board_is_empty() {
        let mut scenes = board(2);
        for scene in &mut scenes {
            scene.generated_image_url = Some("data:image/png;base64,AAAA".into());
        }

        assert!(batch_candidates(&scenes).is_empty());
    }
}
