//! Storyboard data model: what analysis produces and what the UI renders.

use serde::{Deserialize, Serialize};

use crate::types::{SceneId, Timestamp};

/// One analyzed scene as returned by the text model.
///
/// Field names follow the structured-output schema sent with the analysis
/// request (`segment`, `visualIdea`, `imagePrompt`), so this type
/// deserializes the model's JSON directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisItem {
    /// Verbatim transcript slice covered by this scene.
    pub segment: String,
    /// One-line description of the visual concept.
    pub visual_idea: String,
    /// Detailed, generation-ready image prompt.
    pub image_prompt: String,
}

/// Lifecycle phase of the storyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No transcript analyzed yet (or the board was reset).
    Idle,
    /// Transcript analysis is running.
    Analyzing,
    /// Analysis succeeded; scenes are available.
    Ready,
    /// Analysis failed; `error` on the snapshot carries the message.
    Error,
}

/// A single storyboard scene and its generation status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    /// Zero-based position at analysis time, as a string.
    pub id: SceneId,
    /// Verbatim transcript slice this scene covers.
    pub segment_text: String,
    /// One-line visual concept from analysis.
    pub visual_idea: String,
    /// Editable prompt that seeds image generation.
    pub image_prompt: String,
    /// Data URI of the most recent generated image, if any.
    pub generated_image_url: Option<String>,
    /// Local media URL of the most recent generated video, if any.
    pub generated_video_url: Option<String>,
    /// True while an image generation task for this scene is in flight.
    pub is_generating_image: bool,
    /// True while a video generation task for this scene is in flight.
    pub is_generating_video: bool,
    /// Most recent generation failure for this scene, user-readable.
    /// Cleared when a new generation for the scene is accepted.
    pub last_error: Option<String>,
}

/// Full board state returned to the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryboardSnapshot {
    pub phase: Phase,
    /// Generic analysis failure message when `phase` is [`Phase::Error`].
    pub error: Option<String>,
    /// When the current scene list was produced.
    pub analyzed_at: Option<Timestamp>,
    pub scenes: Vec<Scene>,
}

/// Build the scene list from analysis output.
///
/// Scene ids are the zero-based item positions rendered as strings; all
/// generation state starts cleared.
pub fn scenes_from_analysis(items: Vec<AnalysisItem>) -> Vec<Scene> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| Scene {
            id: index.to_string(),
            segment_text: item.segment,
            visual_idea: item.visual_idea,
            image_prompt: item.image_prompt,
            generated_image_url: None,
            generated_video_url: None,
            is_generating_image: false,
            is_generating_video: false,
            last_error: None,
        })
        .collect()
}
