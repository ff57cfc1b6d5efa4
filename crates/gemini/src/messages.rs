//! Request and response types for the Gemini REST endpoints, plus the
//! builders and extractors the client uses.
//!
//! Requests are assembled by the `*_request` constructors so every call
//! site sends the same shape; responses deserialize into typed structs and
//! are picked apart by the `first_*` extractors. Field names follow the
//! REST wire format (camelCase).

use serde::{Deserialize, Serialize};

use storyreel_core::media::MediaPayload;

// ---------------------------------------------------------------------------
// Fixed generation parameters
// ---------------------------------------------------------------------------

/// Aspect ratio for all generated media.
pub const ASPECT_RATIO: &str = "16:9";

/// Image resolution tier.
pub const IMAGE_SIZE: &str = "1K";

/// Video resolution.
pub const VIDEO_RESOLUTION: &str = "720p";

/// Clips requested per video job.
pub const VIDEO_SAMPLE_COUNT: u32 = 1;

/// Instruction given to the analysis model.
pub const ANALYSIS_SYSTEM_INSTRUCTION: &str = "You are an expert video editor \
and storyboard artist. Split the provided transcript into distinct visual \
scenes, each covering roughly five to ten seconds of narration. For every \
scene return the exact transcript segment it covers, a concise one-line \
visual idea, and a detailed image-generation prompt suitable for a \
photorealistic 16:9 documentary still.";

// ---------------------------------------------------------------------------
// generateContent request
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// A role-tagged list of parts; used for both requests and replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    fn from_text(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part {
                text: Some(text.into()),
                inline_data: None,
            }],
        }
    }
}

/// One part of a content block: text or an inline binary payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub inline_data: Option<InlineData>,
}

/// Inline binary payload with a base64-encoded body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    /// Base64-encoded payload.
    pub data: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_config: Option<ImageConfig>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    pub aspect_ratio: String,
    pub image_size: String,
}

// ---------------------------------------------------------------------------
// generateContent response
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

// ---------------------------------------------------------------------------
// predictLongRunning request (video jobs)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct PredictLongRunningRequest {
    pub instances: Vec<VideoInstance>,
    pub parameters: VideoParameters,
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoInstance {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageBytes>,
}

/// Raw image bytes attached to a video job as the starting frame.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageBytes {
    pub bytes_base64_encoded: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoParameters {
    pub sample_count: u32,
    pub aspect_ratio: String,
    pub resolution: String,
}

// ---------------------------------------------------------------------------
// Long-running operation
// ---------------------------------------------------------------------------

/// A long-running operation as returned by job submission and polling.
#[derive(Debug, Clone, Deserialize)]
pub struct Operation {
    /// Server-assigned operation name, polled via `GET /v1beta/{name}`.
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<OperationError>,
    #[serde(default)]
    pub response: Option<OperationResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OperationError {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    #[serde(default)]
    pub generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoResponse {
    #[serde(default)]
    pub generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedSample {
    #[serde(default)]
    pub video: Option<VideoRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoRef {
    #[serde(default)]
    pub uri: Option<String>,
}

// ---------------------------------------------------------------------------
// Request builders
// ---------------------------------------------------------------------------

/// Structured-output schema for transcript analysis: an array of scene
/// objects with exactly the three string fields the board needs.
pub fn analysis_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "segment": {
                    "type": "STRING",
                    "description": "The exact portion of the transcript this scene covers."
                },
                "visualIdea": {
                    "type": "STRING",
                    "description": "A concise one-line description of the visual concept."
                },
                "imagePrompt": {
                    "type": "STRING",
                    "description": "A detailed, generation-ready image prompt for the scene."
                }
            },
            "required": ["segment", "visualIdea", "imagePrompt"]
        }
    })
}

/// Build the analysis request for a transcript.
pub fn analysis_request(transcript: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        system_instruction: Some(Content::from_text(ANALYSIS_SYSTEM_INSTRUCTION)),
        contents: vec![Content::from_text(transcript)],
        generation_config: Some(GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(analysis_schema()),
            image_config: None,
        }),
    }
}

/// Build the image-generation request for a scene prompt.
pub fn image_request(prompt: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        system_instruction: None,
        contents: vec![Content::from_text(prompt)],
        generation_config: Some(GenerationConfig {
            response_mime_type: None,
            response_schema: None,
            image_config: Some(ImageConfig {
                aspect_ratio: ASPECT_RATIO.to_string(),
                image_size: IMAGE_SIZE.to_string(),
            }),
        }),
    }
}

/// Build the video-job request from a scene prompt and its still image.
pub fn video_request(prompt: &str, image: &MediaPayload) -> PredictLongRunningRequest {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine as _;

    PredictLongRunningRequest {
        instances: vec![VideoInstance {
            prompt: prompt.to_string(),
            image: Some(ImageBytes {
                bytes_base64_encoded: BASE64.encode(&image.bytes),
                mime_type: image.mime_type.clone(),
            }),
        }],
        parameters: VideoParameters {
            sample_count: VIDEO_SAMPLE_COUNT,
            aspect_ratio: ASPECT_RATIO.to_string(),
            resolution: VIDEO_RESOLUTION.to_string(),
        },
    }
}

// ---------------------------------------------------------------------------
// Response extractors
// ---------------------------------------------------------------------------

/// First text part in the first candidate, if any.
pub fn first_text(response: &GenerateContentResponse) -> Option<&str> {
    response
        .candidates
        .first()?
        .content
        .as_ref()?
        .parts
        .iter()
        .find_map(|part| part.text.as_deref())
}

/// First inline binary part in the first candidate, if any.
pub fn first_inline_data(response: &GenerateContentResponse) -> Option<&InlineData> {
    response
        .candidates
        .first()?
        .content
        .as_ref()?
        .parts
        .iter()
        .find_map(|part| part.inline_data.as_ref())
}

/// URI of the first generated video sample, if any.
pub fn first_video_uri(operation: &Operation) -> Option<&str> {
    operation
        .response
        .as_ref()?
        .generate_video_response
        .as_ref()?
        .generated_samples
        .first()?
        .video
        .as_ref()?
        .uri
        .as_deref()
}
