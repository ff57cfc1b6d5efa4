//! REST wrapper for the Gemini `generateContent` and `predictLongRunning`
//! endpoints, plus authenticated file download.

use storyreel_core::media::MediaPayload;

use crate::config::GeminiConfig;
use crate::messages::{
    self, GenerateContentResponse, Operation,
};

/// Header carrying the API credential.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Cap on error-response bodies kept for diagnostics.
const MAX_ERROR_BODY: usize = 2048;

/// MIME type assumed for downloads that omit a content type.
const DEFAULT_VIDEO_MIME: &str = "video/mp4";

/// HTTP client for the Gemini API, bound to one credential.
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

/// Errors from the Gemini REST layer.
#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("Gemini API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body text, truncated for diagnostics.
        body: String,
    },

    /// The reply was well-formed HTTP but missing an expected element.
    #[error("Invalid Gemini response: {0}")]
    InvalidResponse(&'static str),

    /// Structured analysis output that does not parse as the scene array.
    #[error("Analysis output is not valid scene JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// An inline payload that is not valid base64.
    #[error("Invalid inline payload: {0}")]
    InvalidPayload(#[from] base64::DecodeError),

    /// The video operation did not finish within the configured bound.
    #[error("Video operation still pending after {attempts} status checks")]
    PollTimeout { attempts: u32 },

    /// The poll was aborted by its cancellation token.
    #[error("Operation cancelled")]
    Cancelled,

    /// The operation finished with a provider-reported error.
    #[error("Video generation failed: {0}")]
    OperationFailed(String),
}

impl GeminiClient {
    /// Create a client for the given configuration.
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: GeminiConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Analyze a transcript into scene items.
    ///
    /// Sends a `generateContent` request with the structured-output schema
    /// and parses the reply's text part as the scene array.
    pub async fn analyze_transcript(
        &self,
        transcript: &str,
    ) -> Result<Vec<storyreel_core::scene::AnalysisItem>, GeminiError> {
        let request = messages::analysis_request(transcript);
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.analysis_model
        );

        tracing::debug!(model = %self.config.analysis_model, "Submitting transcript analysis");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let reply: GenerateContentResponse = Self::parse_response(response).await?;
        let text = messages::first_text(&reply)
            .ok_or(GeminiError::InvalidResponse("no text part in analysis reply"))?;

        Ok(serde_json::from_str(text)?)
    }

    /// Generate a still image for a scene prompt.
    ///
    /// Returns the decoded payload of the first inline part in the reply.
    pub async fn generate_image(&self, prompt: &str) -> Result<MediaPayload, GeminiError> {
        use base64::engine::general_purpose::STANDARD as BASE64;
        use base64::Engine as _;

        let request = messages::image_request(prompt);
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.image_model
        );

        tracing::debug!(model = %self.config.image_model, "Submitting image generation");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let reply: GenerateContentResponse = Self::parse_response(response).await?;
        let inline = messages::first_inline_data(&reply)
            .ok_or(GeminiError::InvalidResponse("no inline image payload in reply"))?;

        Ok(MediaPayload {
            mime_type: inline.mime_type.clone(),
            bytes: BASE64.decode(&inline.data)?,
        })
    }

    /// Submit a video job for a scene.
    ///
    /// Sends a `predictLongRunning` request with the prompt and starting
    /// image. Returns the operation handle to poll.
    pub async fn submit_video(
        &self,
        prompt: &str,
        image: &MediaPayload,
    ) -> Result<Operation, GeminiError> {
        let request = messages::video_request(prompt, image);
        let url = format!(
            "{}/v1beta/models/{}:predictLongRunning",
            self.config.base_url, self.config.video_model
        );

        tracing::debug!(model = %self.config.video_model, "Submitting video job");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Fetch the current state of a long-running operation.
    pub async fn poll_operation(&self, operation_name: &str) -> Result<Operation, GeminiError> {
        let url = format!("{}/v1beta/{}", self.config.base_url, operation_name);

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Download a generated file with the credential attached.
    ///
    /// The MIME type is taken from the response's `Content-Type`,
    /// defaulting to `video/mp4` when absent.
    pub async fn download_file(&self, uri: &str) -> Result<MediaPayload, GeminiError> {
        tracing::debug!(uri, "Downloading generated file");

        let response = self
            .client
            .get(uri)
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or(DEFAULT_VIDEO_MIME)
            .to_string();

        let bytes = response.bytes().await?;

        Ok(MediaPayload {
            mime_type,
            bytes: bytes.to_vec(),
        })
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the response
    /// unchanged on success, or a [`GeminiError::Api`] with the status and
    /// truncated body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, GeminiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            // Char-based cap: a byte-index truncate could split a UTF-8
            // sequence and panic.
            let body: String = body.chars().take(MAX_ERROR_BODY).collect();
            return Err(GeminiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GeminiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
