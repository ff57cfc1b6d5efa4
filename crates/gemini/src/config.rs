//! Client configuration, constructed once per credential value.

use std::time::Duration;

/// Default public API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Text model used for transcript analysis.
pub const DEFAULT_ANALYSIS_MODEL: &str = "gemini-2.5-flash";

/// Image model used for scene stills.
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-3-pro-image-preview";

/// Video model used for scene clips.
pub const DEFAULT_VIDEO_MODEL: &str = "veo-3.1-fast-generate-preview";

/// Tunable parameters for long-running operation polling.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay before the first status check, and the backoff floor.
    pub initial_delay: Duration,
    /// Upper bound on the delay between status checks.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each pending check.
    pub multiplier: f64,
    /// Hard bound on status checks before the poll gives up.
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(30),
            multiplier: 1.5,
            max_attempts: 120,
        }
    }
}

/// Configuration for a [`GeminiClient`](crate::GeminiClient).
///
/// Holds the API credential. Construct one per credential value and inject
/// it wherever generation calls are made; the manual [`Debug`] impl keeps
/// the key out of logs.
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key sent in the `x-goog-api-key` header.
    pub api_key: String,
    /// Base URL, without a trailing slash.
    pub base_url: String,
    pub analysis_model: String,
    pub image_model: String,
    pub video_model: String,
    pub poll: PollConfig,
}

impl GeminiConfig {
    /// Build a configuration with default endpoint and models.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            analysis_model: DEFAULT_ANALYSIS_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            video_model: DEFAULT_VIDEO_MODEL.to_string(),
            poll: PollConfig::default(),
        }
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("analysis_model", &self.analysis_model)
            .field("image_model", &self.image_model)
            .field("video_model", &self.video_model)
            .field("poll", &self.poll)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_api_key() {
        let config = GeminiConfig::new("super-secret-key");
        let debug = format!("{config:?}");

        assert!(!debug.contains("super-secret-key"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn defaults_match_documented_models() {
        let config = GeminiConfig::new("k");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.analysis_model, "gemini-2.5-flash");
        assert_eq!(config.image_model, "gemini-3-pro-image-preview");
        assert_eq!(config.video_model, "veo-3.1-fast-generate-preview");
    }

    #[test]
    fn default_poll_bounds() {
        let poll = PollConfig::default();
        assert_eq!(poll.initial_delay, Duration::from_secs(5));
        assert_eq!(poll.max_delay, Duration::from_secs(30));
        assert_eq!(poll.max_attempts, 120);
    }
}
