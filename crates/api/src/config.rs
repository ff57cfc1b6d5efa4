use std::time::Duration;

use storyreel_gemini::{GeminiConfig, PollConfig};

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated
    /// `CORS_ALLOWED_ORIGINS`. A single `*` entry allows any origin.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Grace period for in-flight generation tasks at shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Directory the static UI is served from, relative to the working
    /// directory (default: `crates/api/static` for `cargo run` at the
    /// workspace root).
    pub static_dir: String,
    /// Provider configuration; `None` when `GEMINI_API_KEY` is unset, which
    /// disables all generation operations (they return 503).
    pub gemini: Option<GeminiConfig>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                     |
    /// |--------------------------|-----------------------------|
    /// | `HOST`                   | `0.0.0.0`                   |
    /// | `PORT`                   | `3000`                      |
    /// | `CORS_ALLOWED_ORIGINS`   | `http://localhost:5173`     |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                        |
    /// | `SHUTDOWN_TIMEOUT_SECS`  | `30`                        |
    /// | `STATIC_DIR`             | `crates/api/static`         |
    /// | `GEMINI_API_KEY`         | unset (generation disabled) |
    /// | `GEMINI_BASE_URL`        | Google endpoint             |
    /// | `GEMINI_ANALYSIS_MODEL`  | `gemini-2.5-flash`          |
    /// | `GEMINI_IMAGE_MODEL`     | `gemini-3-pro-image-preview`|
    /// | `GEMINI_VIDEO_MODEL`     | `veo-3.1-fast-generate-preview` |
    /// | `VIDEO_POLL_INITIAL_SECS`| `5`                         |
    /// | `VIDEO_POLL_MAX_SECS`    | `30`                        |
    /// | `VIDEO_POLL_MAX_ATTEMPTS`| `120`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let static_dir =
            std::env::var("STATIC_DIR").unwrap_or_else(|_| "crates/api/static".into());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            static_dir,
            gemini: gemini_from_env(),
        }
    }
}

/// Build the provider configuration from the environment, if a credential
/// is present.
///
/// The client is constructed exactly once per credential value, at startup;
/// operations receive it by injection rather than re-reading the
/// environment per call.
fn gemini_from_env() -> Option<GeminiConfig> {
    let api_key = std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty())?;

    let mut config = GeminiConfig::new(api_key);

    if let Ok(base_url) = std::env::var("GEMINI_BASE_URL") {
        config.base_url = base_url.trim_end_matches('/').to_string();
    }
    if let Ok(model) = std::env::var("GEMINI_ANALYSIS_MODEL") {
        config.analysis_model = model;
    }
    if let Ok(model) = std::env::var("GEMINI_IMAGE_MODEL") {
        config.image_model = model;
    }
    if let Ok(model) = std::env::var("GEMINI_VIDEO_MODEL") {
        config.video_model = model;
    }

    let initial_secs: u64 = std::env::var("VIDEO_POLL_INITIAL_SECS")
        .unwrap_or_else(|_| "5".into())
        .parse()
        .expect("VIDEO_POLL_INITIAL_SECS must be a valid u64");

    let max_secs: u64 = std::env::var("VIDEO_POLL_MAX_SECS")
        .unwrap_or_else(|_| "30".into())
        .parse()
        .expect("VIDEO_POLL_MAX_SECS must be a valid u64");

    let max_attempts: u32 = std::env::var("VIDEO_POLL_MAX_ATTEMPTS")
        .unwrap_or_else(|_| "120".into())
        .parse()
        .expect("VIDEO_POLL_MAX_ATTEMPTS must be a valid u32");

    config.poll = PollConfig {
        initial_delay: Duration::from_secs(initial_secs),
        max_delay: Duration::from_secs(max_secs),
        max_attempts,
        ..PollConfig::default()
    };

    Some(config)
}
