//! Typed REST client for the Google Gemini API.
//!
//! Covers the three calls the storyboard needs: transcript analysis via
//! `generateContent` with a structured-output schema, still image
//! generation via `generateContent` with an image config, and video
//! generation via `predictLongRunning` plus bounded operation polling
//! and an authenticated download of the result.

pub mod api;
pub mod config;
pub mod messages;
pub mod poll;

pub use api::{GeminiClient, GeminiError};
pub use config::{GeminiConfig, PollConfig};
