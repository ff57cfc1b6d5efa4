//! Shared type aliases and size limits used across the workspace.

use chrono::{DateTime, Utc};

/// Scene identifier: the scene's zero-based position in the board at
/// analysis time, rendered as a string (`"0"`, `"1"`, ...).
pub type SceneId = String;

/// UTC timestamp type used across the workspace.
pub type Timestamp = DateTime<Utc>;

/// Upper bound on the transcript size accepted for analysis.
pub const MAX_TRANSCRIPT_CHARS: usize = 100_000;

/// Upper bound on an edited image prompt.
pub const MAX_PROMPT_CHARS: usize = 4_000;
