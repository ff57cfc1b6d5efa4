//! HTTP request handlers, grouped by route tree.

pub mod media;
pub mod scene;
pub mod storyboard;
