//! Domain types and pure logic for the Storyreel storyboard service.
//!
//! Everything in this crate is synchronous and side-effect free: the scene
//! and snapshot types, the board phase machine, validation helpers, batch
//! selection, and the data-URI codec. The HTTP and provider layers build
//! on top of these.

pub mod error;
pub mod media;
pub mod scene;
pub mod storyboard;
pub mod types;

pub use error::CoreError;
