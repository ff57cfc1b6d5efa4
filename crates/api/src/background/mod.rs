//! Background generation tasks.
//!
//! Each function is a long-running async task spawned onto the app's
//! `TaskTracker` by a handler after the store has atomically accepted the
//! operation. Tasks report back through the store's `complete_*` methods,
//! which drop results whose scene no longer exists.

pub mod generation;
