//! Shared plumbing for the bridge services: tracing initialization and the environment knobs
//! that go with it.

pub mod logging;

// Re-export tracing crate for convenience.
pub use tracing;
