// Weav AI platform client
//
// This crate wraps the Weav AI REST services (agent-service,
// prompt-management-service, file-service) behind typed operations.
// Key design decisions:
// - One `Client` carries the base URL and bearer token; service groups borrow it
// - Configuration is an explicit value handed to the constructor, never ambient state
// - Storage-layer `_id` keys are renamed to `id` exactly once, at the response boundary
// - Streamed agent replies are assembled from raw SSE blocks; blocks that fail
//   validation are dropped in the default mode and surfaced in strict mode

pub mod agents;
pub mod client;
pub mod config;
pub mod error;
pub mod files;
pub mod normalize;
pub mod prompts;
pub mod sse;

// Re-exports
pub use client::Client;
pub use config::Config;
pub use error::Error;
pub use sse::{AgentEvent, ParseMode};
