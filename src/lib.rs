//! Passive endpoint failure detection.
//!
//! A proxy reports the outcome of every request it forwards; the detector
//! folds those outcomes into a per-endpoint weight and publishes an
//! immutable snapshot the router consults on its hot path.
//!
//! ```text
//! proxy ─▶ collector ─▶ batch queue ─▶ worker ─▶ snapshot ◀─ router
//! ```

// Core pipeline
pub mod detector;
pub mod health;
pub mod queue;
pub mod store;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::DetectorConfig;
pub use detector::FailureDetector;
pub use health::EndpointSample;
pub use lifecycle::Shutdown;
