//! Endpoint health model and scoring.
//!
//! # Data Flow
//! ```text
//! Proxy observes a request outcome:
//!     → EndpointSample (sample.rs)
//!     → reduced to Sample and pushed into the endpoint's window (state.rs)
//!     → Evaluator folds a full same-signed window into the weight (policy.rs)
//! ```
//!
//! # Design Decisions
//! - Only success/error outcomes are modeled, not latency
//! - The window is a trigger, the weight is the memory: once a window is
//!   folded into the weight it is cleared
//! - Health state is per-endpoint, grouped per service by the store

pub mod policy;
pub mod sample;
pub mod state;

pub use policy::{ConsecutiveRunEvaluator, Evaluator};
pub use sample::{endpoint_key, service_key, EndpointSample, Sample, SampleError};
pub use state::{WeightedEndpointStatus, TOO_MANY_ERRORS, WINDOW_SIZE};
