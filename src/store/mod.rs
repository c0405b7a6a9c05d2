//! Endpoint state storage.
//!
//! # Data Flow
//! ```text
//! worker (single writer)
//!     → EndpointStore per service (endpoint.rs)
//!         → TtlStore<String, WeightedEndpointStatus> (ttl.rs)
//!     → snapshot publish walks list() of every service store
//! ```
//!
//! # Design Decisions
//! - Generic engine (ttl.rs) plus a typed façade (endpoint.rs)
//! - Expiry is lazy: expired entries are invisible to get/list and
//!   removed on mutable access or by an explicit sweep
//! - Not thread-safe on purpose; exactly one task owns the live tree

pub mod endpoint;
pub mod ttl;

pub use endpoint::EndpointStore;
pub use ttl::TtlStore;
