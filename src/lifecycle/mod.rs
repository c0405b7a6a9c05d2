//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     FailureDetector::new (no background work)
//!     → FailureDetector::run(signal) spawns collector + worker
//!
//! Shutdown (shutdown.rs):
//!     Shutdown::trigger → collector stops receiving
//!     → worker finishes the batch in hand → run returns
//! ```
//!
//! # Design Decisions
//! - Construction never starts tasks; run is explicit
//! - Shutdown never interrupts a batch midway

pub mod shutdown;

pub use shutdown::{Shutdown, ShutdownSignal};
