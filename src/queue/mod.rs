//! Work queue grouping items by key.
//!
//! # Data Flow
//! ```text
//! collector: add(service_key, sample)
//!     → pending[key] grows, key marked ready once
//! worker: get() → (key, all pending items) and key marked processing
//!     → process
//!     → done(key) → key ready again if items arrived meanwhile
//! ```
//!
//! # Design Decisions
//! - A key is handed to at most one worker at a time
//! - Items added while a key is checked out wait for the next delivery
//! - `get` is cancel-safe: nothing is dequeued until it returns

pub mod batch;

pub use batch::BatchQueue;
