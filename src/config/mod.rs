//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → DetectorConfig (validated, immutable)
//!     → handed to FailureDetector::new
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; a detector is built from one value
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::DetectorConfig;
pub use schema::IngressConfig;
pub use schema::ObservabilityConfig;
pub use schema::StoreConfig;
pub use validation::{validate_config, ValidationError};
