//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Collector, worker and snapshot publisher produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured key=value fields, never preformatted strings for data
//! - Metrics are cheap (atomic increments) and safe to emit without an
//!   installed recorder
//! - A failed exporter install is logged, never fatal

pub mod logging;
pub mod metrics;

use crate::config::ObservabilityConfig;

/// Initialize logging and, when enabled, the Prometheus exporter.
pub fn init(config: &ObservabilityConfig) {
    logging::init_logging(config);

    if config.metrics_enabled {
        match config.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr, config.metrics_idle_timeout()),
            Err(_) => tracing::error!(
                metrics_address = %config.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }
}
