//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the detector.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the failure detector.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DetectorConfig {
    /// Ingress channel settings.
    pub ingress: IngressConfig,

    /// Endpoint state store settings.
    pub store: StoreConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl DetectorConfig {
    /// TTL of the live (mutable) per-service stores.
    pub fn live_ttl(&self) -> Duration {
        Duration::from_secs(self.store.live_ttl_secs)
    }

    /// TTL carried by published snapshots.
    pub fn snapshot_ttl(&self) -> Duration {
        Duration::from_secs(self.store.snapshot_ttl_secs)
    }
}

/// Ingress channel configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IngressConfig {
    /// Maximum number of samples buffered between the proxy and the
    /// collector (backpressure).
    pub capacity: usize,
}

impl Default for IngressConfig {
    fn default() -> Self {
        Self { capacity: 1000 }
    }
}

/// Endpoint state store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Endpoints not sampled within this many seconds are forgotten.
    pub live_ttl_secs: u64,

    /// TTL for the read-only snapshot. Snapshots are replaced wholesale,
    /// so this only needs to outlive the live TTL.
    pub snapshot_ttl_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            live_ttl_secs: 60,
            snapshot_ttl_secs: 24 * 3600,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,

    /// Gauges not updated for this many seconds are dropped from the
    /// scrape output, so evicted endpoints stop exporting a weight.
    pub metrics_idle_timeout_secs: u64,
}

impl ObservabilityConfig {
    pub fn metrics_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.metrics_idle_timeout_secs)
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
            metrics_idle_timeout_secs: 120,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DetectorConfig::default();
        assert_eq!(config.ingress.capacity, 1000);
        assert_eq!(config.live_ttl(), Duration::from_secs(60));
        assert!(config.snapshot_ttl() > config.live_ttl());
        assert!(!config.observability.metrics_enabled);
        assert!(config.observability.metrics_idle_timeout() > config.live_ttl());
    }

    #[test]
    fn test_partial_toml() {
        let config: DetectorConfig = toml::from_str(
            r#"
            [store]
            live_ttl_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.store.live_ttl_secs, 30);
        assert_eq!(config.store.snapshot_ttl_secs, 24 * 3600);
        assert_eq!(config.ingress.capacity, 1000);
        assert_eq!(config.observability.log_level, "info");
    }
}
