//! Typed store holding one [`WeightedEndpointStatus`] per endpoint of a service.

use std::time::Duration;

use crate::health::state::WeightedEndpointStatus;
use crate::store::ttl::TtlStore;

/// Endpoints of one service, keyed by endpoint key (`host:port`).
#[derive(Debug, Clone)]
pub struct EndpointStore {
    inner: TtlStore<String, WeightedEndpointStatus>,
}

impl EndpointStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: TtlStore::new(ttl),
        }
    }

    /// Insert or replace the status stored under its own URL.
    pub fn add(&mut self, status: WeightedEndpointStatus) {
        self.inner.add(status.url().to_string(), status);
    }

    /// `None` means unknown, which callers treat as healthy.
    pub fn get(&self, endpoint: &str) -> Option<&WeightedEndpointStatus> {
        self.inner.get(endpoint)
    }

    pub fn get_mut(&mut self, endpoint: &str) -> Option<&mut WeightedEndpointStatus> {
        self.inner.get_mut(endpoint)
    }

    /// Refresh the endpoint, seeding a healthy status on first sight.
    pub fn touch(&mut self, endpoint: &str) -> &mut WeightedEndpointStatus {
        self.inner
            .touch_or_insert_with(endpoint.to_string(), || WeightedEndpointStatus::new(endpoint))
    }

    pub fn list(&self) -> Vec<&WeightedEndpointStatus> {
        self.inner.list()
    }

    pub fn purge_expired(&mut self) -> usize {
        self.inner.purge_expired()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.inner.ttl()
    }
}
