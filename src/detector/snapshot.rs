//! Immutable read-side view of endpoint health.
//!
//! The worker builds a fresh [`Snapshot`] from the live tree and swaps it
//! into a [`SnapshotCell`]. Readers load the current pointer without
//! locking; a reader holding an older snapshot keeps a consistent view
//! until it lets go of it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use url::Url;

use crate::health::sample::{endpoint_key, service_key};
use crate::health::state::WeightedEndpointStatus;
use crate::store::EndpointStore;

/// Verdict for anything the detector knows nothing about.
pub const FAIL_OPEN: (bool, f32) = (true, 1.0);

/// Point-in-time copy of every service's endpoint statuses, without history.
#[derive(Debug)]
pub struct Snapshot {
    services: HashMap<String, EndpointStore>,
    version: u64,
}

impl Snapshot {
    /// Deep-copy the live tree. Sample windows are not carried over.
    pub fn from_live(live: &HashMap<String, EndpointStore>, ttl: Duration, version: u64) -> Self {
        let services = live
            .iter()
            .map(|(service, store)| {
                let mut copy = EndpointStore::new(ttl);
                for status in store.list() {
                    copy.add(status.without_history());
                }
                (service.clone(), copy)
            })
            .collect();

        Self { services, version }
    }

    /// Monotonic publish counter, starting at 1.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    pub fn endpoints(&self, service_key: &str) -> Vec<&WeightedEndpointStatus> {
        self.services
            .get(service_key)
            .map(|store| store.list())
            .unwrap_or_default()
    }

    pub fn endpoint(&self, service_key: &str, endpoint_key: &str) -> Option<&WeightedEndpointStatus> {
        self.services.get(service_key)?.get(endpoint_key)
    }

    pub fn endpoint_count(&self) -> usize {
        self.services.values().map(EndpointStore::len).sum()
    }
}

/// Atomically replaced slot holding the latest snapshot.
#[derive(Debug, Default)]
pub struct SnapshotCell {
    current: ArcSwapOption<Snapshot>,
}

impl SnapshotCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current snapshot wholesale.
    pub fn publish(&self, snapshot: Snapshot) {
        self.current.store(Some(Arc::new(snapshot)));
    }

    pub fn load(&self) -> Option<Arc<Snapshot>> {
        self.current.load_full()
    }

    /// `(healthy, weight)` for an endpoint, failing open on any miss.
    pub fn endpoint_status(&self, namespace: &str, service: &str, url: &Url) -> (bool, f32) {
        let guard = self.current.load();
        let Some(snapshot) = &*guard else {
            return FAIL_OPEN;
        };
        let Ok(endpoint) = endpoint_key(url) else {
            return FAIL_OPEN;
        };

        match snapshot.endpoint(&service_key(namespace, service), &endpoint) {
            Some(status) => (status.is_healthy(), status.weight()),
            None => FAIL_OPEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::sample::Sample;

    fn live_tree() -> HashMap<String, EndpointStore> {
        let mut store = EndpointStore::new(Duration::from_secs(60));
        let status = store.touch("10.0.0.1:80");
        status.add(Sample::Failure);
        status.set_weight(0.0);
        status.refresh_status();
        store.touch("10.0.0.2:80");

        let mut live = HashMap::new();
        live.insert("ns/svc".to_string(), store);
        live
    }

    #[test]
    fn test_empty_cell_fails_open() {
        let cell = SnapshotCell::new();
        let url = Url::parse("http://10.0.0.1:80").unwrap();
        assert!(cell.load().is_none());
        assert_eq!(cell.endpoint_status("ns", "svc", &url), FAIL_OPEN);
    }

    #[test]
    fn test_snapshot_copies_without_history() {
        let live = live_tree();
        let snapshot = Snapshot::from_live(&live, Duration::from_secs(3600), 1);

        assert_eq!(snapshot.version(), 1);
        assert_eq!(snapshot.endpoint_count(), 2);
        assert_eq!(snapshot.services().collect::<Vec<_>>(), vec!["ns/svc"]);
        assert_eq!(snapshot.endpoints("ns/svc").len(), 2);
        assert!(snapshot.endpoints("ns/other").is_empty());

        let status = snapshot.endpoint("ns/svc", "10.0.0.1:80").unwrap();
        assert_eq!(status.weight(), 0.0);
        assert!(!status.is_healthy());
        assert!(status.window().is_empty());
    }

    #[test]
    fn test_lookup_through_cell() {
        let cell = SnapshotCell::new();
        cell.publish(Snapshot::from_live(&live_tree(), Duration::from_secs(3600), 1));

        let sick = Url::parse("http://10.0.0.1:80/api").unwrap();
        let fine = Url::parse("http://10.0.0.2/").unwrap();
        let unknown = Url::parse("http://10.0.0.9:80").unwrap();

        assert_eq!(cell.endpoint_status("ns", "svc", &sick), (false, 0.0));
        assert_eq!(cell.endpoint_status("ns", "svc", &fine), (true, 1.0));
        assert_eq!(cell.endpoint_status("ns", "svc", &unknown), FAIL_OPEN);
        assert_eq!(cell.endpoint_status("other", "svc", &sick), FAIL_OPEN);
    }

    #[test]
    fn test_old_reference_is_unchanged_by_publish() {
        let cell = SnapshotCell::new();
        cell.publish(Snapshot::from_live(&live_tree(), Duration::from_secs(3600), 1));
        let old = cell.load().unwrap();

        cell.publish(Snapshot::from_live(&HashMap::new(), Duration::from_secs(3600), 2));

        assert_eq!(old.version(), 1);
        assert_eq!(old.endpoint_count(), 2);
        assert_eq!(cell.load().unwrap().version(), 2);
        assert_eq!(cell.load().unwrap().endpoint_count(), 0);
    }
}
