//! Two-stage processing pipeline.
//!
//! # Responsibilities
//! - Collector: move samples from the ingress channel into the batch queue
//! - Worker: fold each batch into the live store, re-score touched
//!   endpoints, publish a snapshot when anything changed
//!
//! # Design Decisions
//! - Exactly one worker owns the live tree; it is a plain `HashMap` and is
//!   never shared, so scoring needs no locking
//! - A panic inside one iteration is caught, counted and logged; the task
//!   keeps running and the batch key is still released
//! - Shutdown is only observed between iterations, never inside a batch
//! - Idle endpoints are swept from each service a batch touches, and from
//!   the whole tree once per live TTL, so churned pods never pile up

use std::collections::{HashMap, HashSet};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::detector::snapshot::{Snapshot, SnapshotCell};
use crate::health::policy::Evaluator;
use crate::health::sample::EndpointSample;
use crate::health::state::WeightedEndpointStatus;
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::queue::BatchQueue;
use crate::store::EndpointStore;

/// Derives the batch key a sample is grouped under.
pub type KeyFunc = Arc<dyn Fn(&EndpointSample) -> String + Send + Sync>;

/// Groups samples by `namespace/service`.
pub fn default_key_fn() -> KeyFunc {
    Arc::new(|sample: &EndpointSample| sample.service_key())
}

/// Queue shared by the two stages.
pub type SampleQueue = BatchQueue<String, EndpointSample>;

/// Stage A: drain the ingress channel into the batch queue.
pub async fn collect(
    mut ingress: mpsc::Receiver<EndpointSample>,
    queue: Arc<SampleQueue>,
    key_fn: KeyFunc,
    mut shutdown: ShutdownSignal,
) {
    tracing::debug!("Collector starting");

    loop {
        let sample = tokio::select! {
            biased;
            _ = shutdown.wait() => {
                tracing::debug!("Collector received shutdown signal, exiting loop");
                break;
            }
            sample = ingress.recv() => match sample {
                Some(sample) => sample,
                None => {
                    tracing::debug!("Ingress closed, collector exiting");
                    break;
                }
            },
        };

        match catch_unwind(AssertUnwindSafe(|| key_fn(&sample))) {
            Ok(key) => {
                if !queue.add(key, sample) {
                    tracing::warn!("Batch queue shut down, dropping sample");
                }
            }
            Err(_) => {
                metrics::record_task_panic("collector");
                tracing::error!(
                    namespace = %sample.namespace,
                    service = %sample.service,
                    "Key function panicked, sample dropped"
                );
            }
        }
    }
}

/// Stage B: take batches off the queue until shutdown.
pub async fn work(mut processor: Processor, queue: Arc<SampleQueue>, mut shutdown: ShutdownSignal) {
    tracing::debug!("Worker starting");

    let period = processor.live_ttl;
    let mut sweep = interval_at(Instant::now() + period, period);
    sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let (key, batch) = tokio::select! {
            biased;
            _ = shutdown.wait() => {
                tracing::debug!("Worker received shutdown signal, exiting loop");
                break;
            }
            _ = sweep.tick() => {
                if catch_unwind(AssertUnwindSafe(|| processor.sweep_idle())).is_err() {
                    metrics::record_task_panic("worker");
                    tracing::error!("Idle sweep panicked");
                }
                continue;
            }
            next = queue.get() => match next {
                Some(next) => next,
                None => {
                    tracing::debug!("Batch queue drained, worker exiting");
                    break;
                }
            },
        };

        if catch_unwind(AssertUnwindSafe(|| processor.process_batch(&batch))).is_err() {
            metrics::record_task_panic("worker");
            tracing::error!(key = %key, samples = batch.len(), "Batch processing panicked, batch skipped");
        }
        queue.done(&key);
    }
}

/// Owner of the live endpoint tree.
pub struct Processor {
    live: HashMap<String, EndpointStore>,
    live_ttl: Duration,
    snapshot_ttl: Duration,
    evaluator: Arc<dyn Evaluator>,
    snapshots: Arc<SnapshotCell>,
    version: u64,
}

impl Processor {
    pub fn new(
        live_ttl: Duration,
        snapshot_ttl: Duration,
        evaluator: Arc<dyn Evaluator>,
        snapshots: Arc<SnapshotCell>,
    ) -> Self {
        Self {
            live: HashMap::new(),
            live_ttl,
            snapshot_ttl,
            evaluator,
            snapshots,
            version: 0,
        }
    }

    /// Apply one batch. Returns whether a new snapshot was published.
    pub fn process_batch(&mut self, samples: &[EndpointSample]) -> bool {
        if samples.is_empty() {
            return false;
        }

        let live_ttl = self.live_ttl;
        let mut seen = HashSet::new();
        let mut touched = Vec::new();

        for sample in samples {
            let endpoint = match sample.endpoint_key() {
                Ok(endpoint) => endpoint,
                Err(e) => {
                    tracing::warn!(
                        namespace = %sample.namespace,
                        service = %sample.service,
                        error = %e,
                        "Dropping sample without endpoint identity"
                    );
                    continue;
                }
            };
            let service = sample.service_key();

            self.live
                .entry(service.clone())
                .or_insert_with(|| EndpointStore::new(live_ttl))
                .touch(&endpoint)
                .add(sample.to_sample());
            metrics::record_sample(sample.is_err());

            if seen.insert((service.clone(), endpoint.clone())) {
                touched.push((service, endpoint));
            }
        }

        // Endpoints in this batch were just refreshed, so only idle ones go.
        let services: HashSet<&String> = touched.iter().map(|(service, _)| service).collect();
        let mut evicted = 0;
        for service in services {
            if let Some(store) = self.live.get_mut(service) {
                evicted += store.purge_expired();
            }
        }

        let mut dirty = evicted > 0;
        for (service, endpoint) in &touched {
            let Some(status) = self.live.get_mut(service).and_then(|s| s.get_mut(endpoint)) else {
                continue;
            };
            if self.evaluator.evaluate(status) {
                tracing::debug!(
                    service = %service,
                    endpoint = %endpoint,
                    weight = status.weight(),
                    status = %status.status(),
                    "Endpoint weight changed"
                );
                metrics::record_weight_change();
                dirty = true;
            }
            metrics::record_endpoint_weight(service, endpoint, status.weight());
        }

        metrics::record_batch(samples.len());
        tracing::trace!(
            samples = samples.len(),
            endpoints = touched.len(),
            evicted,
            dirty,
            "Batch processed"
        );

        if dirty {
            self.publish();
        }
        dirty
    }

    /// Live status of one endpoint, including its sample window.
    pub fn live_status(&self, service_key: &str, endpoint_key: &str) -> Option<&WeightedEndpointStatus> {
        self.live.get(service_key)?.get(endpoint_key)
    }

    /// Drop endpoints idle past the live TTL across every service,
    /// publishing when anything was evicted. Returns the eviction count.
    pub fn sweep_idle(&mut self) -> usize {
        let evicted = self.purge_live();
        if evicted > 0 {
            tracing::debug!(evicted, "Idle endpoints evicted");
            self.publish();
        }
        evicted
    }

    fn purge_live(&mut self) -> usize {
        let mut evicted = 0;
        self.live.retain(|_, store| {
            evicted += store.purge_expired();
            !store.is_empty()
        });
        metrics::record_live_endpoints(self.live.values().map(EndpointStore::len).sum());
        evicted
    }

    fn publish(&mut self) {
        self.purge_live();

        self.version += 1;
        let snapshot = Snapshot::from_live(&self.live, self.snapshot_ttl, self.version);
        metrics::record_snapshot(snapshot.endpoint_count());
        tracing::debug!(
            version = self.version,
            services = self.live.len(),
            endpoints = snapshot.endpoint_count(),
            "Snapshot published"
        );
        self.snapshots.publish(snapshot);
    }
}
