//! Failure detector façade.
//!
//! # Data Flow
//! ```text
//! proxy ──send──▶ ingress channel (bounded, backpressure)
//!                     │
//!                     ▼
//!              collector task ──add(key, sample)──▶ BatchQueue
//!                                                      │ get()
//!                                                      ▼
//!              worker task: live store → evaluator → publish?
//!                                                      │
//!                                                      ▼
//! router ──endpoint_status──▶ SnapshotCell (atomic swap, no locks)
//! ```
//!
//! # Design Decisions
//! - Constructing a detector starts nothing; `run` drives both tasks
//! - Unknown services and endpoints are reported healthy at full weight
//! - The query path never touches the live store

pub mod processor;
pub mod snapshot;

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use url::Url;

use crate::config::DetectorConfig;
use crate::health::policy::{ConsecutiveRunEvaluator, Evaluator};
use crate::health::sample::EndpointSample;
use crate::lifecycle::ShutdownSignal;

pub use processor::{default_key_fn, KeyFunc, Processor, SampleQueue};
pub use snapshot::{Snapshot, SnapshotCell, FAIL_OPEN};

/// Passive failure detector for proxied endpoints.
pub struct FailureDetector {
    config: DetectorConfig,
    ingress_tx: mpsc::Sender<EndpointSample>,
    ingress_rx: Mutex<Option<mpsc::Receiver<EndpointSample>>>,
    queue: Arc<SampleQueue>,
    snapshots: Arc<SnapshotCell>,
    key_fn: KeyFunc,
    evaluator: Arc<dyn Evaluator>,
}

impl FailureDetector {
    /// Create a detector. No background work starts until [`run`](Self::run).
    pub fn new(config: DetectorConfig) -> Self {
        let (ingress_tx, ingress_rx) = mpsc::channel(config.ingress.capacity.max(1));

        Self {
            config,
            ingress_tx,
            ingress_rx: Mutex::new(Some(ingress_rx)),
            queue: Arc::new(SampleQueue::new()),
            snapshots: Arc::new(SnapshotCell::new()),
            key_fn: default_key_fn(),
            evaluator: Arc::new(ConsecutiveRunEvaluator::new()),
        }
    }

    /// Replace the batch grouping key.
    pub fn with_key_fn(mut self, key_fn: KeyFunc) -> Self {
        self.key_fn = key_fn;
        self
    }

    /// Replace the scoring policy.
    pub fn with_evaluator(mut self, evaluator: Arc<dyn Evaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Send-only handle the proxy submits samples through.
    ///
    /// `send` waits while the channel is full and fails once `run` returned.
    pub fn collector(&self) -> mpsc::Sender<EndpointSample> {
        self.ingress_tx.clone()
    }

    /// `(healthy, weight)` for an endpoint. Never blocks.
    pub fn endpoint_status(&self, namespace: &str, service: &str, url: &Url) -> (bool, f32) {
        self.snapshots.endpoint_status(namespace, service, url)
    }

    /// The latest published snapshot, if any.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshots.load()
    }

    /// Run the collector and the worker until `shutdown` fires.
    ///
    /// A detector runs once; later calls return immediately.
    pub async fn run(&self, shutdown: ShutdownSignal) {
        let ingress = self
            .ingress_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(ingress) = ingress else {
            tracing::warn!("Failure detector already started, ignoring run");
            return;
        };

        tracing::info!(
            ingress_capacity = self.config.ingress.capacity,
            live_ttl_secs = self.config.store.live_ttl_secs,
            "Failure detector starting"
        );

        let owner = Processor::new(
            self.config.live_ttl(),
            self.config.snapshot_ttl(),
            self.evaluator.clone(),
            self.snapshots.clone(),
        );

        let collector = tokio::spawn(processor::collect(
            ingress,
            self.queue.clone(),
            self.key_fn.clone(),
            shutdown.clone(),
        ));
        let worker = tokio::spawn(processor::work(owner, self.queue.clone(), shutdown));

        if let Err(e) = collector.await {
            tracing::error!(error = %e, "Collector task failed");
        }
        if let Err(e) = worker.await {
            tracing::error!(error = %e, "Worker task failed");
        }

        self.queue.shut_down();
        tracing::info!("Failure detector stopped");
    }
}
