//! Shared utilities for integration tests.

use std::sync::Arc;
use std::time::Duration;

use failure_detector::{DetectorConfig, EndpointSample, FailureDetector, Shutdown};
use tokio::task::JoinHandle;
use url::Url;

pub const NS: &str = "ns";
pub const SVC: &str = "svc";

/// A running detector plus the handles needed to stop it.
pub struct Harness {
    pub detector: Arc<FailureDetector>,
    pub shutdown: Shutdown,
    handle: JoinHandle<()>,
}

impl Harness {
    pub fn start(config: DetectorConfig) -> Self {
        let detector = Arc::new(FailureDetector::new(config));
        let shutdown = Shutdown::new();

        let d = detector.clone();
        let signal = shutdown.subscribe();
        let handle = tokio::spawn(async move { d.run(signal).await });

        Self {
            detector,
            shutdown,
            handle,
        }
    }

    pub async fn stop(self) {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("detector did not stop")
            .expect("detector task panicked");
    }

    pub async fn send_errors(&self, host: &str, n: usize) {
        let tx = self.detector.collector();
        for _ in 0..n {
            tx.send(EndpointSample::failure(NS, SVC, url(host), "503 Service Unavailable"))
                .await
                .expect("ingress closed");
        }
    }

    pub async fn send_successes(&self, host: &str, n: usize) {
        let tx = self.detector.collector();
        for _ in 0..n {
            tx.send(EndpointSample::success(NS, SVC, url(host)))
                .await
                .expect("ingress closed");
        }
    }

    pub fn status(&self, host: &str) -> (bool, f32) {
        self.detector.endpoint_status(NS, SVC, &url(host))
    }

    /// Poll until the endpoint reports `weight`, panicking after 2s.
    pub async fn wait_for_weight(&self, host: &str, weight: f32) -> (bool, f32) {
        for _ in 0..200 {
            let verdict = self.status(host);
            if (verdict.1 - weight).abs() < 1e-6 {
                return verdict;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "{} never reached weight {}, last verdict {:?}",
            host,
            weight,
            self.status(host)
        );
    }

    /// Move `host` one 0.1 step per block of ten samples, waiting for each
    /// step to be published before sending the next block.
    pub async fn step_weight(&self, host: &str, from: u32, to: u32) {
        let mut tenths = from;
        while tenths != to {
            if tenths > to {
                self.send_errors(host, 10).await;
                tenths -= 1;
            } else {
                self.send_successes(host, 10).await;
                tenths += 1;
            }
            self.wait_for_weight(host, tenths as f32 / 10.0).await;
        }
    }
}

pub fn url(host: &str) -> Url {
    Url::parse(&format!("http://{}", host)).expect("valid test url")
}
