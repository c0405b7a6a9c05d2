//! Per-endpoint rolling health state.
//!
//! # States
//! - Healthy: `status` empty, `weight` in (0, 1]
//! - Unhealthy: `status` = [`TOO_MANY_ERRORS`], `weight` = 0
//!
//! # Design Decisions
//! - Unbounded history is compressed into `weight`; the fixed window only
//!   collects enough recent outcomes to decide when to re-score
//! - Mutated only by the processing worker, never shared while mutable

use crate::health::sample::Sample;

/// Number of samples held per endpoint before a re-score can trigger.
pub const WINDOW_SIZE: usize = 10;

/// Status reason reported once the weight reaches zero.
pub const TOO_MANY_ERRORS: &str = "TooManyErrors";

/// Fixed-capacity circular buffer of recent outcomes.
#[derive(Debug, Clone, Default)]
pub struct SampleWindow {
    slots: [Option<Sample>; WINDOW_SIZE],
    position: usize,
}

impl SampleWindow {
    /// Overwrite the oldest slot.
    pub fn push(&mut self, sample: Sample) {
        self.slots[self.position] = Some(sample);
        self.position = (self.position + 1) % WINDOW_SIZE;
    }

    /// Errors minus successes over the filled slots.
    pub fn net_errors(&self) -> i32 {
        self.slots.iter().flatten().fold(0, |acc, s| {
            if s.is_err() {
                acc + 1
            } else {
                acc - 1
            }
        })
    }

    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the next write.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn capacity(&self) -> usize {
        WINDOW_SIZE
    }

    pub fn clear(&mut self) {
        self.slots = [None; WINDOW_SIZE];
        self.position = 0;
    }
}

/// Rolling state of one endpoint.
#[derive(Debug, Clone)]
pub struct WeightedEndpointStatus {
    window: SampleWindow,
    url: String,
    weight: f32,
    status: String,
}

impl WeightedEndpointStatus {
    /// Fresh, fully healthy endpoint.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            window: SampleWindow::default(),
            url: url.into(),
            weight: 1.0,
            status: String::new(),
        }
    }

    /// Read-only copy carrying only identity, weight and status.
    pub fn without_history(&self) -> Self {
        Self {
            window: SampleWindow::default(),
            url: self.url.clone(),
            weight: self.weight,
            status: self.status.clone(),
        }
    }

    pub fn add(&mut self, sample: Sample) {
        self.window.push(sample);
    }

    pub fn window(&self) -> &SampleWindow {
        &self.window
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn is_healthy(&self) -> bool {
        self.status.is_empty()
    }

    /// Fold the window into a new weight. The window is spent afterwards.
    pub(crate) fn set_weight(&mut self, weight: f32) {
        self.weight = weight.clamp(0.0, 1.0);
        self.window.clear();
    }

    /// Re-derive `status` from `weight`; returns whether it transitioned.
    pub(crate) fn refresh_status(&mut self) -> bool {
        let next = if self.weight <= 0.0 { TOO_MANY_ERRORS } else { "" };
        if self.status == next {
            return false;
        }
        self.status = next.to_string();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_endpoint_is_healthy() {
        let status = WeightedEndpointStatus::new("10.0.0.1:80");
        assert_eq!(status.weight(), 1.0);
        assert_eq!(status.status(), "");
        assert!(status.is_healthy());
        assert!(status.window().is_empty());
    }

    #[test]
    fn test_window_wraps() {
        let mut window = SampleWindow::default();
        for _ in 0..WINDOW_SIZE {
            window.push(Sample::Failure);
        }
        assert_eq!(window.len(), WINDOW_SIZE);
        assert_eq!(window.position(), 0);
        assert_eq!(window.net_errors(), 10);

        // Oldest failures get replaced.
        for _ in 0..3 {
            window.push(Sample::Success);
        }
        assert_eq!(window.len(), WINDOW_SIZE);
        assert_eq!(window.position(), 3);
        assert_eq!(window.net_errors(), 7 - 3);
    }

    #[test]
    fn test_net_errors_partial_window() {
        let mut window = SampleWindow::default();
        window.push(Sample::Failure);
        window.push(Sample::Failure);
        window.push(Sample::Success);
        assert_eq!(window.net_errors(), 1);
        assert_eq!(window.capacity(), WINDOW_SIZE);
    }

    #[test]
    fn test_set_weight_spends_window() {
        let mut status = WeightedEndpointStatus::new("a:1");
        status.add(Sample::Failure);
        status.add(Sample::Failure);
        status.set_weight(0.5);

        assert_eq!(status.weight(), 0.5);
        assert!(status.window().is_empty());
        assert_eq!(status.window().position(), 0);
    }

    #[test]
    fn test_refresh_status_tracks_weight() {
        let mut status = WeightedEndpointStatus::new("a:1");
        assert!(!status.refresh_status());

        status.set_weight(0.0);
        assert!(status.refresh_status());
        assert_eq!(status.status(), TOO_MANY_ERRORS);
        assert!(!status.refresh_status());

        status.set_weight(0.1);
        assert!(status.refresh_status());
        assert!(status.is_healthy());
    }

    #[test]
    fn test_without_history() {
        let mut status = WeightedEndpointStatus::new("a:1");
        status.set_weight(0.7);
        status.add(Sample::Failure);

        let copy = status.without_history();
        assert_eq!(copy.url(), "a:1");
        assert_eq!(copy.weight(), 0.7);
        assert!(copy.window().is_empty());
    }
}
