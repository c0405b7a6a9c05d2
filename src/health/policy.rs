//! Scoring policy.
//!
//! # Algorithm
//! ```text
//! net = errors - successes over the window
//! |net| != WINDOW_SIZE          → unchanged (needs a full same-signed run)
//! prev  = 100 - round(weight * 100)
//! total = prev + net
//! total outside [0, 100]        → unchanged (score is already at a bound)
//! total != prev                 → weight = (100 - total) / 100, window cleared
//! status = TooManyErrors iff weight <= 0
//! ```
//!
//! # Design Decisions
//! - A mixed window never re-scores; only a run of one outcome moves the weight
//! - Each trigger moves the weight by exactly 0.10
//! - Out-of-range updates are dropped silently, they are not faults

use crate::health::state::{WeightedEndpointStatus, WINDOW_SIZE};

/// Cumulative error count that maps to weight 0.
const MAX_ERRORS: i32 = 100;

/// Decides a new score for an endpoint that just received samples.
pub trait Evaluator: Send + Sync {
    /// Returns true when the endpoint's weight or status changed.
    fn evaluate(&self, status: &mut WeightedEndpointStatus) -> bool;
}

/// Folds a full window of same-signed outcomes into the weight.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsecutiveRunEvaluator;

impl ConsecutiveRunEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for ConsecutiveRunEvaluator {
    fn evaluate(&self, status: &mut WeightedEndpointStatus) -> bool {
        let net = status.window().net_errors();
        if net.unsigned_abs() as usize != WINDOW_SIZE {
            return false;
        }

        let prev = MAX_ERRORS - (status.weight() * MAX_ERRORS as f32).round() as i32;
        let total = prev + net;
        if !(0..=MAX_ERRORS).contains(&total) {
            tracing::trace!(
                endpoint = %status.url(),
                prev,
                net,
                "Score already at bound, update dropped"
            );
            return false;
        }

        let mut changed = false;
        if total != prev {
            status.set_weight((MAX_ERRORS - total) as f32 / MAX_ERRORS as f32);
            changed = true;
        }

        if status.refresh_status() {
            tracing::info!(
                endpoint = %status.url(),
                weight = status.weight(),
                status = %status.status(),
                "Endpoint health transitioned"
            );
            changed = true;
        }

        changed
    }
}
