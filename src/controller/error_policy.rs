//! # Error policy
//!
//! Backoff scheduling for failed reconciliations. Retry timing lives here,
//! at the controller layer; the reconciler itself never retries beyond the
//! url fetcher's single built-in transport retry.

use kube_runtime::controller::Action;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::controller::reconcile::{BackoffState, Context, ReconcilerError};
use crate::crd::DataSource;
use crate::observability::metrics;

/// Handle reconciliation errors with per-resource Fibonacci backoff.
///
/// Backoff state is tracked per resource so one persistently failing
/// DataSource does not slow down the others.
pub fn error_policy(ds: Arc<DataSource>, error: &ReconcilerError, ctx: Arc<Context>) -> Action {
    let name = ds.metadata.name.as_deref().unwrap_or("unknown");
    error!("Reconciliation error for {}: {}", name, error);

    let (backoff, error_count) = match ctx.backoff_states.lock() {
        Ok(mut states) => {
            let state = states.entry(name.to_string()).or_insert_with(BackoffState::new);
            state.error_count += 1;
            (state.backoff.next_backoff(), state.error_count)
        }
        Err(e) => {
            warn!("Failed to lock backoff states: {}, using default backoff", e);
            (std::time::Duration::from_secs(60), 0)
        }
    };

    info!(
        "Retrying {} with Fibonacci backoff: {}s (error count: {})",
        name,
        backoff.as_secs(),
        error_count
    );
    metrics::increment_requeues("error-backoff");
    Action::requeue(backoff)
}
