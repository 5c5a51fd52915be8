//! # Reconciliation logic
//!
//! Control loop body for DataSource resources. One pass is: bind a session
//! (Connect), Observe, then at most one converging action (Create, Update or
//! Delete), then persist status and requeue.
//!
//! All retry and back-off policy lives outside this function, in
//! `error_policy`; a failing pass surfaces a Synced=False condition and
//! returns the error unmodified.

use kube_runtime::controller::Action;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::constants::{BACKOFF_MAX_SECS, BACKOFF_MIN_SECS, DEFAULT_RECONCILE_INTERVAL_SECS};
use crate::controller::backoff::FibonacciBackoff;
use crate::controller::connect::Connector;
use crate::controller::external::ExternalError;
use crate::controller::status::{
    ensure_finalizer, patch_status, remove_finalizer, set_condition, synced_condition,
};
use crate::crd::{DataSource, DataSourceStatus};
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum ReconcilerError {
    #[error("reconciliation failed: {0}")]
    ReconciliationFailed(#[from] anyhow::Error),
}

/// Backoff state for a specific resource
#[derive(Debug, Clone)]
pub struct BackoffState {
    pub backoff: FibonacciBackoff,
    pub error_count: u32,
}

impl BackoffState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            backoff: FibonacciBackoff::new(BACKOFF_MIN_SECS, BACKOFF_MAX_SECS),
            error_count: 0,
        }
    }
}

impl Default for BackoffState {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared controller context handed to every reconciliation
#[derive(Clone)]
pub struct Context {
    pub client: kube::Client,
    pub connector: Connector,
    /// Per-resource backoff, consulted by `error_policy` and reset here on
    /// success
    pub backoff_states: Arc<Mutex<HashMap<String, BackoffState>>>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context").finish_non_exhaustive()
    }
}

impl Context {
    #[must_use]
    pub fn new(client: kube::Client, connector: Connector) -> Self {
        Self {
            client,
            connector,
            backoff_states: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

/// Main reconciliation function
///
/// # Errors
///
/// Returns `ReconcilerError` for `error_policy` to schedule a backoff
/// requeue; the Synced condition has already been persisted by then.
pub async fn reconcile(ds: Arc<DataSource>, ctx: Arc<Context>) -> Result<Action, ReconcilerError> {
    let start = Instant::now();
    let name = ds.metadata.name.clone().unwrap_or_else(|| "unknown".to_string());

    let span = tracing::span!(
        tracing::Level::INFO,
        "reconcile",
        resource.name = %name,
        resource.kind = "DataSource",
        resource.source_type = %ds.spec.for_provider.source_type
    );
    let _guard = span.enter();

    info!("Reconciling DataSource: {}", name);
    metrics::increment_reconciliations();

    let external = match ctx.connector.connect(&ds).await {
        Ok(external) => external,
        Err(e) => return Err(fail(&ctx, &ds, "ConnectFailed", &e).await),
    };

    // Work on a copy; only successful phases are persisted.
    let mut desired = (*ds).clone();

    let observation = match external.observe(&desired).await {
        Ok(observation) => observation,
        Err(e) => return Err(fail(&ctx, &ds, "ObserveFailed", &e).await),
    };

    if ds.deletion_requested() {
        external.delete(&mut desired).await;
        let mut status = desired.status.take().unwrap_or_default();
        set_condition(
            &mut status,
            synced_condition(true, "Deleted", Some("observed value cleared".to_string())),
        );
        if let Err(e) = patch_status(&ctx.client, &name, &status).await {
            warn!("Failed to persist cleared status for {}: {}", name, e);
        }
        remove_finalizer(&ctx.client, &ds)
            .await
            .map_err(ReconcilerError::ReconciliationFailed)?;
        info!("Deleted DataSource value for {}", name);
        return Ok(Action::await_change());
    }

    ensure_finalizer(&ctx.client, &ds)
        .await
        .map_err(ReconcilerError::ReconciliationFailed)?;

    let reason = if observation.exists && observation.up_to_date {
        debug!("DataSource {} is up to date", name);
        metrics::increment_fetch_outcome(&ds.spec.for_provider.source_type, "up-to-date");
        "UpToDate"
    } else if observation.exists {
        if let Err(e) = external.update(&mut desired).await {
            return Err(fail(&ctx, &ds, "UpdateFailed", &e).await);
        }
        metrics::increment_fetch_outcome(&ds.spec.for_provider.source_type, "updated");
        "Updated"
    } else {
        if let Err(e) = external.create(&mut desired).await {
            return Err(fail(&ctx, &ds, "CreateFailed", &e).await);
        }
        metrics::increment_fetch_outcome(&ds.spec.for_provider.source_type, "created");
        "Created"
    };

    let mut status = desired.status.take().unwrap_or_default();
    status.observed_generation = ds.metadata.generation;
    status.last_reconcile_time = Some(chrono::Utc::now().to_rfc3339());
    set_condition(&mut status, synced_condition(true, reason, None));
    patch_status(&ctx.client, &name, &status)
        .await
        .map_err(ReconcilerError::ReconciliationFailed)?;

    // Success resets this resource's backoff so the next failure starts the
    // sequence from the beginning.
    if let Ok(mut states) = ctx.backoff_states.lock() {
        if let Some(state) = states.get_mut(&name) {
            state.error_count = 0;
            state.backoff.reset();
        }
    }

    metrics::observe_reconciliation_duration(start.elapsed().as_secs_f64());
    info!(
        "Reconciliation complete for {} ({}, duration: {:.2}s)",
        name,
        reason,
        start.elapsed().as_secs_f64()
    );

    // The sources push no change notification; drift is only caught by
    // periodic re-fetch.
    Ok(Action::requeue(Duration::from_secs(
        DEFAULT_RECONCILE_INTERVAL_SECS,
    )))
}

/// Persist a Synced=False condition with the wrapped phase error and hand
/// the error back for backoff scheduling. The prior good `atProvider`
/// value, if any, is left untouched.
async fn fail(
    ctx: &Arc<Context>,
    ds: &Arc<DataSource>,
    reason: &str,
    error: &ExternalError,
) -> ReconcilerError {
    let name = ds.metadata.name.as_deref().unwrap_or("unknown");
    metrics::increment_reconciliation_errors();

    let mut status = ds.status.clone().unwrap_or_default();
    set_condition(
        &mut status,
        synced_condition(false, reason, Some(error.to_string())),
    );
    if let Err(e) = patch_status(&ctx.client, name, &status).await {
        warn!("Failed to persist failure condition for {}: {}", name, e);
    }

    ReconcilerError::ReconciliationFailed(anyhow::anyhow!("{error}"))
}
