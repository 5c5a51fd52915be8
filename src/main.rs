//! # External Data Controller
//!
//! A Kubernetes controller that mirrors external data sources into
//! `DataSource` resource status.
//!
//! ## Overview
//!
//! 1. **Watching DataSource resources** - cluster-wide, level-triggered
//! 2. **Fetching source content** - ConfigMaps in the ProviderConfig-bound
//!    namespace, or HTTP endpoints returning JSON
//! 3. **Drift detection** - structural comparison of decoded JSON, so key
//!    order and whitespace never register as drift
//! 4. **Status publication** - the fetched value lands in
//!    `status.atProvider`, with a Synced condition tracking fetch health
//!
//! Sources offer no change notification, so convergence relies on periodic
//! requeue plus Fibonacci backoff after errors.

use anyhow::{Context as _, Result};
use futures::StreamExt;
use kube::{Api, Client};
use kube_runtime::{watcher, Controller};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use external_data_controller::constants::DEFAULT_METRICS_PORT;
use external_data_controller::controller::{error_policy, reconcile, Connector, Context};
use external_data_controller::crd::DataSource;
use external_data_controller::observability::metrics;
use external_data_controller::server::{start_server, ServerState};

#[tokio::main]
async fn main() -> Result<()> {
    // Required for rustls 0.23+ when no default provider is set via features
    rustls::crypto::ring::default_provider()
        .install_default()
        .unwrap_or_else(|_| panic!("Failed to install rustls crypto provider"));

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!(
        "Starting external-data-controller (built {})",
        env!("BUILD_DATETIME")
    );

    metrics::register().context("Failed to register metrics")?;

    let server_state = Arc::new(ServerState {
        is_ready: Arc::new(AtomicBool::new(false)),
    });
    let port = std::env::var("METRICS_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_METRICS_PORT);
    let server_handle = tokio::spawn(start_server(port, Arc::clone(&server_state)));

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;
    let connector = Connector::new(client.clone()).context("Failed to construct connector")?;
    let ctx = Arc::new(Context::new(client.clone(), connector));

    let data_sources: Api<DataSource> = Api::all(client);
    server_state.is_ready.store(true, Ordering::Relaxed);
    info!("Starting controller watch loop...");

    Controller::new(data_sources, watcher::Config::default().any_semantic())
        .shutdown_on_signal()
        .run(reconcile, error_policy, ctx)
        .for_each(|result| async move {
            match result {
                Ok((object, _action)) => info!("Reconciled {}", object.name),
                Err(e) => warn!("Controller stream error: {:?}", e),
            }
        })
        .await;

    server_state.is_ready.store(false, Ordering::Relaxed);
    info!("Watch loop ended, shutting down");
    server_handle.abort();
    if let Err(e) = server_handle.await {
        if !e.is_cancelled() {
            error!("Server task failed: {}", e);
        }
    }
    Ok(())
}
