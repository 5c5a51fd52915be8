//! # Constants
//!
//! Shared constants used throughout the controller.

/// Default HTTP server port for metrics and health probes
pub const DEFAULT_METRICS_PORT: u16 = 5000;

/// Request timeout for the url source fetcher.
/// Independent of (and tighter than) any caller-level deadline.
pub const HTTP_FETCH_TIMEOUT_SECS: u64 = 1;

/// Number of automatic retries the url source fetcher performs on
/// transport-level failure. HTTP-level failures are never retried.
pub const HTTP_FETCH_RETRIES: u32 = 1;

/// Requeue interval after a successful reconciliation (seconds).
/// The sources offer no change notification, so drift is only picked up
/// by periodic re-fetch.
pub const DEFAULT_RECONCILE_INTERVAL_SECS: u64 = 60;

/// Fibonacci backoff bounds for reconciliation errors (seconds)
pub const BACKOFF_MIN_SECS: u64 = 30;
pub const BACKOFF_MAX_SECS: u64 = 600;

/// Finalizer placed on DataSource resources so Delete runs before the
/// object is garbage-collected
pub const FINALIZER: &str = "external-data.microscaler.io/finalizer";

/// ProviderConfig used when a DataSource carries no providerConfigRef
pub const DEFAULT_PROVIDER_CONFIG: &str = "default";

/// Field manager used for server-side apply patches
pub const FIELD_MANAGER: &str = "external-data-controller";
