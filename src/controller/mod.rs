//! # Controller
//!
//! The external-state reconciler for DataSource resources.
//!
//! ## Reconciliation flow
//!
//! 1. Connect: track ProviderConfig usage, resolve the bound namespace,
//!    construct the session's External client
//! 2. Observe: fetch the source and compare against `status.atProvider`
//! 3. Act: Create (nothing recorded yet), Update (recorded value drifted),
//!    Delete (resource being torn down), or nothing (up to date)
//! 4. Persist status and requeue

pub mod backoff;
pub mod connect;
pub mod error_policy;
pub mod external;
pub mod reconcile;
pub mod status;

pub use connect::Connector;
pub use error_policy::error_policy;
pub use external::{External, ExternalError, Observation};
pub use reconcile::{reconcile, BackoffState, Context, ReconcilerError};
