//! # External Data Controller Library
//!
//! Core functionality for the external data controller: the DataSource and
//! ProviderConfig CRDs, the source fetchers and router, and the four-phase
//! external-state reconciler that keeps `status.atProvider` converged with
//! the external source.

pub mod constants;
pub mod controller;
pub mod crd;
pub mod observability;
pub mod server;
pub mod source;

pub use controller::{error_policy, reconcile, Connector, Context, External, ExternalError, Observation};
pub use crd::{DataSource, DataSourceParameters, DataSourceSpec, DataSourceStatus, ProviderConfig};
pub use source::{FetchError, KeyValueStore, SourceContext};
