//! # Custom Resource Definitions
//!
//! CRD types for the external data controller.
//!
//! - `datasource.rs` - DataSource spec/status and conditions
//! - `provider.rs` - ProviderConfig connection profile and usage tracking

mod datasource;
mod provider;

pub use datasource::{
    Condition, DataSource, DataSourceParameters, DataSourceSpec, DataSourceStatus,
    ProviderConfigReference,
};
pub use provider::{ProviderConfig, ProviderConfigSpec, ProviderConfigUsage, ProviderConfigUsageSpec};
