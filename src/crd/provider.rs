//! # ProviderConfig CRDs
//!
//! `ProviderConfig` carries the connection profile a DataSource session is
//! bound to. `ProviderConfigUsage` records which DataSource uses which
//! ProviderConfig, so operators can see what a config change affects before
//! making it.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Connection profile for DataSource sessions
#[derive(CustomResource, Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[kube(
    kind = "ProviderConfig",
    group = "external-data.microscaler.io",
    version = "v1alpha1",
    printcolumn = r#"{"name":"Namespace", "type":"string", "jsonPath":".spec.namespace"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfigSpec {
    /// Namespace ConfigMap lookups are bound to
    pub namespace: String,
}

/// Usage record tying a DataSource to a ProviderConfig
#[derive(CustomResource, Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[kube(
    kind = "ProviderConfigUsage",
    group = "external-data.microscaler.io",
    version = "v1alpha1"
)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfigUsageSpec {
    /// Name of the ProviderConfig in use
    pub provider_config_name: String,
    /// Name of the DataSource using it
    pub data_source_name: String,
}
