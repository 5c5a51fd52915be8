//! # DataSource CRD
//!
//! The `DataSource` resource declares one external data source whose content
//! the controller mirrors into `status.atProvider`.
//!
//! # Example
//!
//! ```yaml
//! apiVersion: external-data.microscaler.io/v1alpha1
//! kind: DataSource
//! metadata:
//!   name: service-config
//! spec:
//!   forProvider:
//!     type: configmap
//!     configMapName: cfg1
//!   providerConfigRef:
//!     name: default
//! ```

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Desired state of a DataSource
#[derive(CustomResource, Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[kube(
    kind = "DataSource",
    group = "external-data.microscaler.io",
    version = "v1alpha1",
    status = "DataSourceStatus",
    printcolumn = r#"{"name":"Type", "type":"string", "jsonPath":".spec.forProvider.type"}"#,
    printcolumn = r#"{"name":"Synced", "type":"string", "jsonPath":".status.conditions[?(@.type==\"Synced\")].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceSpec {
    /// Source kind and kind-specific parameters
    pub for_provider: DataSourceParameters,
    /// Reference to the ProviderConfig that binds ConfigMap lookups to a
    /// namespace. Defaults to the "default" ProviderConfig.
    #[serde(default)]
    pub provider_config_ref: Option<ProviderConfigReference>,
}

/// Kind-specific source parameters
///
/// `type` selects the source kind; exactly one of `configMapName` or `url`
/// must be set accordingly. The field is a free-form string rather than an
/// enum so the router can report unknown kinds in the Synced condition
/// instead of the apiserver rejecting them opaquely at admission.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceParameters {
    /// Source kind: "configmap" or "url"
    #[serde(rename = "type")]
    pub source_type: String,
    /// Name of the ConfigMap to mirror, required iff type is "configmap".
    /// The namespace comes from the referenced ProviderConfig.
    #[serde(default)]
    pub config_map_name: Option<String>,
    /// Endpoint returning a JSON document, required iff type is "url"
    #[serde(default)]
    pub url: Option<String>,
}

/// Reference to a cluster-scoped ProviderConfig by name
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfigReference {
    pub name: String,
}

/// Observed state of a DataSource
#[derive(Debug, Clone, Deserialize, Serialize, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceStatus {
    /// Last value successfully fetched from the external source.
    /// Absent until the first successful lookup; cleared on deletion.
    /// Never overwritten by a failed fetch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_provider: Option<serde_json::Value>,
    /// Conditions represent the latest available observations
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Generation of the spec this status was produced from
    #[serde(default)]
    pub observed_generation: Option<i64>,
    /// Last reconciliation time (RFC3339)
    #[serde(default)]
    pub last_reconcile_time: Option<String>,
}

/// Condition represents a condition of a resource
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition (e.g. "Synced")
    pub r#type: String,
    /// Status of the condition (True, False, Unknown)
    pub status: String,
    /// Last transition time
    #[serde(default)]
    pub last_transition_time: Option<String>,
    /// Reason for the condition
    #[serde(default)]
    pub reason: Option<String>,
    /// Message describing the condition
    #[serde(default)]
    pub message: Option<String>,
}

impl DataSource {
    /// Whether the surrounding lifecycle machinery has requested teardown
    #[must_use]
    pub fn deletion_requested(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
    }

    /// The recorded observed value, if a lookup has ever succeeded
    #[must_use]
    pub fn at_provider(&self) -> Option<&serde_json::Value> {
        self.status.as_ref().and_then(|s| s.at_provider.as_ref())
    }

    /// Name of the ProviderConfig this resource is bound to
    #[must_use]
    pub fn provider_config_name(&self) -> &str {
        self.spec
            .provider_config_ref
            .as_ref()
            .map_or(crate::constants::DEFAULT_PROVIDER_CONFIG, |r| r.name.as_str())
    }
}
