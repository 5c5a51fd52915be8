//! # ConfigMap source fetcher
//!
//! Looks up a key/value mapping by name in the namespace the session is
//! bound to, and renders it as a JSON object. The lookup is read-only; the
//! fetcher never mutates or caches the source.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::{Api, Client};
use serde_json::Value;
use std::collections::BTreeMap;

use super::error::FetchError;

/// Key/value store lookup collaborator.
///
/// The router only needs `get(namespace, name) -> mapping | NotFound`;
/// keeping it behind a trait lets tests substitute an in-memory store for
/// the cluster-backed one.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the mapping entry, or fail with `SourceUnreachable` when the
    /// entry does not exist or the store cannot be reached
    async fn get_mapping(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<BTreeMap<String, String>, FetchError>;
}

/// Cluster-backed store reading ConfigMaps through the Kubernetes API
#[derive(Clone)]
pub struct ConfigMapStore {
    client: Client,
}

impl ConfigMapStore {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl std::fmt::Debug for ConfigMapStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigMapStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl KeyValueStore for ConfigMapStore {
    async fn get_mapping(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<BTreeMap<String, String>, FetchError> {
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), namespace);
        let cm = api
            .get(name)
            .await
            .map_err(|e| FetchError::SourceUnreachable(format!("configmap {namespace}/{name}: {e}")))?;
        Ok(cm.data.unwrap_or_default())
    }
}

/// Wrap a mapping's own key/value pairs into a JSON object
#[must_use]
pub fn mapping_to_value(data: &BTreeMap<String, String>) -> Value {
    Value::Object(
        data.iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_renders_as_json_object_of_strings() {
        let mut data = BTreeMap::new();
        data.insert("x".to_string(), "1".to_string());
        data.insert("y".to_string(), "two".to_string());

        assert_eq!(
            mapping_to_value(&data),
            serde_json::json!({"x": "1", "y": "two"})
        );
    }

    #[test]
    fn empty_mapping_renders_as_empty_object() {
        assert_eq!(mapping_to_value(&BTreeMap::new()), serde_json::json!({}));
    }
}
