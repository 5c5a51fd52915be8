//! # Source router
//!
//! One fetcher per source kind, a single dispatch point in front of them.
//! All kind-specific parameter validation happens here; the fetchers assume
//! valid input. Adding a source kind means one router arm and one fetcher.

use serde_json::Value;
use std::sync::Arc;

use crate::crd::DataSourceParameters;

pub mod configmap;
pub mod error;
pub mod http;

pub use configmap::{mapping_to_value, ConfigMapStore, KeyValueStore};
pub use error::FetchError;

/// Execution context a reconciliation session is bound to.
///
/// Produced once per session by Connect and read-only afterwards, so it is
/// safe to share across unrelated resources.
#[derive(Clone)]
pub struct SourceContext {
    store: Arc<dyn KeyValueStore>,
    http: reqwest::Client,
    namespace: String,
}

impl std::fmt::Debug for SourceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceContext")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl SourceContext {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, http: reqwest::Client, namespace: String) -> Self {
        Self { store, http, namespace }
    }

    /// Validate the source parameters and dispatch to the matching fetcher.
    ///
    /// # Errors
    ///
    /// `InvalidParameters` when validation fails (before any call is
    /// attempted), otherwise whatever the fetcher reports.
    pub async fn lookup(&self, params: &DataSourceParameters) -> Result<Value, FetchError> {
        match params.source_type.as_str() {
            "configmap" => {
                let name = params
                    .config_map_name
                    .as_deref()
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| {
                        FetchError::InvalidParameters(
                            "configMapName must be specified when type is configmap".to_string(),
                        )
                    })?;
                let mapping = self.store.get_mapping(&self.namespace, name).await?;
                Ok(mapping_to_value(&mapping))
            }
            "url" => {
                let uri = params.url.as_deref().filter(|u| !u.is_empty()).ok_or_else(|| {
                    FetchError::InvalidParameters(
                        "uri must be specified when type is uri".to_string(),
                    )
                })?;
                http::fetch_json(&self.http, uri).await
            }
            other => Err(FetchError::InvalidParameters(format!(
                "unknown datasource type {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store double that records how often it was consulted
    #[derive(Default)]
    struct CountingStore {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl KeyValueStore for CountingStore {
        async fn get_mapping(
            &self,
            _namespace: &str,
            _name: &str,
        ) -> Result<BTreeMap<String, String>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(BTreeMap::new())
        }
    }

    fn context(store: Arc<CountingStore>) -> SourceContext {
        SourceContext::new(store, reqwest::Client::new(), "test-ns".to_string())
    }

    fn params(source_type: &str, config_map_name: Option<&str>, url: Option<&str>) -> DataSourceParameters {
        DataSourceParameters {
            source_type: source_type.to_string(),
            config_map_name: config_map_name.map(str::to_string),
            url: url.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn configmap_without_name_fails_before_any_lookup() {
        let store = Arc::new(CountingStore::default());
        let err = context(Arc::clone(&store))
            .lookup(&params("configmap", None, None))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            FetchError::InvalidParameters(
                "configMapName must be specified when type is configmap".to_string()
            )
        );
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn configmap_with_empty_name_is_invalid() {
        let store = Arc::new(CountingStore::default());
        let err = context(Arc::clone(&store))
            .lookup(&params("configmap", Some(""), None))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidParameters(_)));
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn url_without_uri_fails_before_any_request() {
        let store = Arc::new(CountingStore::default());
        let err = context(store)
            .lookup(&params("url", None, None))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            FetchError::InvalidParameters("uri must be specified when type is uri".to_string())
        );
    }

    #[tokio::test]
    async fn unknown_source_type_names_the_offender() {
        let store = Arc::new(CountingStore::default());
        let err = context(Arc::clone(&store))
            .lookup(&params("ftp", None, None))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            FetchError::InvalidParameters("unknown datasource type ftp".to_string())
        );
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn configmap_lookup_delegates_to_the_bound_store() {
        let store = Arc::new(CountingStore::default());
        let value = context(Arc::clone(&store))
            .lookup(&params("configmap", Some("cfg1"), None))
            .await
            .unwrap();
        assert_eq!(value, serde_json::json!({}));
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }
}
