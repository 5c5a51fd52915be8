//! # CRD validation tests
//!
//! Validate that sample resources deserialize against the Rust types and
//! that the generated CRDs carry the expected wire schema, to catch schema
//! drift early.

use kube::core::CustomResourceExt;

use external_data_controller::crd::{DataSource, ProviderConfig, ProviderConfigUsage};

#[test]
fn configmap_data_source_deserializes() {
    let yaml = r#"
apiVersion: external-data.microscaler.io/v1alpha1
kind: DataSource
metadata:
  name: service-config
spec:
  forProvider:
    type: configmap
    configMapName: cfg1
  providerConfigRef:
    name: staging
"#;

    let ds: DataSource = serde_yaml::from_str(yaml).expect("Should deserialize configmap source");
    assert_eq!(ds.spec.for_provider.source_type, "configmap");
    assert_eq!(ds.spec.for_provider.config_map_name.as_deref(), Some("cfg1"));
    assert_eq!(ds.provider_config_name(), "staging");
    assert!(ds.status.is_none());
}

#[test]
fn url_data_source_deserializes() {
    let yaml = r#"
apiVersion: external-data.microscaler.io/v1alpha1
kind: DataSource
metadata:
  name: feature-flags
spec:
  forProvider:
    type: url
    url: https://example.com/flags.json
"#;

    let ds: DataSource = serde_yaml::from_str(yaml).expect("Should deserialize url source");
    assert_eq!(ds.spec.for_provider.source_type, "url");
    assert_eq!(
        ds.spec.for_provider.url.as_deref(),
        Some("https://example.com/flags.json")
    );
    assert!(ds.spec.for_provider.config_map_name.is_none());
    assert_eq!(ds.provider_config_name(), "default");
}

#[test]
fn status_round_trips_arbitrary_json() {
    let yaml = r#"
apiVersion: external-data.microscaler.io/v1alpha1
kind: DataSource
metadata:
  name: service-config
spec:
  forProvider:
    type: configmap
    configMapName: cfg1
status:
  atProvider:
    x: "1"
    nested:
      flag: true
  conditions:
    - type: Synced
      status: "True"
      reason: UpToDate
"#;

    let ds: DataSource = serde_yaml::from_str(yaml).expect("Should deserialize populated status");
    assert_eq!(
        ds.at_provider(),
        Some(&serde_json::json!({"x": "1", "nested": {"flag": true}}))
    );
    let status = ds.status.as_ref().unwrap();
    assert_eq!(status.conditions.len(), 1);
    assert_eq!(status.conditions[0].r#type, "Synced");
}

#[test]
fn generated_crds_carry_expected_names_and_scope() {
    let crd = DataSource::crd();
    assert_eq!(crd.spec.group, "external-data.microscaler.io");
    assert_eq!(crd.spec.names.kind, "DataSource");
    assert_eq!(crd.spec.scope, "Cluster");
    let version = &crd.spec.versions[0];
    assert_eq!(version.name, "v1alpha1");
    assert!(version.subresources.as_ref().is_some_and(|s| s.status.is_some()));

    assert_eq!(ProviderConfig::crd().spec.names.kind, "ProviderConfig");
    assert_eq!(ProviderConfigUsage::crd().spec.names.kind, "ProviderConfigUsage");
}

#[test]
fn provider_config_deserializes() {
    let yaml = r#"
apiVersion: external-data.microscaler.io/v1alpha1
kind: ProviderConfig
metadata:
  name: default
spec:
  namespace: shared-data
"#;

    let pc: ProviderConfig = serde_yaml::from_str(yaml).expect("Should deserialize ProviderConfig");
    assert_eq!(pc.spec.namespace, "shared-data");
}
