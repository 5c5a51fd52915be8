//! # Connection setup
//!
//! Resolves the connection profile a session is bound to, exactly once per
//! reconciliation, and produces an External client bound to it. Tracking and
//! resolution failures are fatal for the session and abort before Observe is
//! attempted.

use kube::api::{Patch, PatchParams};
use kube::{Api, Client, Resource};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::constants::FIELD_MANAGER;
use crate::controller::external::{External, ExternalError};
use crate::crd::{DataSource, ProviderConfig, ProviderConfigUsage, ProviderConfigUsageSpec};
use crate::source::{ConfigMapStore, SourceContext};

/// Produces an External client per reconciliation session.
///
/// The HTTP client is pooled here and shared into every session; connection
/// reuse across sessions is an optimization, not a contract.
#[derive(Clone)]
pub struct Connector {
    client: Client,
    http: reqwest::Client,
}

impl std::fmt::Debug for Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector").finish_non_exhaustive()
    }
}

impl Connector {
    /// # Errors
    ///
    /// Fails when the pooled HTTP client cannot be constructed.
    pub fn new(client: Client) -> anyhow::Result<Self> {
        // Connect-level timeout only; the per-request fetch timeout is
        // applied by the url fetcher itself.
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(1))
            .build()?;
        Ok(Self { client, http })
    }

    /// Bind a session to the resource's connection profile.
    ///
    /// # Errors
    ///
    /// `UsageTracking` when the usage record cannot be written,
    /// `ConfigNotFound` when the referenced ProviderConfig cannot be
    /// resolved.
    pub async fn connect(&self, ds: &DataSource) -> Result<External, ExternalError> {
        self.track(ds).await.map_err(ExternalError::UsageTracking)?;

        let config_name = ds.provider_config_name();
        let configs: Api<ProviderConfig> = Api::all(self.client.clone());
        let config = configs
            .get(config_name)
            .await
            .map_err(ExternalError::ConfigNotFound)?;

        debug!(
            "bound session for {} to ProviderConfig {} (namespace {})",
            ds.metadata.name.as_deref().unwrap_or("unknown"),
            config_name,
            config.spec.namespace
        );

        let store = Arc::new(ConfigMapStore::new(self.client.clone()));
        Ok(External::new(SourceContext::new(
            store,
            self.http.clone(),
            config.spec.namespace,
        )))
    }

    /// Record that this DataSource uses its ProviderConfig
    async fn track(&self, ds: &DataSource) -> Result<(), kube::Error> {
        let name = ds.metadata.name.as_deref().unwrap_or("unknown");
        let mut usage = ProviderConfigUsage::new(
            name,
            ProviderConfigUsageSpec {
                provider_config_name: ds.provider_config_name().to_string(),
                data_source_name: name.to_string(),
            },
        );
        // Owned by the DataSource so the usage record is garbage-collected
        // with it.
        if let Some(owner) = ds.controller_owner_ref(&()) {
            usage.metadata.owner_references = Some(vec![owner]);
        }

        let usages: Api<ProviderConfigUsage> = Api::all(self.client.clone());
        usages
            .patch(
                name,
                &PatchParams::apply(FIELD_MANAGER).force(),
                &Patch::Apply(&usage),
            )
            .await?;
        Ok(())
    }
}
