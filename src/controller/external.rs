//! # External client
//!
//! The four-phase contract over one DataSource: Observe decides whether the
//! recorded value still matches the source, Create and Update refresh it,
//! Delete clears it. The control loop picks the phase; this module only
//! performs it.
//!
//! Observe is read-only with respect to persisted state. Only Create and
//! Update commit a fetched value, and only on success, so a transient fetch
//! failure can never erase a previously good observation.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::crd::{DataSource, DataSourceStatus};
use crate::source::{FetchError, SourceContext};

/// Session-level errors, each wrapping the underlying failure with the
/// phase it occurred in
#[derive(Debug, Error)]
pub enum ExternalError {
    #[error("cannot get ProviderConfig: {0}")]
    ConfigNotFound(#[source] kube::Error),

    #[error("cannot track ProviderConfig usage: {0}")]
    UsageTracking(#[source] kube::Error),

    #[error("cannot observe data source: {0}")]
    Observe(#[source] FetchError),

    #[error("cannot create data source value: {0}")]
    Create(#[source] FetchError),

    #[error("cannot update data source value: {0}")]
    Update(#[source] FetchError),
}

/// Result of Observe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    /// Whether a value has ever been recorded for this resource.
    /// This source type has no independent existence check, so "exists"
    /// deliberately means "status has been populated", not "the external
    /// entity is currently present".
    pub exists: bool,
    /// Whether the recorded value deep-equals the freshly fetched one
    pub up_to_date: bool,
}

/// External client bound to one reconciliation session's source context
#[derive(Debug, Clone)]
pub struct External {
    source: SourceContext,
}

impl External {
    #[must_use]
    pub fn new(source: SourceContext) -> Self {
        Self { source }
    }

    /// Compare the recorded value against the source.
    ///
    /// A deletion-requested resource short-circuits to `exists: false`
    /// before any fetch, so the control loop proceeds to Delete instead of
    /// Create.
    ///
    /// # Errors
    ///
    /// Fetch failures are wrapped with the Observe phase; the recorded
    /// value is left untouched.
    pub async fn observe(&self, ds: &DataSource) -> Result<Observation, ExternalError> {
        if ds.deletion_requested() {
            return Ok(Observation { exists: false, up_to_date: false });
        }

        let fetched = self
            .source
            .lookup(&ds.spec.for_provider)
            .await
            .map_err(ExternalError::Observe)?;

        let recorded = ds.at_provider();
        let observation = Observation {
            exists: recorded.is_some(),
            // Structural comparison of decoded JSON: key order and
            // whitespace never register as drift.
            up_to_date: recorded == Some(&fetched),
        };
        debug!(
            "observed {}: exists={}, up_to_date={}",
            ds.metadata.name.as_deref().unwrap_or("unknown"),
            observation.exists,
            observation.up_to_date
        );
        Ok(observation)
    }

    /// Record the source's current value for the first time
    ///
    /// # Errors
    ///
    /// Fetch failures are wrapped with the Create phase; status is left
    /// untouched.
    pub async fn create(&self, ds: &mut DataSource) -> Result<(), ExternalError> {
        self.refresh(ds).await.map_err(ExternalError::Create)
    }

    /// Overwrite the recorded value with the source's current value.
    ///
    /// Identical to Create by design: both are "refresh the cached value".
    /// The distinction exists only because the calling convention picks one
    /// based on Observe's `exists` flag.
    ///
    /// # Errors
    ///
    /// Fetch failures are wrapped with the Update phase; the prior value
    /// survives (stale-but-valid beats erasing good data on a transient
    /// failure).
    pub async fn update(&self, ds: &mut DataSource) -> Result<(), ExternalError> {
        self.refresh(ds).await.map_err(ExternalError::Update)
    }

    /// Clear the recorded value. Always succeeds: the external resource is
    /// purely observational, so there is nothing remote to remove.
    pub async fn delete(&self, ds: &mut DataSource) {
        if let Some(status) = ds.status.as_mut() {
            status.at_provider = None;
        }
    }

    /// Shared lookup-and-commit path behind Create and Update
    async fn refresh(&self, ds: &mut DataSource) -> Result<(), FetchError> {
        let fetched: Value = self.source.lookup(&ds.spec.for_provider).await?;
        ds.status
            .get_or_insert_with(DataSourceStatus::default)
            .at_provider = Some(fetched);
        Ok(())
    }
}
