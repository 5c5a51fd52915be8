//! # Status handling
//!
//! Synced condition construction and persistence of DataSource status
//! through the status subresource.

use kube::api::{Patch, PatchParams};
use kube::{Api, Client};
use serde_json::{json, Value};
use tracing::debug;

use crate::constants::FINALIZER;
use crate::crd::{Condition, DataSource, DataSourceStatus};

pub const CONDITION_SYNCED: &str = "Synced";

/// Build a Synced condition
#[must_use]
pub fn synced_condition(synced: bool, reason: &str, message: Option<String>) -> Condition {
    Condition {
        r#type: CONDITION_SYNCED.to_string(),
        status: if synced { "True" } else { "False" }.to_string(),
        last_transition_time: Some(chrono::Utc::now().to_rfc3339()),
        reason: Some(reason.to_string()),
        message,
    }
}

/// Replace the condition of the same type, keeping the previous transition
/// time when the condition status did not change
pub fn set_condition(status: &mut DataSourceStatus, mut condition: Condition) {
    if let Some(existing) = status
        .conditions
        .iter_mut()
        .find(|c| c.r#type == condition.r#type)
    {
        if existing.status == condition.status {
            condition.last_transition_time = existing.last_transition_time.clone();
        }
        *existing = condition;
    } else {
        status.conditions.push(condition);
    }
}

/// Persist a DataSource status through the status subresource.
///
/// An absent `atProvider` is written as an explicit null so a cleared value
/// actually clears the persisted field under merge-patch semantics.
///
/// # Errors
///
/// Propagates apiserver errors.
pub async fn patch_status(
    client: &Client,
    name: &str,
    status: &DataSourceStatus,
) -> anyhow::Result<()> {
    let mut status_value = serde_json::to_value(status)?;
    if status.at_provider.is_none() {
        status_value["atProvider"] = Value::Null;
    }

    let api: Api<DataSource> = Api::all(client.clone());
    api.patch_status(
        name,
        &PatchParams::default(),
        &Patch::Merge(json!({ "status": status_value })),
    )
    .await?;
    debug!("patched status of {}", name);
    Ok(())
}

/// Add the controller finalizer if it is not present yet
///
/// # Errors
///
/// Propagates apiserver errors.
pub async fn ensure_finalizer(client: &Client, ds: &DataSource) -> anyhow::Result<()> {
    let finalizers = ds.metadata.finalizers.clone().unwrap_or_default();
    if finalizers.iter().any(|f| f == FINALIZER) {
        return Ok(());
    }
    let name = ds.metadata.name.as_deref().unwrap_or("unknown");
    let mut updated = finalizers;
    updated.push(FINALIZER.to_string());

    let api: Api<DataSource> = Api::all(client.clone());
    api.patch(
        name,
        &PatchParams::default(),
        &Patch::Merge(json!({ "metadata": { "finalizers": updated } })),
    )
    .await?;
    Ok(())
}

/// Drop the controller finalizer so the apiserver can finish the delete
///
/// # Errors
///
/// Propagates apiserver errors.
pub async fn remove_finalizer(client: &Client, ds: &DataSource) -> anyhow::Result<()> {
    let Some(finalizers) = ds.metadata.finalizers.clone() else {
        return Ok(());
    };
    if !finalizers.iter().any(|f| f == FINALIZER) {
        return Ok(());
    }
    let name = ds.metadata.name.as_deref().unwrap_or("unknown");
    let remaining: Vec<String> = finalizers.into_iter().filter(|f| f != FINALIZER).collect();

    let api: Api<DataSource> = Api::all(client.clone());
    api.patch(
        name,
        &PatchParams::default(),
        &Patch::Merge(json!({ "metadata": { "finalizers": remaining } })),
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_condition_is_appended() {
        let mut status = DataSourceStatus::default();
        set_condition(&mut status, synced_condition(true, "UpToDate", None));
        assert_eq!(status.conditions.len(), 1);
        assert_eq!(status.conditions[0].status, "True");
    }

    #[test]
    fn unchanged_status_keeps_transition_time() {
        let mut status = DataSourceStatus::default();
        let mut first = synced_condition(true, "UpToDate", None);
        first.last_transition_time = Some("2026-01-01T00:00:00+00:00".to_string());
        set_condition(&mut status, first);

        set_condition(
            &mut status,
            synced_condition(true, "UpToDate", Some("still good".to_string())),
        );
        assert_eq!(status.conditions.len(), 1);
        assert_eq!(
            status.conditions[0].last_transition_time.as_deref(),
            Some("2026-01-01T00:00:00+00:00")
        );
        assert_eq!(status.conditions[0].message.as_deref(), Some("still good"));
    }

    #[test]
    fn flipped_status_gets_a_fresh_transition_time() {
        let mut status = DataSourceStatus::default();
        let mut first = synced_condition(true, "UpToDate", None);
        first.last_transition_time = Some("2026-01-01T00:00:00+00:00".to_string());
        set_condition(&mut status, first);

        set_condition(
            &mut status,
            synced_condition(false, "FetchFailed", Some("source unreachable".to_string())),
        );
        assert_eq!(status.conditions.len(), 1);
        assert_eq!(status.conditions[0].status, "False");
        assert_ne!(
            status.conditions[0].last_transition_time.as_deref(),
            Some("2026-01-01T00:00:00+00:00")
        );
    }
}
