use futures::future::join_all;
use pictor_storage::Storage;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "lowercase")]
pub enum KeyOutcome {
    Removed,
    /// The backend reported the object as already absent.
    Missing,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyDeletion {
    pub key: String,
    #[serde(flatten)]
    pub outcome: KeyOutcome,
}

/// Per-key outcome of a delete, in plan order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeleteReport {
    pub entries: Vec<KeyDeletion>,
}

impl DeleteReport {
    /// True when no key failed. Missing keys count as deleted.
    pub fn is_complete(&self) -> bool {
        self.failed().next().is_none()
    }

    pub fn failed(&self) -> impl Iterator<Item = &KeyDeletion> {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.outcome, KeyOutcome::Failed(_)))
    }

    pub fn removed(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.outcome == KeyOutcome::Removed)
            .count()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.key.as_str()).collect()
    }
}

/// Delete every key concurrently. Never fails; failures are recorded.
pub async fn delete_keys(storage: &Arc<dyn Storage>, keys: &[String]) -> DeleteReport {
    let start = std::time::Instant::now();

    let entries = join_all(keys.iter().map(|key| async move {
        let outcome = match storage.delete(key).await {
            Ok(true) => KeyOutcome::Removed,
            Ok(false) => KeyOutcome::Missing,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Failed to delete variant");
                KeyOutcome::Failed(e.to_string())
            }
        };
        KeyDeletion {
            key: key.clone(),
            outcome,
        }
    }))
    .await;

    let report = DeleteReport { entries };
    tracing::info!(
        keys = keys.len(),
        removed = report.removed(),
        failed = report.failed().count(),
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Deleted asset variants"
    );
    report
}
