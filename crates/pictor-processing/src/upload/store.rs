use crate::error::PipelineResult;
use crate::scratch::ScratchSet;
use crate::sequencer::MaterializedVariant;
use futures::future::try_join_all;
use pictor_core::VariantKind;
use pictor_storage::Storage;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredVariant {
    #[serde(flatten)]
    pub kind: VariantKind,
    pub key: String,
    pub url: String,
}

/// Result of a successful upload, in plan order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UploadReport {
    pub variants: Vec<StoredVariant>,
}

impl UploadReport {
    /// URL of the untransformed variant.
    pub fn primary_url(&self) -> Option<&str> {
        self.variants
            .iter()
            .find(|v| v.kind.size_name().is_none())
            .map(|v| v.url.as_str())
    }

    pub fn keys(&self) -> Vec<&str> {
        self.variants.iter().map(|v| v.key.as_str()).collect()
    }
}

/// Put every variant concurrently.
///
/// A scratch file is released as soon as its object is stored. The first
/// failed put cancels the puts still in flight and is returned.
pub async fn store_variants(
    storage: &Arc<dyn Storage>,
    variants: Vec<MaterializedVariant>,
    scratch: &ScratchSet,
) -> PipelineResult<UploadReport> {
    let start = std::time::Instant::now();
    let count = variants.len();

    let puts = variants.into_iter().map(|materialized| async move {
        let MaterializedVariant { variant, payload } = materialized;
        let url = storage
            .put(&variant.storage_key, payload.body(), &variant.mime)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    key = %variant.storage_key,
                    "Failed to store variant"
                );
                e
            })?;

        if let Some(path) = payload.scratch_path() {
            scratch.discard(path).await;
        }

        Ok::<_, crate::error::PipelineError>(StoredVariant {
            kind: variant.kind,
            key: variant.storage_key,
            url,
        })
    });

    let stored = try_join_all(puts).await?;

    tracing::info!(
        variants = count,
        backend = %storage.backend_type(),
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Stored asset variants"
    );

    Ok(UploadReport { variants: stored })
}
