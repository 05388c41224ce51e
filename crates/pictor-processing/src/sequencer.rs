//! Turns a staged original and a plan into stored-ready payloads.
//!
//! Size variants are transformed concurrently under a shared permit pool.
//! Either every planned variant comes back, or the first failure does and
//! the remaining transforms are aborted.

use crate::error::{PipelineError, PipelineResult, TransformError};
use crate::scratch::ScratchSet;
use crate::staging::{stage_bytes, Payload, StageTarget};
use crate::traits::VariantTransformer;
use bytes::Bytes;
use pictor_core::{ImageFormatKind, OptimizeOptions, StagingMode, VariantDescriptor};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

#[derive(Debug, Clone)]
pub struct MaterializedVariant {
    pub variant: VariantDescriptor,
    pub payload: Payload,
}

/// Everything a materialization run needs besides the plan.
pub struct MaterializeContext<'a> {
    pub hash: &'a str,
    pub ext: &'a str,
    pub optimize: &'a OptimizeOptions,
    pub mode: StagingMode,
    pub scratch: &'a ScratchSet,
}

pub struct TransformSequencer {
    transformer: Arc<dyn VariantTransformer>,
    permits: Arc<Semaphore>,
}

impl TransformSequencer {
    pub fn new(transformer: Arc<dyn VariantTransformer>, max_concurrent: usize) -> Self {
        Self {
            transformer,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub fn transformer(&self) -> &Arc<dyn VariantTransformer> {
        &self.transformer
    }

    /// Produce a payload for every planned variant, in plan order.
    ///
    /// The first planned variant must be the untransformed one; it reuses
    /// `original`.
    pub async fn materialize(
        &self,
        plan: Vec<VariantDescriptor>,
        original: Payload,
        ctx: MaterializeContext<'_>,
    ) -> PipelineResult<Vec<MaterializedVariant>> {
        let mut plan = plan.into_iter();
        let Some(origin) = plan.next() else {
            return Ok(Vec::new());
        };
        let sizes: Vec<VariantDescriptor> = plan.collect();

        let mut materialized = Vec::with_capacity(sizes.len() + 1);
        materialized.push(MaterializedVariant {
            variant: origin,
            payload: original.clone(),
        });

        if sizes.is_empty() {
            return Ok(materialized);
        }

        let format = ImageFormatKind::from_extension(ctx.ext).ok_or_else(|| {
            PipelineError::Transform {
                size: sizes[0].kind.segment().to_string(),
                source: TransformError::UnsupportedFormat(ctx.ext.to_string()),
            }
        })?;
        let preset = ctx.optimize.for_format(format);

        let source = original
            .load()
            .await
            .map_err(|source| match original.scratch_path() {
                Some(path) => PipelineError::Staging {
                    path: path.to_path_buf(),
                    source,
                },
                None => PipelineError::SourceRead(source),
            })?;

        let outputs = self.run_transforms(&sizes, source, format, &preset).await?;

        for (variant, bytes) in sizes.into_iter().zip(outputs) {
            let target = StageTarget {
                hash: ctx.hash,
                role: variant.scratch_role(),
                ext: ctx.ext,
            };
            let payload = stage_bytes(bytes, target, ctx.mode, ctx.scratch).await?;
            materialized.push(MaterializedVariant { variant, payload });
        }

        Ok(materialized)
    }

    async fn run_transforms(
        &self,
        sizes: &[VariantDescriptor],
        source: Bytes,
        format: ImageFormatKind,
        preset: &pictor_core::FormatPreset,
    ) -> PipelineResult<Vec<Bytes>> {
        let start = std::time::Instant::now();
        let mut tasks = JoinSet::new();

        for (index, variant) in sizes.iter().enumerate() {
            let transformer = Arc::clone(&self.transformer);
            let permits = Arc::clone(&self.permits);
            let source = source.clone();
            let preset = preset.clone();
            let size = variant.kind.segment().to_string();
            let resize = variant.resize.clone().unwrap_or_default();

            tasks.spawn(async move {
                let result = match permits.acquire_owned().await {
                    Ok(_permit) => transformer.transform(source, format, &resize, &preset).await,
                    Err(e) => Err(TransformError::Task(e.to_string())),
                };
                (index, size, result)
            });
        }

        let mut outputs: Vec<Option<Bytes>> = vec![None; sizes.len()];

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, _, Ok(bytes))) => outputs[index] = Some(bytes),
                Ok((_, size, Err(source))) => {
                    tracing::error!(
                        size = %size,
                        error = %source,
                        transformer = self.transformer.name(),
                        "Variant transform failed"
                    );
                    tasks.abort_all();
                    return Err(PipelineError::Transform { size, source });
                }
                Err(e) => {
                    tasks.abort_all();
                    return Err(PipelineError::TaskJoin(e.to_string()));
                }
            }
        }

        tracing::info!(
            variants = sizes.len(),
            transformer = self.transformer.name(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Generated size variants"
        );

        outputs
            .into_iter()
            .map(|bytes| {
                bytes.ok_or_else(|| PipelineError::TaskJoin("transform result missing".to_string()))
            })
            .collect()
    }
}
