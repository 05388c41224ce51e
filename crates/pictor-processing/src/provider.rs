//! Host-facing entry point.
//!
//! A [`MediaProvider`] owns everything a request needs: the storage handle,
//! the transformer, the configuration and the scratch root. Requests share
//! only these read-only parts and keep all per-request state on the stack.

use crate::classify::validate_descriptor;
use crate::error::{PipelineError, PipelineResult};
use crate::factory::create_transformer;
use crate::plan::{plan_variants, planned_keys};
use crate::scratch::{ScratchDir, ScratchSet};
use crate::sequencer::{MaterializeContext, TransformSequencer};
use crate::staging::{stage_source, StageTarget};
use crate::traits::VariantTransformer;
use crate::upload::{delete_keys, store_variants, DeleteReport, UploadReport};
use pictor_core::{AssetDescriptor, AssetSource, Config, ConfigError, Customization, VariantDescriptor};
use pictor_storage::{create_storage, Storage};
use std::sync::Arc;
use std::time::Duration;

/// Per-request options.
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Overrides the configured request timeout.
    pub deadline: Option<Duration>,
}

impl UploadOptions {
    pub fn with_deadline(deadline: Duration) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }
}

pub struct MediaProvider {
    storage: Arc<dyn Storage>,
    config: Config,
    scratch: ScratchDir,
    sequencer: TransformSequencer,
}

impl MediaProvider {
    /// Build a provider around an existing storage handle and transformer.
    ///
    /// Storage settings in `config` are not consulted.
    pub async fn new(
        storage: Arc<dyn Storage>,
        transformer: Arc<dyn VariantTransformer>,
        config: Config,
    ) -> PipelineResult<Self> {
        config.validate_pipeline()?;

        let scratch = ScratchDir::ensure(config.scratch_dir())
            .await
            .map_err(|e| ConfigError::Scratch {
                path: config.scratch_dir().display().to_string(),
                reason: e.to_string(),
            })?;

        let sequencer = TransformSequencer::new(transformer, config.max_concurrent_transforms());

        tracing::info!(
            environment = %config.environment(),
            is_production = config.is_production(),
            backend = %storage.backend_type(),
            transformer = sequencer.transformer().name(),
            staging_mode = %config.staging_mode(),
            sizes = config.image_sizes().len(),
            scratch_dir = %scratch.root().display(),
            "Media provider initialized"
        );

        Ok(Self {
            storage,
            config,
            scratch,
            sequencer,
        })
    }

    /// Build storage and transformer from configuration.
    pub async fn from_config(config: Config) -> PipelineResult<Self> {
        config.validate()?;
        let storage = create_storage(&config).await?;
        let transformer = create_transformer(&config)?;
        Self::new(storage, transformer, config).await
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Store an asset and all of its planned variants.
    ///
    /// On success `descriptor.url` points at the untransformed variant,
    /// `descriptor.formats` maps each size to its URL, and the parsed
    /// customization is written to `descriptor.provider_metadata` so that a
    /// later [`delete`](Self::delete) resolves the same keys. On failure the
    /// descriptor's outputs are left untouched and any stored keys are
    /// rolled back.
    #[tracing::instrument(skip(self, descriptor, options), fields(hash = %descriptor.hash, ext = %descriptor.ext))]
    pub async fn upload(
        &self,
        descriptor: &mut AssetDescriptor,
        options: UploadOptions,
    ) -> PipelineResult<UploadReport> {
        let start = std::time::Instant::now();
        let classification = validate_descriptor(descriptor, true)?;
        let customization = Customization::from_raw(descriptor.path.as_deref());
        let plan = plan_variants(
            descriptor,
            classification,
            self.config.image_sizes(),
            &customization,
            self.config.size_selection(),
        );
        let keys = planned_keys(&plan);

        let source = descriptor
            .source
            .take()
            .ok_or_else(|| PipelineError::Classification("asset has no content".to_string()))?;

        let scratch = ScratchSet::new(self.scratch.clone());
        let work = self.process(plan, source, &descriptor.hash, &descriptor.ext, &scratch);

        let outcome = match options.deadline.or(self.config.request_timeout()) {
            Some(limit) => tokio::time::timeout(limit, work)
                .await
                .unwrap_or_else(|_| Err(PipelineError::DeadlineExceeded(limit))),
            None => work.await,
        };

        scratch.cleanup().await;

        match outcome {
            Ok(report) => {
                descriptor.url = report.primary_url().map(String::from);
                descriptor.formats = report
                    .variants
                    .iter()
                    .filter_map(|v| v.kind.size_name().map(|size| (size.to_string(), v.url.clone())))
                    .collect();
                if let Some(metadata) = customization.to_metadata() {
                    descriptor.provider_metadata = Some(metadata);
                }

                tracing::info!(
                    variants = report.variants.len(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Asset uploaded"
                );
                Ok(report)
            }
            Err(e) => {
                if matches!(
                    e,
                    PipelineError::Store(_) | PipelineError::DeadlineExceeded(_)
                ) {
                    self.rollback(&keys).await;
                }
                tracing::error!(error = %e, "Asset upload failed");
                Err(e)
            }
        }
    }

    /// Same as [`upload`](Self::upload); the source is expected to be a stream.
    pub async fn upload_stream(
        &self,
        descriptor: &mut AssetDescriptor,
        options: UploadOptions,
    ) -> PipelineResult<UploadReport> {
        if matches!(descriptor.source, Some(AssetSource::Buffer(_))) {
            tracing::debug!(hash = %descriptor.hash, "upload_stream called with a buffered source");
        }
        self.upload(descriptor, options).await
    }

    /// Remove every key the asset was stored under.
    ///
    /// Only an unusable descriptor is an error. Store failures are recorded
    /// per key in the report.
    #[tracing::instrument(skip(self, descriptor), fields(hash = %descriptor.hash, ext = %descriptor.ext))]
    pub async fn delete(&self, descriptor: &AssetDescriptor) -> PipelineResult<DeleteReport> {
        let keys = self.plan_keys(descriptor)?;
        let report = delete_keys(&self.storage, &keys).await;
        if !report.is_complete() {
            tracing::warn!(
                failed = report.failed().count(),
                "Some variants could not be deleted"
            );
        }
        Ok(report)
    }

    /// Variants the asset maps to, in store order.
    ///
    /// Customization comes from `provider_metadata` when present, else from
    /// the raw upload metadata in `path`.
    pub fn plan(&self, descriptor: &AssetDescriptor) -> PipelineResult<Vec<VariantDescriptor>> {
        let classification = validate_descriptor(descriptor, false)?;
        let customization = match descriptor.provider_metadata {
            Some(ref metadata) => Customization::from_value(Some(metadata)),
            None => Customization::from_raw(descriptor.path.as_deref()),
        };
        Ok(plan_variants(
            descriptor,
            classification,
            self.config.image_sizes(),
            &customization,
            self.config.size_selection(),
        ))
    }

    pub fn plan_keys(&self, descriptor: &AssetDescriptor) -> PipelineResult<Vec<String>> {
        Ok(planned_keys(&self.plan(descriptor)?))
    }

    /// received, staged, transformed, uploaded
    async fn process(
        &self,
        plan: Vec<VariantDescriptor>,
        source: AssetSource,
        hash: &str,
        ext: &str,
        scratch: &ScratchSet,
    ) -> PipelineResult<UploadReport> {
        let Some(origin) = plan.first() else {
            return Ok(UploadReport::default());
        };
        let mode = self.config.staging_mode();

        let target = StageTarget {
            hash,
            role: origin.scratch_role(),
            ext,
        };
        let original = stage_source(source, target, mode, scratch).await?;

        let materialized = self
            .sequencer
            .materialize(
                plan,
                original,
                MaterializeContext {
                    hash,
                    ext,
                    optimize: self.config.optimize(),
                    mode,
                    scratch,
                },
            )
            .await?;

        store_variants(&self.storage, materialized, scratch).await
    }

    async fn rollback(&self, keys: &[String]) {
        let report = delete_keys(&self.storage, keys).await;
        if report.is_complete() {
            tracing::info!(keys = keys.len(), "Rolled back partially stored asset");
        } else {
            tracing::warn!(
                failed = report.failed().count(),
                "Rollback left objects behind"
            );
        }
    }
}
