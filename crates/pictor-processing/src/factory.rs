use crate::error::PipelineResult;
use crate::traits::VariantTransformer;
use pictor_core::{Config, TransformBackend};
use std::sync::Arc;

#[cfg(any(not(feature = "image"), not(feature = "magick")))]
use pictor_core::ConfigError;

/// Create the transformer selected by configuration
pub fn create_transformer(config: &Config) -> PipelineResult<Arc<dyn VariantTransformer>> {
    let backend = config.transform_backend();

    match backend {
        #[cfg(feature = "image")]
        TransformBackend::Library => {
            tracing::info!(backend = %backend, "Transformer ready");
            Ok(Arc::new(crate::image::ImageTransformer::new()))
        }

        #[cfg(not(feature = "image"))]
        TransformBackend::Library => Err(ConfigError::Invalid {
            var: "TRANSFORM_BACKEND",
            reason: "library transformer not available (image feature not enabled)".to_string(),
        }
        .into()),

        #[cfg(feature = "magick")]
        TransformBackend::Magick => {
            tracing::info!(
                backend = %backend,
                magick_path = %config.magick_path(),
                "Transformer ready"
            );
            Ok(Arc::new(crate::magick::MagickTransformer::new(
                config.magick_path(),
            )))
        }

        #[cfg(not(feature = "magick"))]
        TransformBackend::Magick => Err(ConfigError::Invalid {
            var: "TRANSFORM_BACKEND",
            reason: "magick transformer not available (magick feature not enabled)".to_string(),
        }
        .into()),
    }
}
