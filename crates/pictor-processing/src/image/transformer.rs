//! In-process transformer backed by the `image` crate.

use super::encode::{decode, encode};
use super::resize::ImageResize;
use crate::error::TransformError;
use crate::traits::VariantTransformer;
use async_trait::async_trait;
use bytes::Bytes;
use image::GenericImageView;
use pictor_core::{FormatPreset, ImageFormatKind, ResizeOptions};

/// Decodes, resizes and re-encodes in the source format.
///
/// Raw converter `options` on a size entry are ignored here; only width,
/// height, fit and `without_enlargement` apply.
#[derive(Debug, Clone, Default)]
pub struct ImageTransformer;

impl ImageTransformer {
    pub fn new() -> Self {
        Self
    }

    fn transform_sync(
        source: &[u8],
        format: ImageFormatKind,
        resize: &ResizeOptions,
        preset: &FormatPreset,
    ) -> Result<Bytes, TransformError> {
        let img = decode(source, format)?;
        let (orig_width, orig_height) = img.dimensions();
        let resized = ImageResize::apply(&img, resize);
        let (width, height) = resized.dimensions();

        tracing::debug!(
            orig_width,
            orig_height,
            width,
            height,
            "Resized image"
        );

        encode(&resized, format, preset)
    }
}

#[async_trait]
impl VariantTransformer for ImageTransformer {
    #[tracing::instrument(skip(self, source, preset), fields(source_bytes = source.len()))]
    async fn transform(
        &self,
        source: Bytes,
        format: ImageFormatKind,
        resize: &ResizeOptions,
        preset: &FormatPreset,
    ) -> Result<Bytes, TransformError> {
        if !resize.has_geometry() && resize.options.is_some() {
            tracing::debug!("Size has converter options only, re-encoding at source dimensions");
        }

        let resize = resize.clone();
        let preset = preset.clone();

        // CPU-bound work off the async runtime
        tokio::task::spawn_blocking(move || Self::transform_sync(&source, format, &resize, &preset))
            .await
            .map_err(|e| TransformError::Task(e.to_string()))?
    }

    fn name(&self) -> &'static str {
        "library"
    }
}
