//! Transformer abstraction.

use crate::error::TransformError;
use async_trait::async_trait;
use bytes::Bytes;
use pictor_core::{FormatPreset, ImageFormatKind, ResizeOptions};

/// Produces one resized variant from the staged original.
///
/// Output is encoded in the same format as the source.
#[async_trait]
pub trait VariantTransformer: Send + Sync {
    async fn transform(
        &self,
        source: Bytes,
        format: ImageFormatKind,
        resize: &ResizeOptions,
        preset: &FormatPreset,
    ) -> Result<Bytes, TransformError>;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}
