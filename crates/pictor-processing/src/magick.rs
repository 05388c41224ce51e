//! Transformer that shells out to ImageMagick.

use crate::error::TransformError;
use crate::traits::VariantTransformer;
use async_trait::async_trait;
use bytes::Bytes;
use pictor_core::{Fit, FormatPreset, ImageFormatKind, ResizeOptions};
use std::process::Stdio;
use tokio::process::Command;

/// Runs `magick convert <in> <resize args> <preset args> <out>`.
#[derive(Debug, Clone)]
pub struct MagickTransformer {
    magick_path: String,
}

impl MagickTransformer {
    pub fn new(magick_path: impl Into<String>) -> Self {
        Self {
            magick_path: magick_path.into(),
        }
    }

    /// Geometry arguments for a size entry.
    ///
    /// Raw `options` take precedence over width/height/fit.
    pub fn resize_args(resize: &ResizeOptions) -> Vec<String> {
        if let Some(raw) = resize.raw_args() {
            return raw;
        }

        let geometry = match (resize.width, resize.height) {
            (Some(w), Some(h)) => format!("{}x{}", w, h),
            (Some(w), None) => format!("{}x", w),
            (None, Some(h)) => format!("x{}", h),
            (None, None) => return Vec::new(),
        };

        let mut flags = String::new();
        match resize.fit {
            Fit::Fill => flags.push('!'),
            Fit::Cover | Fit::Outside => flags.push('^'),
            Fit::Inside | Fit::Contain => {}
        }
        if resize.without_enlargement {
            flags.push('>');
        }

        let mut args = vec!["-resize".to_string(), format!("{}{}", geometry, flags)];

        // Extent needs a full box.
        if let (Some(w), Some(h)) = (resize.width, resize.height) {
            match resize.fit {
                Fit::Cover => args.extend([
                    "-gravity".to_string(),
                    "center".to_string(),
                    "-extent".to_string(),
                    format!("{}x{}", w, h),
                ]),
                Fit::Contain => args.extend([
                    "-background".to_string(),
                    "white".to_string(),
                    "-gravity".to_string(),
                    "center".to_string(),
                    "-extent".to_string(),
                    format!("{}x{}", w, h),
                ]),
                _ => {}
            }
        }

        args
    }

    /// Encoding arguments for the output format.
    pub fn preset_args(format: ImageFormatKind, preset: &FormatPreset) -> Vec<String> {
        let mut args = match format {
            ImageFormatKind::Jpeg => {
                vec!["-quality".to_string(), preset.jpeg_quality().to_string()]
            }
            ImageFormatKind::Png => vec![
                "-define".to_string(),
                format!("png:compression-level={}", preset.png_compression_level()),
            ],
            ImageFormatKind::Tiff | ImageFormatKind::Exr => Vec::new(),
        };
        args.extend(preset.raw_args());
        args
    }
}

#[async_trait]
impl VariantTransformer for MagickTransformer {
    #[tracing::instrument(skip(self, source, preset), fields(source_bytes = source.len()))]
    async fn transform(
        &self,
        source: Bytes,
        format: ImageFormatKind,
        resize: &ResizeOptions,
        preset: &FormatPreset,
    ) -> Result<Bytes, TransformError> {
        let workdir = tempfile::tempdir()?;
        let input = workdir.path().join(format!("source.{}", format.extension()));
        let output = workdir.path().join(format!("variant.{}", format.extension()));

        tokio::fs::write(&input, &source).await?;

        let mut args = vec![
            "convert".to_string(),
            input.to_string_lossy().into_owned(),
        ];
        args.extend(Self::resize_args(resize));
        args.extend(Self::preset_args(format, preset));
        args.push(output.to_string_lossy().into_owned());

        let start = std::time::Instant::now();
        let result = Command::new(&self.magick_path)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                TransformError::Unavailable(format!("failed to run {}: {}", self.magick_path, e))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            tracing::error!(
                status = %result.status,
                stderr = %stderr,
                "ImageMagick conversion failed"
            );
            return Err(TransformError::Command {
                status: result.status.to_string(),
                stderr,
            });
        }

        let bytes = tokio::fs::read(&output).await?;

        tracing::debug!(
            output_bytes = bytes.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "ImageMagick conversion finished"
        );

        Ok(Bytes::from(bytes))
    }

    fn name(&self) -> &'static str {
        "magick"
    }
}
