//! Decoding and preset-driven encoding.

use crate::error::TransformError;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::{DynamicImage, ImageFormat};
use pictor_core::{FormatPreset, ImageFormatKind};
use std::io::Cursor;

fn image_format(format: ImageFormatKind) -> ImageFormat {
    match format {
        ImageFormatKind::Jpeg => ImageFormat::Jpeg,
        ImageFormatKind::Png => ImageFormat::Png,
        ImageFormatKind::Tiff => ImageFormat::Tiff,
        ImageFormatKind::Exr => ImageFormat::OpenExr,
    }
}

pub fn decode(source: &[u8], format: ImageFormatKind) -> Result<DynamicImage, TransformError> {
    image::load_from_memory_with_format(source, image_format(format))
        .map_err(|e| TransformError::Decode(e.to_string()))
}

fn png_compression(level: u8) -> CompressionType {
    match level {
        0..=3 => CompressionType::Fast,
        4..=7 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

/// Encode `img` in `format` using the preset's quality settings.
pub fn encode(
    img: &DynamicImage,
    format: ImageFormatKind,
    preset: &FormatPreset,
) -> Result<Bytes, TransformError> {
    let mut buffer = Vec::new();
    let encoded = match format {
        ImageFormatKind::Jpeg => {
            // JPEG has no alpha channel.
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            let encoder = JpegEncoder::new_with_quality(&mut buffer, preset.jpeg_quality());
            rgb.write_with_encoder(encoder)
        }
        ImageFormatKind::Png => {
            let encoder = PngEncoder::new_with_quality(
                &mut buffer,
                png_compression(preset.png_compression_level()),
                PngFilterType::Adaptive,
            );
            match img {
                DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
                    DynamicImage::ImageRgba16(img.to_rgba16()).write_with_encoder(encoder)
                }
                _ => img.write_with_encoder(encoder),
            }
        }
        ImageFormatKind::Tiff => img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Tiff),
        ImageFormatKind::Exr => DynamicImage::ImageRgba32F(img.to_rgba32f())
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::OpenExr),
    };

    encoded.map_err(|e| TransformError::Encode(e.to_string()))?;
    Ok(Bytes::from(buffer))
}
