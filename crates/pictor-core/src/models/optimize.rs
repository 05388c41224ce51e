//! Per-format encoding presets.

use super::variant::ImageFormatKind;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Quality presets for image compression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    #[default]
    Normal, // Default quality, balanced size and quality
    Better,   // Higher quality
    Best,     // Near pristine quality
    Lighter,  // Smaller files
    Lightest, // Maximum compression
}

impl QualityPreset {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(QualityPreset::Normal),
            "better" => Ok(QualityPreset::Better),
            "best" => Ok(QualityPreset::Best),
            "lighter" => Ok(QualityPreset::Lighter),
            "lightest" => Ok(QualityPreset::Lightest),
            _ => Err(anyhow!("Invalid quality preset: {}", s)),
        }
    }

    /// Get quality value for JPEG (0-100)
    pub fn jpeg_quality(self) -> u8 {
        match self {
            QualityPreset::Normal => 75,
            QualityPreset::Better => 85,
            QualityPreset::Best => 95,
            QualityPreset::Lighter => 65,
            QualityPreset::Lightest => 50,
        }
    }

    /// Get zlib compression level for PNG (1-9, lossless)
    pub fn png_compression_level(self) -> u8 {
        match self {
            QualityPreset::Lighter => 8,
            QualityPreset::Lightest => 9,
            _ => 6,
        }
    }
}

/// Encoding settings for one output format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatPreset {
    #[serde(default)]
    pub preset: QualityPreset,
    /// Explicit quality (1-100), overrides the preset for lossy formats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<u8>,
    /// Extra raw arguments for the external converter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
}

impl FormatPreset {
    pub fn jpeg_quality(&self) -> u8 {
        self.quality
            .unwrap_or_else(|| self.preset.jpeg_quality())
            .clamp(1, 100)
    }

    pub fn png_compression_level(&self) -> u8 {
        self.preset.png_compression_level()
    }

    pub fn raw_args(&self) -> Vec<String> {
        self.options
            .as_deref()
            .map(|s| s.split_whitespace().map(String::from).collect())
            .unwrap_or_default()
    }
}

/// Presets keyed by output format. EXR always uses defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizeOptions {
    #[serde(default)]
    pub jpeg: FormatPreset,
    #[serde(default)]
    pub png: FormatPreset,
    #[serde(default)]
    pub tiff: FormatPreset,
}

impl OptimizeOptions {
    pub fn for_format(&self, format: ImageFormatKind) -> FormatPreset {
        match format {
            ImageFormatKind::Jpeg => self.jpeg.clone(),
            ImageFormatKind::Png => self.png.clone(),
            ImageFormatKind::Tiff => self.tiff.clone(),
            ImageFormatKind::Exr => FormatPreset::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_parse() {
        assert_eq!(QualityPreset::parse("BEST").unwrap(), QualityPreset::Best);
        assert!(QualityPreset::parse("ultra").is_err());
    }

    #[test]
    fn explicit_quality_wins() {
        let preset = FormatPreset {
            preset: QualityPreset::Lightest,
            quality: Some(120),
            options: None,
        };
        assert_eq!(preset.jpeg_quality(), 100);

        let preset = FormatPreset {
            preset: QualityPreset::Better,
            ..Default::default()
        };
        assert_eq!(preset.jpeg_quality(), 85);
    }

    #[test]
    fn optimize_options_from_json() {
        let options: OptimizeOptions = serde_json::from_str(
            r#"{"jpeg": {"preset": "lighter"}, "png": {"options": "-strip"}}"#,
        )
        .unwrap();
        assert_eq!(options.for_format(ImageFormatKind::Jpeg).jpeg_quality(), 65);
        assert_eq!(
            options.for_format(ImageFormatKind::Png).raw_args(),
            vec!["-strip".to_string()]
        );
        assert_eq!(
            options.for_format(ImageFormatKind::Exr),
            FormatPreset::default()
        );
    }
}
