//! Classification results and planned variants.

use super::size::ResizeOptions;
use crate::constants::{FILE_SEGMENT, ORIGINAL_SEGMENT};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Origin,
    Thumbnail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetFormat {
    Image,
    Icon,
    File,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub asset_type: AssetType,
    pub format: AssetFormat,
}

/// Image encodings the pipeline can transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormatKind {
    Jpeg,
    Png,
    Tiff,
    Exr,
}

impl ImageFormatKind {
    /// Map an extension (with or without leading dot, any case).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "tif" | "tiff" => Some(Self::Tiff),
            "exr" => Some(Self::Exr),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Tiff => "tiff",
            Self::Exr => "exr",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Tiff => "image/tiff",
            Self::Exr => "image/x-exr",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "size", rename_all = "lowercase")]
pub enum VariantKind {
    Original,
    File,
    Size(String),
}

impl VariantKind {
    /// Key segment, also used as the scratch role.
    pub fn segment(&self) -> &str {
        match self {
            VariantKind::Original => ORIGINAL_SEGMENT,
            VariantKind::File => FILE_SEGMENT,
            VariantKind::Size(name) => name,
        }
    }

    pub fn size_name(&self) -> Option<&str> {
        match self {
            VariantKind::Size(name) => Some(name),
            _ => None,
        }
    }
}

/// One object the pipeline will store (or delete) for an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantDescriptor {
    #[serde(flatten)]
    pub kind: VariantKind,
    /// `{segment}/{hash}_{segment}{ext}`, before any custom prefix.
    pub path_fragment: String,
    pub storage_key: String,
    pub mime: String,
    /// Present for size variants only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resize: Option<ResizeOptions>,
}

impl VariantDescriptor {
    /// The untransformed variant (original or file).
    pub fn is_origin(&self) -> bool {
        self.kind.size_name().is_none()
    }

    pub fn scratch_role(&self) -> &str {
        self.kind.segment()
    }
}
