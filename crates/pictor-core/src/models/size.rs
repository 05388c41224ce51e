//! Size catalog entries.

use crate::constants::{FILE_SEGMENT, ORIGINAL_SEGMENT};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How a resized image fits the requested box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fit {
    /// Fill the box, cropping the overflow.
    Cover,
    /// Fit inside the box, padding the rest.
    Contain,
    /// Stretch to the exact box.
    Fill,
    /// Fit inside the box, preserving aspect ratio.
    #[default]
    Inside,
    /// Cover the box, preserving aspect ratio, without cropping.
    Outside,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default)]
    pub fit: Fit,
    #[serde(default)]
    pub without_enlargement: bool,
    /// Raw argument string for the external converter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
}

impl ResizeOptions {
    pub fn new(width: Option<u32>, height: Option<u32>) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn with_fit(mut self, fit: Fit) -> Self {
        self.fit = fit;
        self
    }

    pub fn without_enlargement(mut self) -> Self {
        self.without_enlargement = true;
        self
    }

    pub fn has_geometry(&self) -> bool {
        self.width.is_some() || self.height.is_some()
    }

    pub fn raw_args(&self) -> Option<Vec<String>> {
        self.options
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.split_whitespace().map(String::from).collect())
    }
}

/// A named entry of the size catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeSpec {
    pub name: String,
    #[serde(default)]
    pub resize_options: ResizeOptions,
}

impl SizeSpec {
    pub fn new(name: impl Into<String>, resize_options: ResizeOptions) -> Self {
        Self {
            name: name.into(),
            resize_options,
        }
    }

    /// Size names become a key segment and part of a scratch file name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = self.name.as_str();
        if name.trim().is_empty() {
            return Err(ConfigError::SizeCatalog("size name is empty".to_string()));
        }
        if name.trim() != name {
            return Err(ConfigError::SizeCatalog(format!(
                "size name '{}' has surrounding whitespace",
                name
            )));
        }
        // Requested size lists are comma separated.
        if name.contains(',') {
            return Err(ConfigError::SizeCatalog(format!(
                "size name '{}' contains a comma",
                name
            )));
        }
        if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
            return Err(ConfigError::SizeCatalog(format!(
                "size name '{}' is not a single path segment",
                name
            )));
        }
        if name == ORIGINAL_SEGMENT || name == FILE_SEGMENT {
            return Err(ConfigError::SizeCatalog(format!(
                "size name '{}' is reserved",
                name
            )));
        }
        let options = &self.resize_options;
        if options.width == Some(0) || options.height == Some(0) {
            return Err(ConfigError::SizeCatalog(format!(
                "size '{}' has a zero dimension",
                name
            )));
        }
        if !options.has_geometry() && options.raw_args().is_none() {
            return Err(ConfigError::SizeCatalog(format!(
                "size '{}' needs a width, a height or converter options",
                name
            )));
        }
        Ok(())
    }
}

/// Parse a JSON array of size entries.
pub fn parse_catalog(json: &str) -> Result<Vec<SizeSpec>, ConfigError> {
    let catalog: Vec<SizeSpec> =
        serde_json::from_str(json).map_err(|e| ConfigError::SizeCatalog(e.to_string()))?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

pub fn validate_catalog(catalog: &[SizeSpec]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for size in catalog {
        size.validate()?;
        if !seen.insert(size.name.as_str()) {
            return Err(ConfigError::SizeCatalog(format!(
                "duplicate size name '{}'",
                size.name
            )));
        }
    }
    Ok(())
}
