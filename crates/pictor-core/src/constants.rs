//! Shared constants

/// Key segment holding the unmodified original of an image.
pub const ORIGINAL_SEGMENT: &str = "original";

/// Key segment holding non-image assets (documents, icons, ...).
pub const FILE_SEGMENT: &str = "file";

/// First `_`-separated hash segment that marks a host-generated thumbnail.
pub const THUMBNAIL_PREFIX: &str = "thumbnail";

/// Extensions (lowercase, leading dot) that are treated as transformable images.
pub const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".tif", ".tiff", ".exr"];

/// Extensions treated as icons. Icons are stored like plain files.
pub const ICON_EXTENSIONS: &[&str] = &[".svg"];

/// Custom metadata field carrying the custom key prefix.
pub const METADATA_UPLOAD_PATH: &str = "upload_path";

/// Custom metadata field carrying the comma-separated requested size names.
pub const METADATA_IMAGE_SIZES: &str = "imageSizes";

pub const DEFAULT_SCRATCH_DIR: &str = "./public/uploads/temp";
pub const DEFAULT_MAGICK_PATH: &str = "magick";
pub const DEFAULT_MAX_CONCURRENT_TRANSFORMS: usize = 4;
