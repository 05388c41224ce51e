pub mod asset;
pub mod customization;
pub mod optimize;
pub mod size;
pub mod variant;

pub use asset::{AssetDescriptor, AssetSource};
pub use customization::Customization;
pub use optimize::{FormatPreset, OptimizeOptions, QualityPreset};
pub use size::{parse_catalog, validate_catalog, Fit, ResizeOptions, SizeSpec};
pub use variant::{
    AssetFormat, AssetType, Classification, ImageFormatKind, VariantDescriptor, VariantKind,
};
