pub mod encode;
pub mod resize;
pub mod transformer;

pub use resize::ImageResize;
pub use transformer::ImageTransformer;
