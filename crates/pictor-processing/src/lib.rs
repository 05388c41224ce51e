//! Pictor Processing Library
//!
//! The upload pipeline: classify an asset, plan its variants, stage the
//! incoming bytes, transform size variants, store everything and clean up.
//! Deletion re-plans the same variants and removes their keys.
//!
//! Hosts talk to [`MediaProvider`]; the other modules are public so the
//! individual stages can be reused and tested on their own.

pub mod classify;
pub mod error;
pub mod factory;
#[cfg(feature = "image")]
pub mod image;
#[cfg(feature = "magick")]
pub mod magick;
pub mod plan;
pub mod provider;
pub mod scratch;
pub mod sequencer;
pub mod staging;
pub mod traits;
pub mod upload;

// Re-export commonly used types
pub use classify::{classify, validate_descriptor};
pub use error::{PipelineError, PipelineResult, TransformError};
pub use factory::create_transformer;
#[cfg(feature = "image")]
pub use crate::image::ImageTransformer;
#[cfg(feature = "magick")]
pub use magick::MagickTransformer;
pub use plan::{effective_sizes, plan_variants, planned_keys};
pub use provider::{MediaProvider, UploadOptions};
pub use scratch::{ScratchDir, ScratchSet};
pub use sequencer::{MaterializedVariant, TransformSequencer};
pub use staging::{stage_bytes, stage_source, Payload, StageTarget};
pub use traits::VariantTransformer;
pub use upload::{DeleteReport, KeyDeletion, KeyOutcome, StoredVariant, UploadReport};
