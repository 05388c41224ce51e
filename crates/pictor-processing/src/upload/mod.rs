//! Storing materialized variants and removing planned keys.

pub mod delete;
pub mod store;

pub use delete::{delete_keys, DeleteReport, KeyDeletion, KeyOutcome};
pub use store::{store_variants, StoredVariant, UploadReport};
