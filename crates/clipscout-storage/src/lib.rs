//! S3-compatible object storage for rendered clips.
//!
//! This crate provides:
//! - Upload of rendered clips and thumbnails
//! - Presigned GET URL generation
//! - Existence checks and deletion
//! - Key layout helpers scoped by (user, content, analysis, clip)

pub mod client;
pub mod error;
pub mod operations;

pub use client::{ObjectStore, StorageConfig};
pub use error::{StorageError, StorageResult};
pub use operations::{clip_key, content_type_for, thumbnail_key};
