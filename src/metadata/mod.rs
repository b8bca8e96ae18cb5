//! Server-reported attributes of a resource and their per-handle memoization.

mod metadata_slot;
mod resource_metadata;

pub use metadata_slot::MetadataSlot;
pub use resource_metadata::{MetadataOutcome, ResourceMetadata};
