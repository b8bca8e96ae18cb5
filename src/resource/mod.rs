//! Per-path handles over a [`DirectoryRepository`](crate::directory::DirectoryRepository).

mod dav_resource;
mod existence;
mod resource_handle;

pub use dav_resource::Resource;
pub use existence::Existence;
pub use resource_handle::ResourceHandle;
