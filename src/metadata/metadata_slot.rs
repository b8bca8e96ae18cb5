//! A write-once slot for one handle's metadata.
//!
//! The slot starts empty and is filled by the first caller of
//! [`MetadataSlot::get_or_fetch`]. Callers arriving while that fetch is in
//! flight wait for it instead of starting their own, and once filled the slot
//! is never refilled, whatever the outcome was.
//!
//! # Cancellation
//!
//! If the task running the fetch is cancelled, the slot stays empty and the
//! next waiting caller runs its own fetch.

use std::future::Future;

use tokio::sync::OnceCell;

use super::resource_metadata::MetadataOutcome;

#[derive(Debug, Default)]
pub struct MetadataSlot {
    cell: OnceCell<MetadataOutcome>,
}

impl MetadataSlot {
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Return the memoized outcome, running `fetch` first if the slot is empty.
    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> &MetadataOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = MetadataOutcome>,
    {
        self.cell.get_or_init(fetch).await
    }

    /// The memoized outcome, without fetching.
    pub fn get(&self) -> Option<&MetadataOutcome> {
        self.cell.get()
    }
}
