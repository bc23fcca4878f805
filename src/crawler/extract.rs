//! Pluggable content extraction
//!
//! The engine never knows what a page means; it hands every successfully
//! fetched page to a [`ContentExtractor`] supplied at construction. There is
//! no default implementation; extraction is per-site application logic.

use super::Page;
use crate::task::Task;
use serde_json::Value;

/// Site-specific logic turning a fetched page into an output record
///
/// `Ok(Some(record))` is appended to the output sink as one JSON line;
/// `Ok(None)` means the page yields no output (logged, not written). An
/// `Err` is a processing error: it aborts the run, rolls the current task
/// back onto the front of the queue, and triggers a checkpoint.
pub trait ContentExtractor {
    /// Extracts a record from a fetched page
    fn extract(&self, page: &Page, task: &Task) -> anyhow::Result<Option<Value>>;
}

impl<F> ContentExtractor for F
where
    F: Fn(&Page, &Task) -> anyhow::Result<Option<Value>>,
{
    fn extract(&self, page: &Page, task: &Task) -> anyhow::Result<Option<Value>> {
        self(page, task)
    }
}
