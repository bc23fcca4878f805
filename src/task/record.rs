//! Checkpoint wire format for tasks
//!
//! A task is persisted as a nested mapping carrying its full ancestor chain:
//! `{ "url", "anchor_text", "depth", "parent": <record>|null }`. The
//! conversions walk the chain iteratively in both directions, so a very deep
//! crawl cannot exhaust the stack on our side; the bounded recursion limit in
//! `serde_json` covers the decode of the nested document itself.

use super::{Link, Task};
use serde::{Deserialize, Serialize};

/// Serialized form of a [`Task`] and its ancestor chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// The task's absolute URL
    pub url: String,

    /// Anchor text that discovered the URL
    #[serde(default)]
    pub anchor_text: String,

    /// Stored depth; absent in older documents, recomputed from the chain
    #[serde(default)]
    pub depth: Option<u32>,

    /// The recursively serialized parent task, or null for the seed
    #[serde(default)]
    pub parent: Option<Box<TaskRecord>>,
}

impl Task {
    /// Serializes this task and its full ancestor chain to a record
    pub fn to_record(&self) -> TaskRecord {
        // Collect ancestors oldest-last, then fold from the root down.
        let mut ancestors: Vec<&Task> = Vec::new();
        let mut current = self.parent();
        while let Some(task) = current {
            ancestors.push(task);
            current = task.parent();
        }

        let mut parent_record: Option<Box<TaskRecord>> = None;
        for task in ancestors.into_iter().rev() {
            parent_record = Some(Box::new(record_node(task, parent_record)));
        }

        record_node(self, parent_record)
    }
}

fn record_node(task: &Task, parent: Option<Box<TaskRecord>>) -> TaskRecord {
    TaskRecord {
        url: task.url().to_string(),
        anchor_text: task.anchor_text().to_string(),
        depth: Some(task.depth()),
        parent,
    }
}

impl TaskRecord {
    /// Reconstructs the task and its ancestor chain from this record
    ///
    /// A record without an explicitly stored depth falls back to
    /// `parent depth + 1` (0 for the root), preserving the depth law.
    pub fn into_task(mut self) -> Task {
        // Flatten the chain self-first, detaching parents as we go.
        let mut chain: Vec<TaskRecord> = Vec::new();
        loop {
            let parent = self.parent.take();
            chain.push(self);
            match parent {
                Some(record) => self = *record,
                None => break,
            }
        }

        // chain is self-first, so popping yields the root first
        let mut task = match chain.pop() {
            Some(root) => Task::from_parts(
                Link::new(root.url, root.anchor_text),
                None,
                root.depth.unwrap_or(0),
            ),
            // A record always contributes at least itself to the chain
            None => unreachable!("task record chain is never empty"),
        };

        while let Some(record) = chain.pop() {
            let depth = record.depth.unwrap_or(task.depth() + 1);
            task = Task::from_parts(
                Link::new(record.url, record.anchor_text),
                Some(Box::new(task)),
                depth,
            );
        }

        task
    }
}
