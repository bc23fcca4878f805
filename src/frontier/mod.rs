//! Crawl frontier: FIFO work queue + URL dedup filter
//!
//! The frontier couples the pending-task queue with the set of URLs already
//! seen. Admission is the single choke point for growing the queue during a
//! run: a task whose URL is already in the filter is rejected, otherwise the
//! URL enters the filter and the task enters the queue. The invariant is
//! that a URL is never in the queue without also being in the filter; the
//! one sanctioned exception is [`Frontier::rollback`], which releases the
//! in-flight URL for retry on the next run and is immediately followed by a
//! checkpoint and termination.

use crate::task::Task;
use std::collections::{HashSet, VecDeque};

/// The end of the queue at which an admitted task is inserted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueEnd {
    /// Normal discovery order (appended at the back)
    Back,
    /// Next to be processed (prepended at the front)
    Front,
}

/// FIFO work queue with URL deduplication
#[derive(Debug, Default)]
pub struct Frontier {
    tasks: VecDeque<Task>,
    url_filter: HashSet<String>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a frontier from checkpointed parts
    ///
    /// Queue order is preserved exactly as stored (front = next to process).
    pub fn from_parts(tasks: Vec<Task>, url_filter: HashSet<String>) -> Self {
        Self {
            tasks: VecDeque::from(tasks),
            url_filter,
        }
    }

    /// Admits a task at the back of the queue (normal discovery)
    ///
    /// Returns false without mutating anything if the URL was already seen.
    pub fn admit_back(&mut self, task: Task) -> bool {
        self.admit(task, QueueEnd::Back)
    }

    /// Admits a task at the front of the queue
    pub fn admit_front(&mut self, task: Task) -> bool {
        self.admit(task, QueueEnd::Front)
    }

    fn admit(&mut self, task: Task, end: QueueEnd) -> bool {
        if self.url_filter.contains(task.url()) {
            tracing::debug!("filtered url [{}]", task.url());
            return false;
        }

        self.url_filter.insert(task.url().to_string());
        match end {
            QueueEnd::Back => self.tasks.push_back(task),
            QueueEnd::Front => self.tasks.push_front(task),
        }
        true
    }

    /// Pops the next task to process
    pub fn pop_front(&mut self) -> Option<Task> {
        self.tasks.pop_front()
    }

    /// Records a URL as seen without queueing anything
    ///
    /// Idempotent. Used when processing begins on a task that entered the
    /// queue without passing admission (the seed, or a checkpoint reload of
    /// a rolled-back task).
    pub fn mark_seen(&mut self, url: &str) {
        self.url_filter.insert(url.to_string());
    }

    /// Fault recovery: requeues the in-flight task at the front and releases
    /// its URL from the filter so the next run retries it
    ///
    /// This deliberately bypasses admission: the URL must *not* re-enter the
    /// filter, otherwise the retry would be rejected as already seen.
    pub fn rollback(&mut self, task: Task) {
        self.url_filter.remove(task.url());
        self.tasks.push_front(task);
    }

    /// Whether a URL has been seen
    pub fn contains(&self, url: &str) -> bool {
        self.url_filter.contains(url)
    }

    /// Number of pending tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the queue is drained
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Pending tasks in processing order (for checkpointing)
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// Seen URLs (for checkpointing); iteration order is unspecified
    pub fn seen_urls(&self) -> impl Iterator<Item = &str> {
        self.url_filter.iter().map(String::as_str)
    }
}
