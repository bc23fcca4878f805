//! Crash-recovery checkpoint store
//!
//! The checkpoint is a single JSON document holding the remaining work queue
//! and the URL dedup filter, written under `<output-dir>/.crawl/task.json`.
//! It is written at most once per run (on an interrupted or faulted
//! shutdown) and consumed at most once per run at startup; the file is
//! deleted immediately after a successful load so it can never be replayed
//! twice. A corrupt or unreadable checkpoint is a fatal startup error;
//! falling back to a fresh seed would silently discard unfinished work.

mod reports;

pub use reports::ErrorReports;

use crate::frontier::Frontier;
use crate::task::{Task, TaskRecord};
use crate::CheckpointError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory under the output directory holding run state
pub const STATE_DIR: &str = ".crawl";

/// Checkpoint file name within [`STATE_DIR`]
pub const CHECKPOINT_FILE: &str = "task.json";

/// On-disk checkpoint document
#[derive(Debug, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Remaining tasks in processing order (front first)
    pub tasks: Vec<TaskRecord>,

    /// URLs already seen when the run stopped
    pub url_filter: Vec<String>,
}

/// Reads and writes the checkpoint file for one crawl run
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    /// Creates a store rooted at the run's output directory
    pub fn new(output_dir: &Path) -> Self {
        Self {
            path: output_dir.join(STATE_DIR).join(CHECKPOINT_FILE),
        }
    }

    /// The checkpoint file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a checkpoint from a previous run exists
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Loads the checkpoint if one exists, deleting the file on success
    ///
    /// Returns `Ok(None)` when there is nothing to resume. Any failure while
    /// a file exists is fatal to the caller.
    pub fn consume(&self) -> std::result::Result<Option<Frontier>, CheckpointError> {
        if !self.exists() {
            return Ok(None);
        }

        let display = self.path.display().to_string();

        let content = fs::read_to_string(&self.path).map_err(|source| CheckpointError::Read {
            path: display.clone(),
            source,
        })?;

        let checkpoint: Checkpoint =
            serde_json::from_str(&content).map_err(|source| CheckpointError::Corrupt {
                path: display.clone(),
                source,
            })?;

        // Delete only after a successful parse; a corrupt file stays on disk
        // for inspection.
        fs::remove_file(&self.path).map_err(|source| CheckpointError::Delete {
            path: display,
            source,
        })?;

        let tasks: Vec<_> = checkpoint
            .tasks
            .into_iter()
            .map(TaskRecord::into_task)
            .collect();
        let url_filter: HashSet<String> = checkpoint.url_filter.into_iter().collect();

        tracing::info!(
            "Resuming from checkpoint: {} pending tasks, {} seen URLs",
            tasks.len(),
            url_filter.len()
        );

        Ok(Some(Frontier::from_parts(tasks, url_filter)))
    }

    /// Writes the remaining queue and filter as the checkpoint document
    pub fn write(&self, frontier: &Frontier) -> std::result::Result<(), CheckpointError> {
        let display = self.path.display().to_string();

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| CheckpointError::Write {
                path: display.clone(),
                source,
            })?;
        }

        let checkpoint = Checkpoint {
            tasks: frontier.tasks().map(Task::to_record).collect(),
            url_filter: frontier.seen_urls().map(str::to_string).collect(),
        };

        let content = serde_json::to_string(&checkpoint)?;
        fs::write(&self.path, content).map_err(|source| CheckpointError::Write {
            path: display,
            source,
        })?;

        tracing::info!(
            "Checkpoint written: {} pending tasks, {} seen URLs",
            checkpoint.tasks.len(),
            checkpoint.url_filter.len()
        );

        Ok(())
    }
}
