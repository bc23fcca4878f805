//! Output sink for extracted records
//!
//! A single append-only, newline-delimited JSON file: every record an
//! extractor yields becomes exactly one line. The file is opened lazily on
//! first write and the engine flushes and closes it on every exit path
//! (success, interruption, fault); `Drop` is only a backstop.

use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while writing extracted records
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to open output file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output record: {0}")]
    Write(#[from] std::io::Error),

    #[error("Failed to serialize output record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = std::result::Result<T, OutputError>;

/// Append-only NDJSON record sink
#[derive(Debug)]
pub struct JsonLinesSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    records_written: u64,
}

impl JsonLinesSink {
    /// Creates a sink for the given file path; nothing is opened yet
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
            records_written: 0,
        }
    }

    /// The output file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records written so far this run
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Appends one record as a single JSON line
    pub fn write_record(&mut self, record: &Value) -> OutputResult<()> {
        let writer = self.open_writer()?;
        serde_json::to_writer(&mut *writer, record)?;
        writer.write_all(b"\n")?;
        self.records_written += 1;
        Ok(())
    }

    fn open_writer(&mut self) -> OutputResult<&mut BufWriter<File>> {
        if self.writer.is_none() {
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|source| OutputError::Open {
                        path: self.path.display().to_string(),
                        source,
                    })?;
                }
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .map_err(|source| OutputError::Open {
                    path: self.path.display().to_string(),
                    source,
                })?;
            self.writer = Some(BufWriter::new(file));
        }
        // just assigned above when absent
        match self.writer.as_mut() {
            Some(writer) => Ok(writer),
            None => unreachable!("writer opened on demand"),
        }
    }

    /// Flushes and releases the underlying file, if it was ever opened
    pub fn close(&mut self) -> OutputResult<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for JsonLinesSink {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
    }
}
