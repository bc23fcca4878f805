//! Append-only error report files
//!
//! Failed URLs accumulate in memory during the run and are appended to plain
//! text files under the state directory at shutdown: one file for download
//! errors, one for processing errors, one URL per line. The files are never
//! truncated, so reports add up across runs.

use super::STATE_DIR;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name for URLs that failed to download
pub const DOWNLOAD_ERROR_FILE: &str = "download_error.txt";

/// File name for URLs that faulted during processing
pub const PROCESS_ERROR_FILE: &str = "process_error.txt";

/// Writer for the per-run error report files
#[derive(Debug, Clone)]
pub struct ErrorReports {
    dir: PathBuf,
}

impl ErrorReports {
    /// Creates a report writer rooted at the run's output directory
    pub fn new(output_dir: &Path) -> Self {
        Self {
            dir: output_dir.join(STATE_DIR),
        }
    }

    /// Path of the download error report
    pub fn download_path(&self) -> PathBuf {
        self.dir.join(DOWNLOAD_ERROR_FILE)
    }

    /// Path of the processing error report
    pub fn process_path(&self) -> PathBuf {
        self.dir.join(PROCESS_ERROR_FILE)
    }

    /// Appends download-error URLs, one per line; no-op when empty
    pub fn append_download_errors(&self, urls: &[String]) -> std::io::Result<()> {
        self.append(&self.download_path(), urls)
    }

    /// Appends processing-error URLs, one per line; no-op when empty
    pub fn append_process_errors(&self, urls: &[String]) -> std::io::Result<()> {
        self.append(&self.process_path(), urls)
    }

    fn append(&self, path: &Path, urls: &[String]) -> std::io::Result<()> {
        if urls.is_empty() {
            return Ok(());
        }

        fs::create_dir_all(&self.dir)?;
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        for url in urls {
            writeln!(file, "{}", url)?;
        }
        file.flush()
    }
}
