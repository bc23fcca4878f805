//! Driftnet: a resumable breadth-first crawl engine
//!
//! This crate implements a single-threaded crawler that fetches pages within
//! an allowed domain, hands each page to a pluggable content extractor, and
//! streams extracted records to a newline-delimited JSON sink. Its in-flight
//! work queue and URL dedup filter are checkpointed to disk on interruption
//! or fault, so a restarted run resumes exactly where it left off.

pub mod checkpoint;
pub mod config;
pub mod crawler;
pub mod frontier;
pub mod output;
pub mod task;

use thiserror::Error;

/// Main error type for driftnet operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("Processing error for {url}: {source}")]
    Process {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Errors while loading or writing the crash-recovery checkpoint
///
/// A load failure at startup is fatal: the engine refuses to fall back to a
/// fresh seed, because that would silently discard unfinished work.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("Failed to read checkpoint file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt checkpoint file {path}: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write checkpoint file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize checkpoint: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to delete consumed checkpoint file {path}: {source}")]
    Delete {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for driftnet operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CancelFlag, ContentExtractor, Engine, Page, RunOutcome};
pub use frontier::Frontier;
pub use task::{Link, Task};
