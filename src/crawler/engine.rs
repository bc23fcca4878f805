//! Crawl engine - the main orchestration loop
//!
//! The engine owns the frontier, the HTTP client, the output sink, and the
//! checkpoint store, and drives the crawl strictly sequentially: dequeue,
//! fetch, extract links, extract content, write output, throttle, repeat.
//!
//! Failure policy: a failed download is local (recorded, task dropped, run
//! continues); any fault during processing aborts the whole run, so a task
//! is never half-applied in a checkpoint.

use crate::checkpoint::{CheckpointStore, ErrorReports};
use crate::config::Config;
use crate::crawler::extract::ContentExtractor;
use crate::crawler::fetcher::{build_http_client, fetch_page, FetchOutcome};
use crate::crawler::page::Page;
use crate::crawler::throttle::sample_interval;
use crate::frontier::Frontier;
use crate::output::JsonLinesSink;
use crate::task::{Link, Task};
use crate::{CrawlError, Result};
use reqwest::Client;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// How a run ended when it did not fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Queue drained normally; no checkpoint written
    Completed,
    /// Cancellation observed between iterations; checkpoint written
    Interrupted,
}

/// Internal terminal state of the crawl loop
enum LoopEnd {
    Completed,
    Interrupted,
    Faulted(CrawlError),
}

/// Cooperative cancellation handle
///
/// Cloneable; setting it from anywhere (typically a Ctrl-C handler) makes
/// the engine stop before its next iteration. It is never observed
/// mid-fetch, so the current task is always either fully applied or not yet
/// started when the engine stops.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates an unset flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The crawl engine
pub struct Engine {
    config: Config,
    client: Client,
    frontier: Frontier,
    sink: JsonLinesSink,
    store: CheckpointStore,
    reports: ErrorReports,
    extractor: Box<dyn ContentExtractor>,
    cancel: CancelFlag,
    download_errors: Vec<String>,
    process_errors: Vec<String>,
}

impl Engine {
    /// Creates an engine from configuration and an extraction hook
    pub fn new(config: Config, extractor: Box<dyn ContentExtractor>) -> Result<Self> {
        let client = build_http_client(&config.http.user_agent)?;
        let output_dir = Path::new(&config.output.directory);

        Ok(Self {
            client,
            sink: JsonLinesSink::new(config.output.output_path()),
            store: CheckpointStore::new(output_dir),
            reports: ErrorReports::new(output_dir),
            frontier: Frontier::new(),
            extractor,
            cancel: CancelFlag::new(),
            download_errors: Vec::new(),
            process_errors: Vec::new(),
            config,
        })
    }

    /// A handle that cancels this engine between iterations
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// The frontier (exposed for inspection in tests and tooling)
    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// URLs that failed to download so far this run
    pub fn download_errors(&self) -> &[String] {
        &self.download_errors
    }

    /// Runs the crawl to completion, interruption, or fault
    ///
    /// On interruption or fault the remaining queue and filter are written
    /// to the checkpoint file before returning, and a faulted run surfaces
    /// its processing error as `Err`. Error reports and the output sink are
    /// flushed on every exit path.
    pub async fn run(&mut self) -> Result<RunOutcome> {
        self.init()?;
        let end = self.run_loop().await;
        self.shutdown(end)
    }

    /// INIT: resume from a checkpoint if one exists, otherwise seed
    ///
    /// A failure to load an existing checkpoint is fatal; silently starting
    /// over would discard the interrupted run's remaining work.
    fn init(&mut self) -> Result<()> {
        match self.store.consume()? {
            Some(frontier) => {
                self.frontier = frontier;
            }
            None => {
                let seed = Task::seed(Link::bare(self.config.crawler.start_url.clone()));
                tracing::info!("Seeding crawl with {}", seed.url());
                self.frontier = Frontier::new();
                self.frontier.admit_back(seed);
            }
        }
        Ok(())
    }

    /// RUNNING: the sequential dequeue/fetch/process loop
    async fn run_loop(&mut self) -> LoopEnd {
        let mut pages_crawled = 0u64;
        let start_time = Instant::now();

        loop {
            // Cancellation is only ever observed here, between iterations.
            if self.cancel.is_cancelled() {
                tracing::info!("Cancellation requested, stopping");
                return LoopEnd::Interrupted;
            }

            let Some(task) = self.frontier.pop_front() else {
                tracing::info!("Queue drained, crawl complete");
                return LoopEnd::Completed;
            };

            if let Err(err) = self.step(&task).await {
                tracing::error!("Processing error for {}: {}", task.url(), err);
                self.process_errors.push(task.url().to_string());
                // Requeue at the front and release the URL so the next run
                // retries this exact task first.
                self.frontier.rollback(task);
                return LoopEnd::Faulted(err);
            }

            pages_crawled += 1;
            if pages_crawled % 10 == 0 {
                let rate = pages_crawled as f64 / start_time.elapsed().as_secs_f64();
                tracing::info!(
                    "Progress: {} pages crawled, {} queued, {:.2} pages/sec",
                    pages_crawled,
                    self.frontier.len(),
                    rate
                );
            }

            self.throttle().await;
        }
    }

    /// One iteration: fetch the task's page and process it
    ///
    /// Download failures are absorbed here (recorded + logged, `Ok`); only
    /// processing faults propagate.
    async fn step(&mut self, task: &Task) -> Result<()> {
        let body = match fetch_page(&self.client, task.url()).await {
            FetchOutcome::Success { status, body } => {
                tracing::info!("download [ {} ] success, status={}", task.url(), status);
                body
            }
            FetchOutcome::HttpStatus { status } => {
                tracing::warn!("download [ {} ] error, status={}", task.url(), status);
                self.download_errors.push(task.url().to_string());
                return Ok(());
            }
            FetchOutcome::Transport { error } => {
                tracing::warn!("download [ {} ] error: {}", task.url(), error);
                self.download_errors.push(task.url().to_string());
                return Ok(());
            }
        };

        self.process_page(&body, task)
    }

    /// Link extraction, content extraction, and output for one fetched page
    fn process_page(&mut self, body: &str, task: &Task) -> Result<()> {
        let base = Url::parse(task.url()).map_err(|e| CrawlError::Process {
            url: task.url().to_string(),
            source: anyhow::Error::new(e),
        })?;
        let page = Page::parse(body, base);

        // The seed and a rolled-back reload enter the queue without passing
        // admission; their URLs join the filter when processing begins.
        self.frontier.mark_seen(task.url());

        for link in page.links() {
            if link.url.starts_with(&self.config.crawler.allowed_domain) {
                self.frontier.admit_back(Task::child(task, link));
            }
        }

        let record = self
            .extractor
            .extract(&page, task)
            .map_err(|source| CrawlError::Process {
                url: task.url().to_string(),
                source,
            })?;

        match record {
            Some(value) => self.sink.write_record(&value).map_err(|e| CrawlError::Process {
                url: task.url().to_string(),
                source: anyhow::Error::new(e),
            })?,
            None => tracing::info!("task [ {} ] no output", task.url()),
        }

        Ok(())
    }

    /// Sleeps the sampled politeness interval, unless throttling is off
    async fn throttle(&self) {
        if !self.config.crawler.throttle {
            return;
        }
        let interval = sample_interval(
            self.config.crawler.throttle_low_ms,
            self.config.crawler.throttle_high_ms,
        );
        tokio::time::sleep(interval).await;
    }

    /// CHECKPOINTING + TERMINATED: persist state and release resources
    fn shutdown(&mut self, end: LoopEnd) -> Result<RunOutcome> {
        match end {
            LoopEnd::Completed => {
                self.write_reports()?;
                self.sink.close()?;
                tracing::info!(
                    "Run completed: {} records written, {} download errors",
                    self.sink.records_written(),
                    self.download_errors.len()
                );
                Ok(RunOutcome::Completed)
            }
            LoopEnd::Interrupted => {
                self.store.write(&self.frontier)?;
                self.write_reports()?;
                self.sink.close()?;
                tracing::info!("Run interrupted; resume by re-running with the same configuration");
                Ok(RunOutcome::Interrupted)
            }
            LoopEnd::Faulted(err) => {
                // Shutdown best-effort: the original fault must survive even
                // if persisting state fails too.
                if let Err(e) = self.store.write(&self.frontier) {
                    tracing::error!("Failed to write checkpoint during faulted shutdown: {}", e);
                }
                if let Err(e) = self.write_reports() {
                    tracing::error!("Failed to write error reports: {}", e);
                }
                if let Err(e) = self.sink.close() {
                    tracing::error!("Failed to close output sink: {}", e);
                }
                Err(err)
            }
        }
    }

    fn write_reports(&self) -> Result<()> {
        self.reports.append_download_errors(&self.download_errors)?;
        self.reports.append_process_errors(&self.process_errors)?;
        Ok(())
    }
}
