//! Crawler module: engine loop, fetching, DOM queries, extraction, throttle
//!
//! The engine consumes tasks from the frontier strictly in FIFO order on a
//! single control thread; the page fetch and the throttle sleep are its only
//! suspension points.

mod engine;
mod extract;
mod fetcher;
mod page;
mod throttle;

pub use engine::{CancelFlag, Engine, RunOutcome};
pub use extract::ContentExtractor;
pub use fetcher::{build_http_client, fetch_page, FetchOutcome};
pub use page::Page;
pub use throttle::sample_interval;
