use serde::Deserialize;

/// Default desktop-browser user agent
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 6.1; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/74.0.3729.169 Safari/537.36";

/// Main configuration structure for driftnet
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    pub output: OutputConfig,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Seed URL the crawl starts from (depth 0)
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// URL prefix a discovered link must match to be admitted
    #[serde(rename = "allowed-domain")]
    pub allowed_domain: String,

    /// Whether to sleep between iterations
    #[serde(default = "default_throttle")]
    pub throttle: bool,

    /// Lower bound of the randomized sleep interval (milliseconds, inclusive)
    #[serde(rename = "throttle-low-ms", default = "default_throttle_low_ms")]
    pub throttle_low_ms: u64,

    /// Upper bound of the randomized sleep interval (milliseconds, inclusive)
    #[serde(rename = "throttle-high-ms", default = "default_throttle_high_ms")]
    pub throttle_high_ms: u64,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// User agent sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory holding the output file and the `.crawl` state directory
    pub directory: String,

    /// Output file name (newline-delimited JSON), relative to `directory`
    #[serde(default = "default_output_file")]
    pub file: String,
}

fn default_throttle() -> bool {
    true
}

fn default_throttle_low_ms() -> u64 {
    1000
}

fn default_throttle_high_ms() -> u64 {
    3000
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_output_file() -> String {
    "output.json".to_string()
}

impl OutputConfig {
    /// Full path of the NDJSON output file
    pub fn output_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.directory).join(&self.file)
    }
}
