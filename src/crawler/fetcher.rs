//! HTTP fetcher implementation
//!
//! One GET per task, issued through a single shared client. The engine does
//! not retry: a non-2xx status or a transport failure is classified as a
//! download error, recorded, and the task is dropped for the rest of the run.

use reqwest::Client;
use std::time::Duration;

/// Classified result of fetching one page
#[derive(Debug)]
pub enum FetchOutcome {
    /// 2xx response with the page body
    Success {
        /// HTTP status code
        status: u16,
        /// Page body content
        body: String,
    },

    /// Non-2xx response
    HttpStatus {
        /// HTTP status code
        status: u16,
    },

    /// Connection, TLS, timeout, or body-read failure
    Transport {
        /// Error description
        error: String,
    },
}

/// Builds the HTTP client used for the whole run
///
/// # Arguments
///
/// * `user_agent` - The user agent string sent with every request
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies the outcome
///
/// Redirects are followed by the client; the body of the final response is
/// returned. Malformed URLs surface here as transport errors.
pub async fn fetch_page(client: &Client, url: &str) -> FetchOutcome {
    match client.get(url).send().await {
        Ok(response) => {
            let status = response.status();

            if !status.is_success() {
                return FetchOutcome::HttpStatus {
                    status: status.as_u16(),
                };
            }

            match response.text().await {
                Ok(body) => FetchOutcome::Success {
                    status: status.as_u16(),
                    body,
                },
                Err(e) => FetchOutcome::Transport {
                    error: e.to_string(),
                },
            }
        }
        Err(e) => {
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                "Connection failed".to_string()
            } else {
                e.to_string()
            };
            FetchOutcome::Transport { error }
        }
    }
}
