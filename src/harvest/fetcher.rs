//! HTTP fetching for source pages
//!
//! One shared client, one retry policy. Extractors never fetch; the
//! scheduler fetches page text here and hands it to an extractor.

use crate::config::HttpConfig;
use crate::harvest::retry::RetryPolicy;
use crate::{FetchError, FetchResult};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

/// Builds the HTTP client every component shares
///
/// # Arguments
///
/// * `config` - HTTP configuration (user agent, timeout)
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Retry-wrapped page fetching
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    retry: RetryPolicy,
}

impl Fetcher {
    pub fn new(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Fetches a page body as text, retrying per the policy
    pub async fn get_text(&self, url: &str) -> FetchResult<String> {
        self.retry
            .run(url, || get_text_once(&self.client, url))
            .await
    }
}

/// One fetch attempt, with the error classification the retry policy needs
async fn get_text_once(client: &Client, url: &str) -> FetchResult<String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_send_error(url, e))?;

    let response = classify_status(url, response)?;

    response.text().await.map_err(|e| FetchError::Network {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// Maps a response status onto the fetch error taxonomy
///
/// 403 is included with 429 because the source sites use it for bot
/// throttling, not authorization.
pub(crate) fn classify_status(url: &str, response: Response) -> FetchResult<Response> {
    let status = response.status();

    if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
        return Err(FetchError::RateLimited {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    Ok(response)
}

pub(crate) fn classify_send_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
