use std::time::Duration;

use anyhow::Context as _;
use reqwest::header::ACCEPT;
use url::Url;

use crate::document::Document;
use crate::error::FetchError;

const USER_AGENT: &str = concat!("shelfsync/", env!("CARGO_PKG_VERSION"));

/// Retrieves a page and hands back a parsed document.
pub trait Fetcher {
    fn fetch(&self, url: &Url) -> Result<Document, FetchError>;
}

#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Sleep before every request (politeness).
    pub delay: Duration,
    /// Extra attempts for transient failures.
    pub retries: u32,
    /// First retry wait; doubles on each further attempt.
    pub backoff: Duration,
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(1000),
            retries: 3,
            backoff: Duration::from_millis(2000),
            timeout: Duration::from_secs(30),
        }
    }
}

pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    options: FetchOptions,
}

impl HttpFetcher {
    pub fn new(options: FetchOptions) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(options.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .user_agent(USER_AGENT)
            .build()
            .context("build page http client")?;
        Ok(Self { client, options })
    }

    fn fetch_once(&self, url: &Url) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
            .send()
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        response.text().map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> Result<Document, FetchError> {
        let mut attempt = 0_u32;
        loop {
            if !self.options.delay.is_zero() {
                std::thread::sleep(self.options.delay);
            }

            match self.fetch_once(url) {
                Ok(html) => {
                    tracing::debug!(%url, bytes = html.len(), "fetched page");
                    return Ok(Document::parse(&html));
                }
                Err(err) if err.is_transient() && attempt < self.options.retries => {
                    let backoff = self.options.backoff.saturating_mul(2_u32.saturating_pow(attempt));
                    attempt += 1;
                    tracing::warn!(
                        %url,
                        attempt,
                        retries = self.options.retries,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %err,
                        "transient fetch failure; backing off"
                    );
                    std::thread::sleep(backoff);
                }
                Err(err) => return Err(err),
            }
        }
    }
}
