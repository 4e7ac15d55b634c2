use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::fetch::FetchOptions;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract the books of one shelf, curated list or series page as JSONL.
    Scrape(ScrapeArgs),
    /// Fetch every book of the configured lists that the local library is missing.
    Sync(SyncArgs),
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Delay before each page request (politeness).
    #[arg(long, default_value_t = 1000)]
    pub delay_ms: u64,

    /// Extra attempts for a page that fails with a transient error.
    #[arg(long, default_value_t = 3)]
    pub retries: u32,

    /// Wait before the first retry; doubles on each further retry.
    #[arg(long, default_value_t = 2000)]
    pub backoff_ms: u64,

    /// Per-request timeout.
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}

impl FetchArgs {
    #[must_use]
    pub fn options(&self) -> FetchOptions {
        FetchOptions {
            delay: Duration::from_millis(self.delay_ms),
            retries: self.retries,
            backoff: Duration::from_millis(self.backoff_ms),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(Debug, Args)]
pub struct ScrapeArgs {
    /// Shelf, curated list or series URL.
    #[arg(long)]
    pub url: String,

    /// Output file for records (default: stdout). Must not exist.
    #[arg(long)]
    pub out: Option<String>,

    #[command(flatten)]
    pub fetch: FetchArgs,
}

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// List URLs to sync (repeatable).
    #[arg(long = "url", env = "GOODREADS_URLS", value_delimiter = ',')]
    pub urls: Vec<String>,

    /// Path to the library's `metadata.db`.
    #[arg(long, env = "METADATA_DB")]
    pub metadata_db: Option<String>,

    /// Acquisition API base URL, e.g. `http://10.0.0.2:8084/request/api/`.
    #[arg(long, env = "ACQUISITION_API_BASE")]
    pub api_base: Option<String>,

    /// Host of the acquisition API when `--api-base` is not given.
    #[arg(long, env = "CALIBRE_API_IP", default_value = "100.67.69.109")]
    pub api_ip: String,

    /// Seconds between download status polls.
    #[arg(long, default_value_t = 5)]
    pub poll_interval_secs: u64,

    /// Status polls per download before giving up on it.
    #[arg(long, default_value_t = 360)]
    pub max_polls: u32,

    /// Scrape and match only; request nothing from the acquisition API.
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub fetch: FetchArgs,
}

impl SyncArgs {
    #[must_use]
    pub fn api_base_url(&self) -> String {
        match self.api_base.as_deref() {
            Some(base) if base.ends_with('/') => base.to_owned(),
            Some(base) => format!("{base}/"),
            None => format!("http://{}:8084/request/api/", self.api_ip),
        }
    }
}
