use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;

use crate::acquire::{AcquisitionClient, DownloadOutcome, PollOptions};
use crate::cli::SyncArgs;
use crate::fetch::{Fetcher, HttpFetcher};
use crate::formats::Record;
use crate::library::Library;
use crate::scrape::scrape;

/// Counters for one batch run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub lists: usize,
    pub empty_lists: usize,
    pub failed_lists: usize,
    pub records: usize,
    pub incomplete: usize,
    pub owned: usize,
    /// Records that would have been searched (dry run only).
    pub wanted: usize,
    pub not_found: usize,
    pub downloaded: usize,
    pub failed: usize,
}

impl SyncReport {
    fn print(&self) {
        println!(
            "Lists: {} scraped, {} empty, {} failed. Books: {} seen, {} incomplete, {} owned, {} wanted, {} not found, {} downloaded, {} failed.",
            self.lists,
            self.empty_lists,
            self.failed_lists,
            self.records,
            self.incomplete,
            self.owned,
            self.wanted,
            self.not_found,
            self.downloaded,
            self.failed,
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Acquisition {
    Downloaded,
    NotFound,
    Failed,
}

pub fn run(args: SyncArgs) -> anyhow::Result<()> {
    let urls = args
        .urls
        .iter()
        .map(|url| url.trim())
        .filter(|url| !url.is_empty())
        .collect::<Vec<_>>();
    if urls.is_empty() {
        anyhow::bail!("no list urls configured (--url or GOODREADS_URLS)");
    }
    let metadata_db = args
        .metadata_db
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("no library configured (--metadata-db or METADATA_DB)"))?;

    let library = Library::open(Path::new(metadata_db)).context("load library")?;
    let fetcher = HttpFetcher::new(args.fetch.options()).context("build fetcher")?;
    let client = if args.dry_run {
        None
    } else {
        let base = args.api_base_url();
        tracing::info!(%base, "acquisition api");
        Some(AcquisitionClient::new(&base).context("build acquisition client")?)
    };
    let poll = PollOptions {
        interval: Duration::from_secs(args.poll_interval_secs),
        max_polls: args.max_polls.max(1),
    };

    let report = sync_lists(&fetcher, &library, client.as_ref(), &poll, &urls);
    tracing::info!(?report, "sync: done");
    report.print();
    Ok(())
}

/// Scrapes each list and acquires every book the library does not already hold.
///
/// A list that fails to scrape is counted and skipped; the batch always runs to the end.
pub fn sync_lists<F>(
    fetcher: &F,
    library: &Library,
    client: Option<&AcquisitionClient>,
    poll: &PollOptions,
    urls: &[&str],
) -> SyncReport
where
    F: Fetcher + ?Sized,
{
    let mut report = SyncReport::default();

    for url in urls {
        tracing::info!(url, "sync: list");
        let list = match scrape(fetcher, url) {
            Ok(Some(list)) if !list.records.is_empty() => list,
            Ok(_) => {
                tracing::info!(url, "no books found in list");
                report.empty_lists += 1;
                continue;
            }
            Err(err) => {
                let err = anyhow::Error::from(err);
                tracing::warn!(url, error = %format!("{err:#}"), "list scrape failed; skipping");
                report.failed_lists += 1;
                continue;
            }
        };
        report.lists += 1;

        for (index, record) in list.records.iter().enumerate() {
            report.records += 1;
            sync_record(library, client, poll, index + 1, record, &mut report);
        }
    }

    report
}

fn sync_record(
    library: &Library,
    client: Option<&AcquisitionClient>,
    poll: &PollOptions,
    position: usize,
    record: &Record,
    report: &mut SyncReport,
) {
    let (Some(title), Some(author)) = (record.search_title(), record.author()) else {
        tracing::warn!(position, ?record, "skipping book with missing title or author");
        report.incomplete += 1;
        return;
    };

    if let Some((owned_title, owned_author)) = library.find(title, author) {
        tracing::info!(title, author, owned_title, owned_author, "already in library; skipping");
        report.owned += 1;
        return;
    }

    let Some(client) = client else {
        tracing::info!(position, title, author, list = record.destination_tag(), "dry run: would acquire");
        report.wanted += 1;
        return;
    };

    tracing::info!(position, title, author, list = record.destination_tag(), "acquiring");
    match acquire(client, poll, title, author) {
        Acquisition::Downloaded => report.downloaded += 1,
        Acquisition::NotFound => report.not_found += 1,
        Acquisition::Failed => report.failed += 1,
    }
}

/// Tries each search result in order until one download completes.
fn acquire(client: &AcquisitionClient, poll: &PollOptions, title: &str, author: &str) -> Acquisition {
    let ids = match client.search(title, author) {
        Ok(ids) => ids,
        Err(err) => {
            tracing::warn!(title, author, error = %format!("{err:#}"), "search failed");
            return Acquisition::Failed;
        }
    };
    if ids.is_empty() {
        tracing::info!(title, author, "no search result");
        return Acquisition::NotFound;
    }

    for (attempt, id) in ids.iter().enumerate() {
        tracing::info!(title, attempt = attempt + 1, id = %id, "requesting download");
        if let Err(err) = client.request_download(id) {
            tracing::warn!(title, id = %id, error = %format!("{err:#}"), "download request failed");
            continue;
        }

        match client.await_download(id, poll) {
            DownloadOutcome::Done => {
                tracing::info!(title, id = %id, "download completed");
                return Acquisition::Downloaded;
            }
            DownloadOutcome::Failed => {
                tracing::warn!(title, id = %id, "download failed; trying next result");
            }
            DownloadOutcome::TimedOut => {
                tracing::warn!(title, id = %id, polls = poll.max_polls, "download did not finish; trying next result");
            }
        }
    }

    Acquisition::Failed
}
