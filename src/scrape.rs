use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context as _;

use crate::classify::{Classified, classify, page_url};
use crate::cli::ScrapeArgs;
use crate::error::ScrapeError;
use crate::fetch::{Fetcher, HttpFetcher};
use crate::formats::{RecordLine, ScrapedList};
use crate::{extract, plan};

/// Scrapes every record of the list behind `input`.
///
/// Returns `Ok(None)` when the URL is not a shelf, curated list or series page. A fetch
/// failure after page 1 ends pagination early and keeps the records gathered so far.
pub fn scrape<F>(fetcher: &F, input: &str) -> Result<Option<ScrapedList>, ScrapeError>
where
    F: Fetcher + ?Sized,
{
    let Some(Classified {
        kind,
        source,
        first_page,
    }) = classify(input)
    else {
        tracing::info!(url = input, "not a shelf, list or series url; nothing to scrape");
        return Ok(None);
    };

    tracing::info!(%kind, url = %first_page, "scrape: first page");
    let mut doc = fetcher.fetch(&first_page)?;
    let plan = plan::plan(kind, &doc)?;
    let page_count = plan.page_count();
    tracing::info!(
        name = %plan.name,
        total = plan.total_items,
        pages = page_count,
        "scrape: planned"
    );

    let mut records = Vec::new();
    let mut remaining = plan.total_items;
    let mut page = 1_usize;

    while page <= page_count && remaining > 0 {
        let mut page_records = extract::extract(&plan, &doc);
        if page_records.is_empty() {
            tracing::info!(page, remaining, "page has no rows; stopping");
            break;
        }
        if plan.page_size().is_some() {
            page_records.truncate(remaining);
        }
        remaining = remaining.saturating_sub(page_records.len());
        for record in &mut page_records {
            record.assign_destination(&plan.name);
        }
        tracing::debug!(page, rows = page_records.len(), remaining, "extracted page");
        records.append(&mut page_records);

        page += 1;
        if page > page_count || remaining == 0 {
            break;
        }
        let Some(next) = page_url(kind, &source, page) else {
            break;
        };
        doc = match fetcher.fetch(&next) {
            Ok(doc) => doc,
            Err(err) => {
                tracing::warn!(
                    page,
                    url = %next,
                    error = %err,
                    kept = records.len(),
                    "page fetch failed; returning records gathered so far"
                );
                break;
            }
        };
    }

    tracing::info!(name = %plan.name, records = records.len(), "scrape: done");
    Ok(Some(ScrapedList {
        kind,
        name: plan.name,
        records,
    }))
}

pub fn run(args: ScrapeArgs) -> anyhow::Result<()> {
    let fetcher = HttpFetcher::new(args.fetch.options()).context("build fetcher")?;
    let Some(list) = scrape(&fetcher, &args.url).context("scrape list")? else {
        return Ok(());
    };

    let out: Box<dyn Write> = match args.out.as_deref() {
        Some(path) => {
            let path = PathBuf::from(path);
            let file = OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&path)
                .with_context(|| format!("create records output: {}", path.display()))?;
            Box::new(file)
        }
        None => Box::new(std::io::stdout().lock()),
    };
    let mut out = BufWriter::new(out);

    let scraped_at = chrono::Utc::now().to_rfc3339();
    for record in list.records {
        let line = RecordLine {
            source_url: args.url.clone(),
            scraped_at: scraped_at.clone(),
            record,
        };
        serde_json::to_writer(&mut out, &line).context("write record json")?;
        out.write_all(b"\n").context("write record newline")?;
    }
    out.flush().context("flush records output")?;

    Ok(())
}
