use std::time::Duration;

use anyhow::Context as _;
use serde_json::Value;
use url::Url;

const FORMATS: [&str; 7] = ["epub", "mobi", "azw3", "fb2", "djvu", "cbz", "cbr"];
const LANGUAGE: &str = "en";

pub const STATUS_DONE: &str = "done";
pub const STATUS_ERROR: &str = "error";

/// Client for the acquisition service's search / download / status endpoints.
pub struct AcquisitionClient {
    client: reqwest::blocking::Client,
    base: Url,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    Done,
    Failed,
    TimedOut,
}

#[derive(Debug, Clone)]
pub struct PollOptions {
    pub interval: Duration,
    pub max_polls: u32,
}

impl AcquisitionClient {
    pub fn new(base: &str) -> anyhow::Result<Self> {
        let base = Url::parse(base).with_context(|| format!("parse acquisition api base: {base}"))?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("build acquisition http client")?;
        Ok(Self { client, base })
    }

    /// Ids of the search results for a book, best first.
    pub fn search(&self, title: &str, author: &str) -> anyhow::Result<Vec<String>> {
        let mut url = self.endpoint("search")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("author", author);
            pairs.append_pair("title", title);
            pairs.append_pair("lang", LANGUAGE);
            for format in FORMATS {
                pairs.append_pair("format", format);
            }
        }

        let value = self.get_json(&url)?;
        let ids: Vec<String> = value
            .as_array()
            .map(|hits| hits.iter().filter_map(|hit| hit.get("id").and_then(id_string)).collect())
            .unwrap_or_default();
        Ok(ids)
    }

    pub fn request_download(&self, id: &str) -> anyhow::Result<()> {
        let mut url = self.endpoint("download")?;
        url.query_pairs_mut().append_pair("id", id);
        self.get(&url)?;
        Ok(())
    }

    /// Name of the status category currently holding `id`, if any.
    pub fn status(&self, id: &str) -> anyhow::Result<Option<String>> {
        let url = self.endpoint("status")?;
        let value = self.get_json(&url)?;
        Ok(status_category(&value, id))
    }

    /// Polls until the download is done, fails, or the poll budget runs out.
    pub fn await_download(&self, id: &str, poll: &PollOptions) -> DownloadOutcome {
        for attempt in 1..=poll.max_polls {
            let status = match self.status(id) {
                Ok(status) => status,
                Err(err) => {
                    tracing::warn!(id, error = %format!("{err:#}"), "status request failed");
                    Some(STATUS_ERROR.to_owned())
                }
            };
            tracing::info!(id, poll = attempt, status = status.as_deref().unwrap_or("unknown"), "download status");

            match status.as_deref() {
                Some(STATUS_DONE) => return DownloadOutcome::Done,
                Some(STATUS_ERROR) => return DownloadOutcome::Failed,
                _ => {}
            }
            if attempt < poll.max_polls {
                std::thread::sleep(poll.interval);
            }
        }
        DownloadOutcome::TimedOut
    }

    fn endpoint(&self, path: &str) -> anyhow::Result<Url> {
        self.base
            .join(path)
            .with_context(|| format!("build acquisition url: {path}"))
    }

    fn get(&self, url: &Url) -> anyhow::Result<String> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .with_context(|| format!("GET {url}"))?;
        let status = response.status();
        let raw = response.text().context("read acquisition response body")?;
        if !status.is_success() {
            anyhow::bail!("acquisition API error ({status}): {}", raw.trim());
        }
        Ok(raw)
    }

    fn get_json(&self, url: &Url) -> anyhow::Result<Value> {
        let raw = self.get(url)?;
        serde_json::from_str(&raw).with_context(|| format!("parse acquisition response: {url}"))
    }
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// The status document maps category names to the ids in that category, either as an
/// object keyed by id or as an array of ids.
fn status_category(value: &Value, id: &str) -> Option<String> {
    value.as_object()?.iter().find_map(|(category, members)| {
        let holds = match members {
            Value::Object(members) => members.contains_key(id),
            Value::Array(members) => members
                .iter()
                .any(|member| id_string(member).as_deref() == Some(id)),
            _ => false,
        };
        holds.then(|| category.clone())
    })
}
