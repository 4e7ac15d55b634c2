use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static SERIES_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\([^()]*#\s*[\d.]+(?:\s*-\s*[\d.]+)?\)\s*$").expect("series suffix regex")
});

/// Extraction strategy for a list page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListKind {
    Shelf,
    CuratedList,
    Series,
}

impl ListKind {
    /// Items per page, or `None` when the whole list arrives in one document.
    #[must_use]
    pub fn page_size(self) -> Option<usize> {
        match self {
            Self::Shelf => Some(10),
            Self::CuratedList => Some(100),
            Self::Series => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shelf => "shelf",
            Self::CuratedList => "curated-list",
            Self::Series => "series",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One book reference extracted from a list page.
///
/// Fields are fixed at construction; the destination tag is assigned once, after the
/// list name has been resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    source_strategy: ListKind,
    title: Option<String>,
    author: Option<String>,
    destination_tag: Option<String>,
}

impl Record {
    #[must_use]
    pub fn new(source_strategy: ListKind, title: Option<String>, author: Option<String>) -> Self {
        Self {
            source_strategy,
            title,
            author,
            destination_tag: None,
        }
    }

    #[must_use]
    pub fn source_strategy(&self) -> ListKind {
        self.source_strategy
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    #[must_use]
    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    #[must_use]
    pub fn destination_tag(&self) -> Option<&str> {
        self.destination_tag.as_deref()
    }

    /// Title without a trailing series marker such as ` (The Expanse, #3)`.
    #[must_use]
    pub fn search_title(&self) -> Option<&str> {
        let title = self.title.as_deref()?;
        let stripped = match SERIES_SUFFIX.find(title) {
            Some(found) if found.start() > 0 => &title[..found.start()],
            _ => title,
        };
        Some(stripped.trim())
    }

    pub(crate) fn assign_destination(&mut self, tag: &str) {
        if self.destination_tag.is_none() {
            self.destination_tag = Some(tag.to_owned());
        }
    }
}

/// Every record of one list, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedList {
    pub kind: ListKind,
    pub name: String,
    pub records: Vec<Record>,
}

/// One line of `scrape` JSONL output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordLine {
    pub source_url: String,
    pub scraped_at: String,
    #[serde(flatten)]
    pub record: Record,
}
