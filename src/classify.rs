use url::Url;

use crate::formats::ListKind;

const SHELF_MARKER: &str = "/review/";
const CURATED_LIST_MARKER: &str = "/list/show";
const SERIES_MARKER: &str = "/series/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub kind: ListKind,
    /// The URL as given, used as the base for later page cursors.
    pub source: Url,
    pub first_page: Url,
}

/// Decides how a list URL is scraped. `None` means there is nothing to scrape.
#[must_use]
pub fn classify(input: &str) -> Option<Classified> {
    let url = Url::parse(input.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return None;
    }

    let path = url.path();
    let kind = if path.contains(SHELF_MARKER) {
        ListKind::Shelf
    } else if path.contains(CURATED_LIST_MARKER) {
        ListKind::CuratedList
    } else if path.contains(SERIES_MARKER) {
        ListKind::Series
    } else {
        return None;
    };

    let first_page = page_url(kind, &url, 1).unwrap_or_else(|| url.clone());
    Some(Classified {
        kind,
        source: url,
        first_page,
    })
}

/// URL of `page` (1-based) for a paginated list; `None` for single-document lists.
///
/// Page 1 of a curated list is the URL as given, minus any `page` cursor.
#[must_use]
pub fn page_url(kind: ListKind, source: &Url, page: usize) -> Option<Url> {
    match kind {
        ListKind::Shelf => Some(with_page_params(source, Some(page), kind.page_size())),
        ListKind::CuratedList if page <= 1 => Some(with_page_params(source, None, None)),
        ListKind::CuratedList => Some(with_page_params(source, Some(page), None)),
        ListKind::Series => None,
    }
}

/// Sets or drops `page` (and sets `per_page` when given), keeping every other query pair
/// in order.
fn with_page_params(url: &Url, page: Option<usize>, per_page: Option<usize>) -> Url {
    let kept = url
        .query_pairs()
        .filter(|(key, _)| key != "page" && !(per_page.is_some() && key == "per_page"))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect::<Vec<_>>();

    let mut out = url.clone();
    out.set_query(None);
    if kept.is_empty() && page.is_none() && per_page.is_none() {
        return out;
    }
    {
        let mut pairs = out.query_pairs_mut();
        for (key, value) in &kept {
            pairs.append_pair(key, value);
        }
        if let Some(page) = page {
            pairs.append_pair("page", &page.to_string());
        }
        if let Some(per_page) = per_page {
            pairs.append_pair("per_page", &per_page.to_string());
        }
    }
    out
}
