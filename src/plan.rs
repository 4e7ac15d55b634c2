use std::sync::LazyLock;

use regex::Regex;
use scraper::Selector;

use crate::document::{Document, element_text};
use crate::error::ScrapeError;
use crate::formats::ListKind;

/// Shelf size assumed when the page does not state one.
pub const DEFAULT_SHELF_COUNT: usize = 100;
pub const DEFAULT_SHELF_NAME: &str = "Goodreads Shelf";

static BOOK_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d[\d,]*)\s+books?\b").expect("book count regex"));

static QUOTED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|\s)['‘"“]([^'’"”]+)['’"”]"#).expect("quoted name regex")
});

static SHELF_COUNTER: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("span.h1Shelf span.greyText").expect("shelf counter selector")
});

static LIST_COUNT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.stacked").expect("list count selector"));

static LIST_HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1.gr-h1.gr-h1--serif").expect("list heading selector"));

static SERIES_SUBTITLE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.responsiveSeriesHeader__subtitle").expect("series subtitle selector")
});

/// What page 1 says about the whole list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPlan {
    pub kind: ListKind,
    pub total_items: usize,
    pub name: String,
}

impl ListPlan {
    #[must_use]
    pub fn page_size(&self) -> Option<usize> {
        self.kind.page_size()
    }

    /// Number of fetches the list needs, page 1 included.
    #[must_use]
    pub fn page_count(&self) -> usize {
        match self.page_size() {
            Some(size) => self.total_items.div_ceil(size),
            None => 1,
        }
    }
}

pub fn plan(kind: ListKind, doc: &Document) -> Result<ListPlan, ScrapeError> {
    match kind {
        ListKind::Shelf => Ok(plan_shelf(doc)),
        ListKind::CuratedList => plan_curated_list(doc),
        ListKind::Series => plan_series(doc),
    }
}

fn plan_shelf(doc: &Document) -> ListPlan {
    let title = doc.title().unwrap_or_default();

    let counter = || {
        doc.select_first(&SHELF_COUNTER)
            .and_then(|counter| parse_count(&element_text(counter)))
    };
    // The count suffix comes last; a shelf name may itself mention books.
    let total_items = match BOOK_COUNT
        .captures_iter(&title)
        .last()
        .and_then(|caps| parse_count(&caps[1]))
        .or_else(counter)
    {
        Some(total) => total,
        None => {
            tracing::warn!(
                %title,
                default = DEFAULT_SHELF_COUNT,
                "shelf book count not found; using default"
            );
            DEFAULT_SHELF_COUNT
        }
    };

    let name = match QUOTED_NAME
        .captures(&title)
        .map(|caps| caps[1].trim().to_owned())
        .filter(|name| !name.is_empty())
    {
        Some(name) => name,
        None => {
            tracing::warn!(%title, default = DEFAULT_SHELF_NAME, "shelf name not found; using default");
            DEFAULT_SHELF_NAME.to_owned()
        }
    };

    ListPlan {
        kind: ListKind::Shelf,
        total_items,
        name,
    }
}

fn plan_curated_list(doc: &Document) -> Result<ListPlan, ScrapeError> {
    let kind = ListKind::CuratedList;
    let total_items = doc
        .select_first(&LIST_COUNT)
        .map(element_text)
        .and_then(|text| {
            let count = text.split(" books").next().unwrap_or_default().trim().to_owned();
            parse_count(&count)
        })
        .ok_or(ScrapeError::MissingMarkup {
            kind,
            what: "total book count",
        })?;

    let name = doc
        .select_first(&LIST_HEADING)
        .map(element_text)
        .filter(|name| !name.is_empty())
        .ok_or(ScrapeError::MissingMarkup {
            kind,
            what: "list heading",
        })?;

    Ok(ListPlan {
        kind,
        total_items,
        name,
    })
}

fn plan_series(doc: &Document) -> Result<ListPlan, ScrapeError> {
    let kind = ListKind::Series;
    let total_items = doc
        .select_first(&SERIES_SUBTITLE)
        .map(element_text)
        .and_then(|text| text.split_whitespace().next().and_then(parse_count))
        .ok_or(ScrapeError::MissingMarkup {
            kind,
            what: "primary work count",
        })?;

    let text = doc.full_text();
    let name = text
        .split_once(" by")
        .map(|(name, _)| name.trim().to_owned())
        .filter(|name| !name.is_empty())
        .ok_or(ScrapeError::MissingMarkup {
            kind,
            what: "series name",
        })?;

    Ok(ListPlan {
        kind,
        total_items,
        name,
    })
}

/// Parses `1,234` or `(1,234)`.
fn parse_count(text: &str) -> Option<usize> {
    let digits = text
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .replace(',', "");
    digits.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shelf_doc(title: &str, body: &str) -> Document {
        Document::parse(&format!(
            "<html><head><title>{title}</title></head><body>{body}</body></html>"
        ))
    }

    #[test]
    fn shelf_title_gives_count_and_name() -> anyhow::Result<()> {
        let doc = shelf_doc("Jane's 'to-read' books on Goodreads (1,234 books)", "");
        let plan = plan(ListKind::Shelf, &doc)?;
        assert_eq!(plan.total_items, 1234);
        assert_eq!(plan.name, "to-read");
        assert_eq!(plan.page_count(), 124);
        Ok(())
    }

    #[test]
    fn shelf_single_book_and_curly_quotes() -> anyhow::Result<()> {
        let doc = shelf_doc("Jane’s ‘favourites’ books on Goodreads (1 book)", "");
        let plan = plan(ListKind::Shelf, &doc)?;
        assert_eq!(plan.total_items, 1);
        assert_eq!(plan.name, "favourites");
        assert_eq!(plan.page_count(), 1);
        Ok(())
    }

    #[test]
    fn shelf_counter_is_used_when_title_has_no_count() -> anyhow::Result<()> {
        let doc = shelf_doc(
            "Jane's 'read' shelf",
            r#"<span class="h1Shelf">Jane's read <span class="greyText">(37)</span></span>"#,
        );
        let plan = plan(ListKind::Shelf, &doc)?;
        assert_eq!(plan.total_items, 37);
        assert_eq!(plan.name, "read");
        Ok(())
    }

    #[test]
    fn shelf_falls_back_to_defaults() -> anyhow::Result<()> {
        let doc = shelf_doc("Goodreads", "<p>redesigned</p>");
        let plan = plan(ListKind::Shelf, &doc)?;
        assert_eq!(plan.total_items, DEFAULT_SHELF_COUNT);
        assert_eq!(plan.name, DEFAULT_SHELF_NAME);
        assert_eq!(plan.page_count(), 10);
        Ok(())
    }

    #[test]
    fn curated_list_reads_count_and_heading() -> anyhow::Result<()> {
        let doc = Document::parse(
            r#"<html><body>
              <h1 class="gr-h1 gr-h1--serif">
                Best Science Fiction
              </h1>
              <div class="stacked"> 2,501 books &mdash; 9,876 voters </div>
            </body></html>"#,
        );
        let plan = plan(ListKind::CuratedList, &doc)?;
        assert_eq!(plan.total_items, 2501);
        assert_eq!(plan.name, "Best Science Fiction");
        assert_eq!(plan.page_count(), 26);
        Ok(())
    }

    #[test]
    fn curated_list_without_markup_fails() {
        let doc = Document::parse(r#"<html><body><div class="stacked">12 books</div></body></html>"#);
        let err = plan(ListKind::CuratedList, &doc).err();
        assert!(matches!(
            err,
            Some(ScrapeError::MissingMarkup {
                kind: ListKind::CuratedList,
                what: "list heading"
            })
        ));

        let doc = Document::parse("<html><body></body></html>");
        assert!(matches!(
            plan(ListKind::CuratedList, &doc),
            Err(ScrapeError::MissingMarkup {
                what: "total book count",
                ..
            })
        ));
    }

    #[test]
    fn series_reads_subtitle_and_name() -> anyhow::Result<()> {
        let doc = Document::parse(
            r#"<html><head><title>The Expanse Series by James S.A. Corey</title></head><body>
              <div class="responsiveSeriesHeader__subtitle u-paddingBottomSmall">9 primary works &bull; 20 total works</div>
            </body></html>"#,
        );
        let plan = plan(ListKind::Series, &doc)?;
        assert_eq!(plan.total_items, 9);
        assert_eq!(plan.name, "The Expanse Series");
        assert_eq!(plan.page_count(), 1);
        assert_eq!(plan.page_size(), None);
        Ok(())
    }

    #[test]
    fn shelf_count_comes_from_the_suffix() -> anyhow::Result<()> {
        let doc = shelf_doc("Jane's 'top 10 books' books on Goodreads (42 books)", "");
        let plan = plan(ListKind::Shelf, &doc)?;
        assert_eq!(plan.total_items, 42);
        assert_eq!(plan.name, "top 10 books");
        Ok(())
    }

    #[test]
    fn series_without_author_byline_fails() {
        let doc = Document::parse(
            r#"<html><head><title>The Expanse Series</title></head><body>
              <div class="responsiveSeriesHeader__subtitle">9 primary works &bull; 20 total works</div>
            </body></html>"#,
        );
        assert!(matches!(
            plan(ListKind::Series, &doc),
            Err(ScrapeError::MissingMarkup {
                kind: ListKind::Series,
                what: "series name"
            })
        ));
    }

    #[test]
    fn series_without_subtitle_fails() {
        let doc = Document::parse("<html><head><title>Dune by Frank Herbert</title></head></html>");
        assert!(matches!(
            plan(ListKind::Series, &doc),
            Err(ScrapeError::MissingMarkup {
                kind: ListKind::Series,
                ..
            })
        ));
    }
}
