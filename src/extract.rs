use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use crate::document::{Document, child_text};
use crate::formats::{ListKind, Record};
use crate::plan::ListPlan;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

static SHELF_BODY: LazyLock<Selector> = LazyLock::new(|| selector("tbody#booksBody"));
static SHELF_ROW: LazyLock<Selector> = LazyLock::new(|| selector("tr"));
static SHELF_TITLE: LazyLock<Selector> = LazyLock::new(|| selector("td.field.title a"));
static SHELF_AUTHOR: LazyLock<Selector> = LazyLock::new(|| selector("td.field.author a"));

static LIST_ROW: LazyLock<Selector> = LazyLock::new(|| selector("tr"));
static LIST_TITLE: LazyLock<Selector> =
    LazyLock::new(|| selector("a.bookTitle span[itemprop='name']"));
static LIST_TITLE_LINK: LazyLock<Selector> = LazyLock::new(|| selector("a.bookTitle"));
static LIST_AUTHOR: LazyLock<Selector> =
    LazyLock::new(|| selector("a.authorName span[itemprop='name']"));
static LIST_AUTHOR_LINK: LazyLock<Selector> = LazyLock::new(|| selector("a.authorName"));

static SERIES_ITEM: LazyLock<Selector> = LazyLock::new(|| selector("div.listWithDividers__item"));
static SERIES_NUMBER: LazyLock<Selector> = LazyLock::new(|| selector("h3"));
static SERIES_TITLE: LazyLock<Selector> =
    LazyLock::new(|| selector("span[itemprop='name'][role='heading']"));
static SERIES_TITLE_LINK: LazyLock<Selector> =
    LazyLock::new(|| selector("a[itemprop='url'] span[itemprop='name']"));
static SERIES_AUTHOR: LazyLock<Selector> =
    LazyLock::new(|| selector("span[itemprop='author'] span[itemprop='name']"));

/// Records of one page in document order. An empty result means the page had no rows.
#[must_use]
pub fn extract(plan: &ListPlan, doc: &Document) -> Vec<Record> {
    match plan.kind {
        ListKind::Shelf => extract_shelf(doc),
        ListKind::CuratedList => extract_curated_list(doc),
        ListKind::Series => extract_series(doc, plan.total_items),
    }
}

fn extract_shelf(doc: &Document) -> Vec<Record> {
    let Some(body) = doc.select_first(&SHELF_BODY) else {
        tracing::debug!("shelf table not found");
        return Vec::new();
    };

    body.select(&SHELF_ROW)
        .enumerate()
        .map(|(row, element)| {
            let title = child_text(element, &SHELF_TITLE);
            let author = child_text(element, &SHELF_AUTHOR).map(|name| flip_sort_name(&name));
            build_record(ListKind::Shelf, row, title, author)
        })
        .collect()
}

fn extract_curated_list(doc: &Document) -> Vec<Record> {
    doc.select_all(&LIST_ROW)
        .enumerate()
        .map(|(row, element)| {
            let title = first_text(element, &[&*LIST_TITLE, &*LIST_TITLE_LINK]);
            let author = first_text(element, &[&*LIST_AUTHOR, &*LIST_AUTHOR_LINK]);
            build_record(ListKind::CuratedList, row, title, author)
        })
        .collect()
}

/// Main-line entries (plus zero-numbered prequels) until `main_total` whole-numbered
/// entries have been taken. Ranged ("1-3") and fractional ("2.5") entries are skipped.
fn extract_series(doc: &Document, main_total: usize) -> Vec<Record> {
    let mut records = Vec::new();
    let mut main_count = 0_usize;

    for (row, item) in doc.select_all(&SERIES_ITEM).enumerate() {
        if main_count >= main_total {
            break;
        }

        let Some(label) = child_text(item, &SERIES_NUMBER) else {
            tracing::warn!(row, "series entry has no number; skipping");
            continue;
        };
        let position = match parse_entry_number(&label) {
            EntryNumber::Position(position) => position,
            EntryNumber::Range => {
                tracing::debug!(row, %label, "skipping multi-entry series item");
                continue;
            }
            EntryNumber::Invalid => {
                tracing::warn!(row, %label, "unparsable series entry number; skipping");
                continue;
            }
        };

        if position.fract() != 0.0 {
            tracing::debug!(row, %label, "skipping side entry");
            continue;
        }
        if position != 0.0 {
            main_count += 1;
        }

        let title = first_text(item, &[&*SERIES_TITLE, &*SERIES_TITLE_LINK]);
        let author = child_text(item, &SERIES_AUTHOR);
        records.push(build_record(ListKind::Series, row, title, author));
    }

    records
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum EntryNumber {
    Position(f64),
    Range,
    Invalid,
}

fn parse_entry_number(label: &str) -> EntryNumber {
    let Some(number) = label.trim().strip_prefix("Book") else {
        return EntryNumber::Invalid;
    };
    let number = number.trim();
    if number.contains(['-', '–']) {
        return EntryNumber::Range;
    }
    match number.parse::<f64>() {
        Ok(position) if position.is_finite() && position >= 0.0 => EntryNumber::Position(position),
        _ => EntryNumber::Invalid,
    }
}

fn first_text(element: ElementRef<'_>, selectors: &[&Selector]) -> Option<String> {
    selectors
        .iter()
        .find_map(|selector| child_text(element, selector))
}

/// `Corey, James S.A.` becomes `James S.A. Corey`.
fn flip_sort_name(name: &str) -> String {
    match name.split_once(", ") {
        Some((last, first)) if !first.contains(',') && !last.contains(',') => {
            format!("{} {}", first.trim(), last.trim())
        }
        _ => name.to_owned(),
    }
}

fn build_record(
    kind: ListKind,
    row: usize,
    title: Option<String>,
    author: Option<String>,
) -> Record {
    if title.is_none() || author.is_none() {
        tracing::warn!(
            %kind,
            row,
            title = title.as_deref().unwrap_or_default(),
            author = author.as_deref().unwrap_or_default(),
            "row is missing title or author"
        );
    }
    Record::new(kind, title, author)
}
