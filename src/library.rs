use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Context as _;
use rusqlite::{Connection, OpenFlags};

/// Both title and author must score above this (0-100) for a book to count as owned.
pub const MATCH_THRESHOLD: f64 = 90.0;

const BOOKS_BY_AUTHOR: &str = "SELECT books.title, authors.name FROM books \
     JOIN books_authors_link ON books.id = books_authors_link.book \
     JOIN authors ON books_authors_link.author = authors.id";

#[derive(Debug, Clone, PartialEq, Eq)]
struct LibraryBook {
    title: String,
    author: String,
}

/// Title/author pairs of the local library, loaded once.
#[derive(Debug, Default)]
pub struct Library {
    books: Vec<LibraryBook>,
}

impl Library {
    /// Reads a Calibre `metadata.db` without modifying it.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("open library db: {}", path.display()))?;

        let mut stmt = conn
            .prepare(BOOKS_BY_AUTHOR)
            .context("prepare library query")?;
        let books = stmt
            .query_map([], |row| {
                Ok(LibraryBook {
                    title: row.get(0)?,
                    author: row.get(1)?,
                })
            })
            .context("query library books")?
            .collect::<Result<Vec<_>, _>>()
            .context("read library row")?;

        tracing::info!(path = %path.display(), books = books.len(), "loaded library");
        Ok(Self { books })
    }

    #[cfg(test)]
    fn from_pairs<I, T, A>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (T, A)>,
        T: Into<String>,
        A: Into<String>,
    {
        Self {
            books: pairs
                .into_iter()
                .map(|(title, author)| LibraryBook {
                    title: title.into(),
                    author: author.into(),
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.books.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// The first library entry matching both title and author, as `(title, author)`.
    #[must_use]
    pub fn find(&self, title: &str, author: &str) -> Option<(&str, &str)> {
        self.books
            .iter()
            .find(|book| {
                token_set_ratio(title, &book.title) > MATCH_THRESHOLD
                    && token_set_ratio(author, &book.author) > MATCH_THRESHOLD
            })
            .map(|book| (book.title.as_str(), book.author.as_str()))
    }
}

/// Order- and duplicate-insensitive similarity of two strings on a 0-100 scale.
///
/// Shared tokens are compared against each side's full token set, so a string whose
/// tokens are a subset of the other's scores 100.
#[must_use]
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let a = tokens(a);
    let b = tokens(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let shared = join(a.intersection(&b));
    let only_a = join(a.difference(&b));
    let only_b = join(b.difference(&a));
    let with_a = join_nonempty(&shared, &only_a);
    let with_b = join_nonempty(&shared, &only_b);

    [
        ratio(&shared, &with_a),
        ratio(&shared, &with_b),
        ratio(&with_a, &with_b),
    ]
    .into_iter()
    .fold(0.0, f64::max)
}

fn tokens(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}

fn join<'a>(tokens: impl Iterator<Item = &'a String>) -> String {
    tokens.map(String::as_str).collect::<Vec<_>>().join(" ")
}

fn join_nonempty(left: &str, right: &str) -> String {
    match (left.is_empty(), right.is_empty()) {
        (true, _) => right.to_owned(),
        (_, true) => left.to_owned(),
        _ => format!("{left} {right}"),
    }
}

fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    strsim::normalized_levenshtein(a, b) * 100.0
}
