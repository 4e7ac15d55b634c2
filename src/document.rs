use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("title selector"));

/// A fetched HTML page.
#[derive(Debug)]
pub struct Document {
    html: Html,
}

impl Document {
    #[must_use]
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    pub fn select_first(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.html.select(selector).next()
    }

    pub fn select_all<'a>(&'a self, selector: &'a Selector) -> impl Iterator<Item = ElementRef<'a>> {
        self.html.select(selector)
    }

    /// Text of the `<title>` element, whitespace-collapsed.
    #[must_use]
    pub fn title(&self) -> Option<String> {
        let title = self.html.select(&TITLE).next()?;
        let text = element_text(title);
        (!text.is_empty()).then_some(text)
    }

    /// Every text node of the page concatenated, newlines removed.
    #[must_use]
    pub fn full_text(&self) -> String {
        self.html
            .root_element()
            .text()
            .collect::<String>()
            .replace(['\n', '\r'], "")
    }
}

/// Text content of an element, trimmed and whitespace-collapsed.
#[must_use]
pub fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// First match of `selector` inside `element`, as collapsed text; empty text counts as absent.
#[must_use]
pub fn child_text(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let text = element_text(element.select(selector).next()?);
    (!text.is_empty()).then_some(text)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
