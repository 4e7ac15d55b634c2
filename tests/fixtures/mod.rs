#![allow(dead_code)]

use std::ops::Range;

pub fn curated_list_page(heading: &str, declared: usize, rows: Range<usize>) -> String {
    let rows = rows
        .map(|n| {
            format!(
                r#"<tr itemscope itemtype="http://schema.org/Book">
  <td class="number">{rank}</td>
  <td><a class="bookTitle" href="/book/show/{n}"><span itemprop="name" role="heading">List Book {n}</span></a>
  by <span itemprop="author"><a class="authorName" href="/author/show/{n}"><span itemprop="name">Author {n}</span></a></span></td>
</tr>
"#,
                rank = n + 1
            )
        })
        .collect::<String>();
    format!(
        r#"<!doctype html>
<html>
  <head><title>{heading} (Goodreads)</title></head>
  <body>
    <h1 class="gr-h1 gr-h1--serif">{heading}</h1>
    <div class="stacked">{declared} books &mdash; 1,024 voters</div>
    <table class="tableList js-dataTooltip">
{rows}    </table>
  </body>
</html>
"#
    )
}

pub fn shelf_page(owner: &str, shelf: &str, declared: usize, rows: Range<usize>) -> String {
    let rows = rows
        .map(|n| {
            format!(
                r#"<tr id="review_{n}" class="bookalike review">
  <td class="field title"><label>title</label><div class="value"><a title="Shelf Book {n}" href="/book/show/{n}">Shelf Book {n}</a></div></td>
  <td class="field author"><label>author</label><div class="value"><a href="/author/show/{n}">Writer{n}, Pat</a></div></td>
</tr>
"#
            )
        })
        .collect::<String>();
    format!(
        r#"<!doctype html>
<html>
  <head><title>{owner}'s '{shelf}' books on Goodreads ({declared} books)</title></head>
  <body>
    <table id="books"><tbody id="booksBody">
{rows}    </tbody></table>
  </body>
</html>
"#
    )
}

/// `entries` are `(entry label, title, author)`.
pub fn series_page(name: &str, author: &str, primary: usize, entries: &[(&str, &str, &str)]) -> String {
    let items = entries
        .iter()
        .map(|(label, title, author)| {
            format!(
                r#"<div class="listWithDividers__item">
  <h3 class="gr-h3 gr-h3--noBottomMargin">{label}</h3>
  <div class="responsiveBook">
    <a class="gr-h3 gr-h3--serif gr-h3--noMargin" itemprop="url" href="/book/show/1"><span itemprop="name" role="heading">{title}</span></a>
    <div>by <span itemprop="author"><a class="ContributorLink" itemprop="url" href="/author/show/1"><span itemprop="name">{author}</span></a></span></div>
  </div>
</div>
"#
            )
        })
        .collect::<String>();
    format!(
        r#"<!doctype html>
<html>
  <head><title>{name} by {author}</title></head>
  <body>
    <div class="responsiveSeriesHeader__subtitle u-paddingBottomSmall">{primary} primary works &bull; {total} total works</div>
{items}  </body>
</html>
"#,
        total = entries.len()
    )
}
