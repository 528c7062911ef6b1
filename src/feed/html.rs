//! Header-keyed extraction of `<table>` elements from scraped pages.
//!
//! Both scraped sources change markup without notice, so nothing here keys on
//! CSS classes except the "long name" span some tables use for player cells.
//! Columns are located by substring match on the lowercased header text.

use anyhow::{Context, Result};
use scraper::{ElementRef, Html, Selector};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HtmlTable {
    /// Lowercased, whitespace-collapsed header labels.
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl HtmlTable {
    /// Index of the first header containing any of `needles`.
    pub fn column(&self, needles: &[&str]) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| needles.iter().any(|n| h.contains(n)))
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .ok()
        .with_context(|| format!("invalid selector: {}", css))
}

fn squash(text: impl Iterator<Item = impl AsRef<str>>) -> String {
    let joined: String = text.map(|t| t.as_ref().to_string()).collect::<Vec<_>>().join(" ");
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cell text, preferring the long-form player name when the cell carries
/// both an abbreviated and a full rendering.
fn cell_text(cell: ElementRef<'_>, long_name: &Selector) -> String {
    match cell.select(long_name).next() {
        Some(long) => squash(long.text()),
        None => squash(cell.text()),
    }
}

/// Every table in the document that has a header row. Tables without `<th>`
/// cells are skipped.
pub fn tables(html: &str) -> Result<Vec<HtmlTable>> {
    let document = Html::parse_document(html);
    let table_sel = selector("table")?;
    let row_sel = selector("tr")?;
    let th_sel = selector("th")?;
    let td_sel = selector("td")?;
    let long_sel = selector("[class*=\"--long\"]")?;

    let mut out = Vec::new();
    for table in document.select(&table_sel) {
        let mut headers: Vec<String> = Vec::new();
        let mut rows = Vec::new();
        for tr in table.select(&row_sel) {
            let ths: Vec<_> = tr.select(&th_sel).collect();
            if headers.is_empty() && !ths.is_empty() {
                headers = ths
                    .into_iter()
                    .map(|th| squash(th.text()).to_lowercase())
                    .collect();
                continue;
            }
            let cells: Vec<String> = tr
                .select(&td_sel)
                .map(|td| cell_text(td, &long_sel))
                .collect();
            if !cells.is_empty() {
                rows.push(cells);
            }
        }
        if headers.is_empty() {
            continue;
        }
        out.push(HtmlTable { headers, rows });
    }
    Ok(out)
}

/// `"Justin Tucker (BAL)"` → `"Justin Tucker"`.
pub fn strip_parenthetical(name: &str) -> &str {
    name.split(" (").next().unwrap_or(name).trim()
}
