use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use sa_core::ArticleRecord;

static LEADING_MARKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[[^\]]*\]\s*").unwrap());
static YEAR_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*\d{4}$").unwrap());

static H3_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("h3").unwrap());
static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a.gse_alrt_title").unwrap());
static AUTHOR_LINE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"div[style*="color:#006621"]"#).unwrap());
static SNIPPET_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("div.gse_alrt_sni").unwrap());

/// Parse one Scholar alert HTML body into article records.
///
/// Never fails: blocks that do not match the expected layout are skipped, so
/// malformed input yields an empty or partial list. Output order follows
/// document order of the title anchors.
pub fn parse_alert(html: &str) -> Vec<ArticleRecord> {
    let document = Html::parse_document(html);
    let mut records = Vec::new();

    for h3 in document.select(&H3_SELECTOR) {
        // Not every h3 is an article heading; only those wrapping a title
        // anchor count.
        let Some(anchor) = h3.select(&TITLE_SELECTOR).next() else {
            continue;
        };

        let title = clean_title(&collect_text(&anchor));
        let link = anchor
            .value()
            .attr("href")
            .map(resolve_redirect)
            .unwrap_or_default();

        let mut record = ArticleRecord::new(title, link);

        // The author/venue line is the next green-colored div before the
        // following article heading.
        if let Some(author_div) = next_matching(h3, &AUTHOR_LINE_SELECTOR) {
            let line = collect_text(&author_div);
            let (authors, source) = parse_author_line(&line);
            record.authors = authors;
            record.source = source;

            if let Some(snippet_div) = next_matching(author_div, &SNIPPET_SELECTOR) {
                record.snippet = collect_text(&snippet_div);
            }
        }

        debug!("Extracted article: {}", record.title);
        records.push(record);
    }

    records
}

/// Strip a leading bracketed marker like `[PDF]` or `[HTML]` from a title.
pub fn clean_title(raw: &str) -> String {
    LEADING_MARKER_RE.replace(raw.trim(), "").trim().to_string()
}

/// Pull the real target out of a Scholar redirect URL.
///
/// Falls back to the raw href when there is no `url` query parameter or the
/// href does not parse.
pub fn resolve_redirect(href: &str) -> String {
    match Url::parse(href) {
        Ok(url) => url
            .query_pairs()
            .find(|(key, _)| key == "url")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_else(|| href.to_string()),
        Err(_) => href.to_string(),
    }
}

/// Split an author/venue line into an author list and a venue name.
///
/// Canonical rule: split on the first `" - "`; authors before it, separated
/// by commas; venue after it, with one trailing `", YYYY"` stripped. Without
/// a separator the whole line is the venue.
pub fn parse_author_line(line: &str) -> (Vec<String>, String) {
    match line.split_once(" - ") {
        Some((authors_part, source_part)) => {
            let authors = authors_part
                .split(',')
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(String::from)
                .collect();
            let source = YEAR_SUFFIX_RE.replace(source_part.trim(), "").trim().to_string();
            (authors, source)
        }
        None => (Vec::new(), line.trim().to_string()),
    }
}

/// Find the next element matching `selector` after `start` in sibling order,
/// descending into siblings, stopping at the next article heading.
fn next_matching<'a>(start: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    for sibling in start.next_siblings() {
        let Some(element) = ElementRef::wrap(sibling) else {
            continue;
        };
        if H3_SELECTOR.matches(&element) && element.select(&TITLE_SELECTOR).next().is_some() {
            return None;
        }
        if selector.matches(&element) {
            return Some(element);
        }
        if let Some(found) = element.select(selector).next() {
            return Some(found);
        }
    }
    None
}

fn collect_text(element: &ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
