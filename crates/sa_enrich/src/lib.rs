use std::collections::HashSet;
use std::time::Duration;

use scraper::Html;
use serde_json::Value;
use tracing::{debug, warn};

use sa_core::{ArticleRecord, Result};
use sa_extract::clean_title;

const CROSSREF_BASE_URL: &str = "https://api.crossref.org";
const MAX_RESULTS: usize = 5;
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Word-overlap below or at this ratio counts as no match.
const SCORE_THRESHOLD: f64 = 0.2;

/// Best-effort bibliographic enrichment against the CrossRef works API.
pub struct CrossrefClient {
    client: reqwest::Client,
    base_url: String,
}

impl CrossrefClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(CROSSREF_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(LOOKUP_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Enrich one record from a CrossRef title search.
    ///
    /// Never blocks the pipeline: a failed or empty lookup, or a best match
    /// under the acceptance threshold, returns the input unchanged.
    pub async fn enrich(&self, record: ArticleRecord) -> ArticleRecord {
        let cleaned = clean_title(&record.title);
        if cleaned.is_empty() {
            return record;
        }

        let items = match self.query_by_title(&cleaned).await {
            Ok(items) => items,
            Err(e) => {
                warn!("CrossRef lookup failed for '{}': {}", cleaned, e);
                return record;
            }
        };

        match best_match(&items, &cleaned) {
            Some(item) => {
                debug!("CrossRef match for '{}'", cleaned);
                merge(record, item)
            }
            None => record,
        }
    }

    async fn query_by_title(&self, title: &str) -> Result<Vec<Value>> {
        let url = format!(
            "{}/works?query.title={}&rows={}",
            self.base_url,
            urlencoding::encode(title),
            MAX_RESULTS
        );
        let body: Value = self.client.get(&url).send().await?.json().await?;
        Ok(body["message"]["items"]
            .as_array()
            .cloned()
            .unwrap_or_default())
    }
}

/// Ratio of query title words found in the candidate title.
fn overlap_score(query_title: &str, candidate_title: &str) -> f64 {
    let query = query_title.to_lowercase();
    let candidate = candidate_title.to_lowercase();
    let query_words: HashSet<&str> = query.split_whitespace().collect();
    let candidate_words: HashSet<&str> = candidate.split_whitespace().collect();
    if query_words.is_empty() {
        return 0.0;
    }
    query_words.intersection(&candidate_words).count() as f64 / query_words.len() as f64
}

/// Pick the candidate whose title best overlaps the query title.
pub fn best_match<'a>(items: &'a [Value], query_title: &str) -> Option<&'a Value> {
    let mut best: Option<&Value> = None;
    let mut best_score = 0.0;

    for item in items {
        let Some(candidate_title) = item["title"][0].as_str() else {
            continue;
        };
        let score = overlap_score(query_title, candidate_title);
        if score > best_score {
            best_score = score;
            best = Some(item);
        }
    }

    if best_score <= SCORE_THRESHOLD {
        return None;
    }
    best
}

/// Merge CrossRef work fields into the record.
pub fn merge(mut record: ArticleRecord, item: &Value) -> ArticleRecord {
    if let Some(doi) = item["DOI"].as_str() {
        record.doi = Some(doi.to_string());
    }

    if let Some(raw) = item["abstract"].as_str() {
        record.snippet = strip_tags(raw);
    }

    let authors = extract_authors(item);
    if !authors.is_empty() {
        record.authors = authors;
    }

    let date = extract_publication_date(item);
    if !date.is_empty() {
        record.publication_date = date;
    }

    if let Some(container) = item["container-title"][0].as_str() {
        record.source = container.to_string();
    }

    record
}

/// Remove HTML/JATS markup and unescape entities from an abstract.
pub fn strip_tags(raw: &str) -> String {
    let fragment = Html::parse_fragment(raw);
    fragment
        .root_element()
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn extract_authors(item: &Value) -> Vec<String> {
    item["author"]
        .as_array()
        .map(|authors| {
            authors
                .iter()
                .filter_map(|a| {
                    let given = a["given"].as_str().unwrap_or("");
                    let family = a["family"].as_str().unwrap_or("");
                    let full = format!("{} {}", given, family).trim().to_string();
                    (!full.is_empty()).then_some(full)
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Normalize the first available CrossRef date to `YYYY-MM-DD`.
///
/// Month and day default to `01` when the work only carries a year.
fn extract_publication_date(item: &Value) -> String {
    for field in ["issued", "published-online", "published-print"] {
        let Some(parts) = item[field]["date-parts"][0].as_array() else {
            continue;
        };
        let Some(year) = parts.first().and_then(Value::as_i64) else {
            continue;
        };
        let month = parts.get(1).and_then(Value::as_i64).unwrap_or(1);
        let day = parts.get(2).and_then(Value::as_i64).unwrap_or(1);
        return format!("{}-{:02}-{:02}", year, month, day);
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_overlap_score() {
        assert_eq!(overlap_score("sleep and cognition", "Sleep and Cognition"), 1.0);
        assert_eq!(overlap_score("one two three four", "one nothing else"), 0.25);
        assert_eq!(overlap_score("", "anything"), 0.0);
    }

    #[test]
    fn test_best_match_rejects_score_at_threshold() {
        // One of five query words overlaps: exactly 0.2, which must not match.
        let items = vec![json!({"title": ["cognition of unrelated candidate work"]})];
        assert!(best_match(&items, "a b c d cognition").is_none());
    }

    #[test]
    fn test_best_match_picks_highest_overlap() {
        let items = vec![
            json!({"title": ["sleep deprivation in mice"]}),
            json!({"title": ["sleep and cognition in adults"]}),
            json!({"title": []}),
        ];
        let best = best_match(&items, "sleep and cognition").unwrap();
        assert_eq!(best["title"][0], "sleep and cognition in adults");
    }

    #[test]
    fn test_date_normalization_year_only() {
        let item = json!({"issued": {"date-parts": [[2023]]}});
        assert_eq!(extract_publication_date(&item), "2023-01-01");
    }

    #[test]
    fn test_date_field_preference_and_padding() {
        let item = json!({
            "published-print": {"date-parts": [[2020, 12, 31]]},
            "published-online": {"date-parts": [[2021, 3]]}
        });
        // issued is absent; published-online wins over published-print.
        assert_eq!(extract_publication_date(&item), "2021-03-01");
    }

    #[test]
    fn test_merge_overwrites_only_present_fields() {
        let mut record = ArticleRecord::new("Sleep and Cognition", "https://example.org/a");
        record.snippet = "original snippet".to_string();
        record.authors = vec!["J. Smith".to_string()];
        record.source = "Journal of Sleep".to_string();

        let item = json!({
            "DOI": "10.1000/sleep.1",
            "issued": {"date-parts": [[2021, 6, 2]]}
        });
        let merged = merge(record, &item);

        assert_eq!(merged.doi.as_deref(), Some("10.1000/sleep.1"));
        assert_eq!(merged.snippet, "original snippet");
        assert_eq!(merged.authors, vec!["J. Smith"]);
        assert_eq!(merged.source, "Journal of Sleep");
        assert_eq!(merged.publication_date, "2021-06-02");
    }

    #[test]
    fn test_merge_takes_abstract_authors_and_venue() {
        let record = ArticleRecord::new("Sleep and Cognition", "https://example.org/a");
        let item = json!({
            "abstract": "<jats:p>We study &amp; report sleep.</jats:p>",
            "author": [
                {"given": "Jane", "family": "Smith"},
                {"family": "Lee"}
            ],
            "container-title": ["Journal of Sleep Research"]
        });
        let merged = merge(record, &item);

        assert_eq!(merged.snippet, "We study & report sleep.");
        assert_eq!(merged.authors, vec!["Jane Smith", "Lee"]);
        assert_eq!(merged.source, "Journal of Sleep Research");
    }

    #[test]
    fn test_strip_tags_unescapes_entities() {
        assert_eq!(strip_tags("<p>a &lt;b&gt; c</p>"), "a <b> c");
        assert_eq!(strip_tags("plain"), "plain");
    }
}
