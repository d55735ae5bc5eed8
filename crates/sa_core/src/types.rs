use serde::{Deserialize, Serialize};

/// One article scraped from a Scholar alert email.
///
/// `link` is the canonical article URL and the deduplication key; records
/// without one never reach the store. `added_at` is stamped exactly once at
/// insertion time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub publication_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<String>,
}

impl ArticleRecord {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            snippet: String::new(),
            source: String::new(),
            authors: Vec::new(),
            publication_date: String::new(),
            doi: None,
            added_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_skipped_when_absent() {
        let record = ArticleRecord::new("Sleep and Cognition", "https://example.org/a");
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("doi"));
        assert!(!json.contains("added_at"));
    }

    #[test]
    fn test_deserializes_minimal_document() {
        let record: ArticleRecord =
            serde_json::from_str(r#"{"title":"T","link":"https://example.org/a"}"#).unwrap();
        assert!(record.authors.is_empty());
        assert!(record.publication_date.is_empty());
        assert!(record.doi.is_none());
    }
}
