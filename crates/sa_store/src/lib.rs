use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info};

use sa_core::{ArticleRecord, Error, Result};

const DEFAULT_STORE_PATH: &str = "data/articles.json";

/// Append-only, link-deduplicated article store backed by one JSON document.
///
/// The whole collection is rewritten on every successful insert batch via a
/// temp file and atomic rename, so a failed write never leaves a partial
/// document at the store path. Single-process use is assumed: two concurrent
/// writers would load the same base set and the later save would win.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_path() -> PathBuf {
        PathBuf::from(DEFAULT_STORE_PATH)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted collection.
    ///
    /// A missing file, unreadable content, or a non-array document all read
    /// as an empty collection rather than an error.
    pub async fn load(&self) -> Vec<ArticleRecord> {
        let Ok(raw) = tokio::fs::read_to_string(&self.path).await else {
            return Vec::new();
        };
        serde_json::from_str(&raw).unwrap_or_default()
    }

    /// Insert candidates not already present, keyed by `link`.
    ///
    /// Candidates with an empty link are dropped; the first occurrence wins
    /// within a batch. Survivors are stamped with an insertion timestamp and
    /// the merged collection is written back atomically. Returns exactly the
    /// newly inserted records.
    pub async fn store(&self, candidates: Vec<ArticleRecord>) -> Result<Vec<ArticleRecord>> {
        let existing = self.load().await;
        let mut seen: HashSet<String> = existing.iter().map(|a| a.link.clone()).collect();

        let stamp = Utc::now().to_rfc3339();
        let mut added = Vec::new();
        for mut candidate in candidates {
            if candidate.link.is_empty() || seen.contains(&candidate.link) {
                debug!("Skipping duplicate or link-less candidate: {}", candidate.title);
                continue;
            }
            seen.insert(candidate.link.clone());
            candidate.added_at = Some(stamp.clone());
            added.push(candidate);
        }

        if added.is_empty() {
            return Ok(added);
        }

        let mut merged = existing;
        merged.extend(added.iter().cloned());
        self.save(&merged).await?;

        info!("Stored {} new articles ({} total)", added.len(), merged.len());
        Ok(added)
    }

    /// Write the full collection to a temp file and rename it into place.
    async fn save(&self, articles: &[ArticleRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(articles)?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json).await?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| Error::Storage(format!("Could not replace store file: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, link: &str) -> ArticleRecord {
        ArticleRecord::new(title, link)
    }

    fn store_in(dir: &tempfile::TempDir) -> FileStore {
        FileStore::new(dir.path().join("articles.json"))
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store_in(&dir).load().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_invalid_json_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "{not json").unwrap();
        assert!(store.load().await.is_empty());

        std::fs::write(store.path(), r#"{"an":"object"}"#).unwrap();
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_store_stamps_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let added = store
            .store(vec![record("A", "https://example.org/a")])
            .await
            .unwrap();
        assert_eq!(added.len(), 1);
        assert!(added[0].added_at.is_some());

        let loaded = store.load().await;
        assert_eq!(loaded, added);
    }

    #[tokio::test]
    async fn test_store_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let candidates = vec![
            record("A", "https://example.org/a"),
            record("B", "https://example.org/b"),
        ];

        let first = store.store(candidates.clone()).await.unwrap();
        assert_eq!(first.len(), 2);

        let second = store.store(candidates).await.unwrap();
        assert!(second.is_empty());
        assert_eq!(store.load().await.len(), 2);
    }

    #[tokio::test]
    async fn test_dedup_by_link_within_batch() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let added = store
            .store(vec![
                record("A", "https://example.org/a"),
                record("A again", "https://example.org/a"),
            ])
            .await
            .unwrap();
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].title, "A");
    }

    #[tokio::test]
    async fn test_link_less_records_never_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let added = store.store(vec![record("No link", "")]).await.unwrap();
        assert!(added.is_empty());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_existing_records_survive_new_batch() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .store(vec![record("A", "https://example.org/a")])
            .await
            .unwrap();
        store
            .store(vec![record("B", "https://example.org/b")])
            .await
            .unwrap();

        let loaded = store.load().await;
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].title, "A");
        assert_eq!(loaded[1].title, "B");
    }
}
