use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use sa_core::{ArticleRecord, Result};

/// Write the digest plus a reference list to a timestamp-qualified Markdown
/// file under `out_dir`, returning the path.
///
/// The timestamp in the file name keeps successive runs from overwriting
/// each other.
pub async fn write_report(
    digest: &str,
    articles: &[ArticleRecord],
    out_dir: &Path,
    prefix: &str,
) -> Result<PathBuf> {
    tokio::fs::create_dir_all(out_dir).await?;

    let filename = format!("{}summary_{}.md", prefix, Local::now().format("%Y%m%d_%H%M%S"));
    let path = out_dir.join(filename);

    tokio::fs::write(&path, render(digest, articles)).await?;
    info!("Report written to {}", path.display());
    Ok(path)
}

fn render(digest: &str, articles: &[ArticleRecord]) -> String {
    let mut body = String::from("# Summary of Scholar Alerts\n\n");
    body.push_str(digest);
    body.push_str("\n\n## References\n");

    for (i, article) in articles.iter().enumerate() {
        body.push_str(&format!("- {}\n", citation(i + 1, article)));
    }
    body
}

fn citation(index: usize, article: &ArticleRecord) -> String {
    let authors = if article.authors.is_empty() {
        "Unknown authors".to_string()
    } else {
        article.authors.join(", ")
    };
    let source = if article.source.is_empty() {
        "Unknown source"
    } else {
        &article.source
    };

    let mut entry = format!(
        "**Article {}**: {}. {}. _{}_.",
        index, article.title, authors, source
    );
    if let Some(doi) = &article.doi {
        entry.push_str(&format!(" DOI: {}.", doi));
    }
    if !article.link.is_empty() {
        entry.push_str(&format!(" [Link]({}).", article.link));
    }
    entry
}
