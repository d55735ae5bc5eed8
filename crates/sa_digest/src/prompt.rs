use sa_core::ArticleRecord;

pub const SYSTEM_PROMPT: &str = "You are a helpful and knowledgeable scholarly assistant.";

/// Oversized snippets are cut to this many characters before entering a
/// request, to stay inside the model's input limits.
pub const SNIPPET_BUDGET: usize = 1500;

const BATCH_INSTRUCTIONS: &str = "\
I will provide you with several scholarly articles, each containing a title, \
authors, source, abstract or snippet, and possibly a DOI. Your tasks are as follows:\n\n\
1. **Categorization:** Organize the articles into broad, logical categories. Give each \
category a title and open it with a summary that synthesizes the main findings, common \
themes, differences, and important nuances across its articles.\n\n\
2. **Individual Paper Summaries:** Provide a concise, 3-line summary for each paper.\n\n\
3. **Citations:** When referring to a specific article, cite it as (Article X), where X is \
the article's number in the provided list. Do not repeat the article title outside the \
numbered list.\n\n\
4. **Conclusions:** Draw conclusions about overarching trends, gaps, and opportunities \
across the papers.\n\n\
5. **Suggestions for Further Reading:** Recommend specific papers for closer examination \
and explain why.";

/// Build the prompt for one batch of articles.
///
/// `start_index` keeps citation numbers aligned with the final reference
/// list when a run spans multiple batches.
pub fn build_batch_prompt(articles: &[ArticleRecord], start_index: usize) -> String {
    let blocks: Vec<String> = articles
        .iter()
        .enumerate()
        .map(|(i, article)| format_article_block(start_index + i, article))
        .collect();

    format!(
        "{}\n\n### Provided Articles:\n\n{}\n\n### Please provide the following:\n\
1. Categorize the articles.\n\
2. Provide a comprehensive summary for each category.\n\
3. Include 3-line summaries for each individual paper.\n\
4. Conclude with trends observed across the papers.\n\
5. Suggest specific papers to read closely and explain why they are relevant.\n",
        BATCH_INSTRUCTIONS,
        blocks.join("\n\n")
    )
}

/// Build the second-level prompt that reduces batch summaries into one digest.
pub fn build_reduce_prompt(summaries: &[String]) -> String {
    let parts: Vec<String> = summaries
        .iter()
        .enumerate()
        .map(|(i, summary)| format!("### Batch {} Summary:\n\n{}", i + 1, summary))
        .collect();

    format!(
        "The following are summaries of separate batches of scholarly articles from one \
alert run. Merge them into a single coherent digest: keep the category structure, keep \
all (Article X) citations exactly as written, remove redundancy, and finish with one \
combined trends-and-recommendations section.\n\n{}",
        parts.join("\n\n")
    )
}

fn format_article_block(index: usize, article: &ArticleRecord) -> String {
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

    let mut block = format!(
        "**Article {}:**\n**Title:** {}\n**Authors:** {}\n**Source:** {}\n",
        index, article.title, authors, source
    );
    if let Some(doi) = &article.doi {
        block.push_str(&format!("**DOI:** {}\n", doi));
    }
    block.push_str(&format!(
        "**Abstract/Snippet:** {}",
        truncate_chars(&article.snippet, SNIPPET_BUDGET)
    ));
    block
}

fn truncate_chars(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }
    text.chars().take(budget).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str) -> ArticleRecord {
        let mut record = ArticleRecord::new(title, "https://example.org/a");
        record.authors = vec!["J. Smith".to_string(), "K. Lee".to_string()];
        record.source = "Journal of Sleep".to_string();
        record.snippet = "Some snippet.".to_string();
        record
    }

    #[test]
    fn test_batch_prompt_numbers_from_start_index() {
        let articles = vec![article("First"), article("Second")];
        let prompt = build_batch_prompt(&articles, 31);
        assert!(prompt.contains("**Article 31:**"));
        assert!(prompt.contains("**Article 32:**"));
        assert!(!prompt.contains("**Article 1:**"));
    }

    #[test]
    fn test_article_block_includes_doi_only_when_present() {
        let mut with_doi = article("A");
        with_doi.doi = Some("10.1000/x".to_string());
        assert!(format_article_block(1, &with_doi).contains("**DOI:** 10.1000/x"));
        assert!(!format_article_block(1, &article("B")).contains("**DOI:**"));
    }

    #[test]
    fn test_snippet_truncated_to_budget() {
        let mut record = article("A");
        record.snippet = "x".repeat(SNIPPET_BUDGET + 100);
        let block = format_article_block(1, &record);
        let snippet = block.split("**Abstract/Snippet:** ").nth(1).unwrap();
        assert_eq!(snippet.chars().count(), SNIPPET_BUDGET);
    }

    #[test]
    fn test_truncate_is_char_boundary_safe() {
        let text = "ééééé";
        assert_eq!(truncate_chars(text, 3), "ééé");
    }

    #[test]
    fn test_reduce_prompt_labels_batches() {
        let prompt = build_reduce_prompt(&["one".to_string(), "two".to_string()]);
        assert!(prompt.contains("### Batch 1 Summary:"));
        assert!(prompt.contains("### Batch 2 Summary:"));
    }
}
