use std::sync::Arc;

use tracing::{info, warn};

use sa_core::{ArticleRecord, ChatModel};

use crate::prompt::{build_batch_prompt, build_reduce_prompt, SYSTEM_PROMPT};

/// Articles per text-generation request.
pub const BATCH_SIZE: usize = 30;

/// Stands in for a batch whose summarization request was rejected.
pub const FALLBACK_SUMMARY: &str =
    "A summary could not be generated for this batch of articles.";

/// Turns article records into one prose digest.
///
/// Records are summarized in batches of [`BATCH_SIZE`]; with more than one
/// batch the per-batch summaries go through a second reduction request.
/// Summarization failures are never fatal: a rejected batch gets
/// [`FALLBACK_SUMMARY`] and a failed reduction falls back to concatenating
/// the batch summaries.
pub struct DigestGenerator {
    model: Arc<dyn ChatModel>,
}

impl DigestGenerator {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    pub async fn generate(&self, articles: &[ArticleRecord]) -> String {
        if articles.is_empty() {
            return String::new();
        }

        let mut batch_summaries = Vec::new();
        for (i, batch) in articles.chunks(BATCH_SIZE).enumerate() {
            info!(
                "Summarizing batch {} ({} articles) with {}",
                i + 1,
                batch.len(),
                self.model.name()
            );
            let prompt = build_batch_prompt(batch, i * BATCH_SIZE + 1);
            let summary = match self.model.complete(SYSTEM_PROMPT, &prompt).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("Batch {} summarization failed: {}", i + 1, e);
                    FALLBACK_SUMMARY.to_string()
                }
            };
            batch_summaries.push(summary);
        }

        if batch_summaries.len() == 1 {
            return batch_summaries.remove(0);
        }

        let reduce_prompt = build_reduce_prompt(&batch_summaries);
        match self.model.complete(SYSTEM_PROMPT, &reduce_prompt).await {
            Ok(digest) => digest,
            Err(e) => {
                warn!("Digest reduction failed: {}", e);
                batch_summaries.join("\n\n")
            }
        }
    }
}
