use async_trait::async_trait;
use crate::Result;

#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Returns the name of the backing model
    fn name(&self) -> &str;

    /// Send one system instruction plus user prompt and return the generated text
    async fn complete(&self, system: &str, prompt: &str) -> Result<String>;
}
