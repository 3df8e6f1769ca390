use anyhow::Result;
use async_trait::async_trait;

/// Asks the person running a command for free-form text.
#[async_trait]
pub trait UserInput {
    /// Resolves once the user submits. Implementations return an error when the
    /// prompt is dismissed, which cancels the command before anything is sent.
    async fn prompt_for_text(&self, title: &str) -> Result<String>;
}
