use anyhow::anyhow;
use anyhow::Result;
use async_trait::async_trait;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;
use tokio::task;

use crate::domain::models::UserInput;

/// Prompts on the controlling terminal.
#[derive(Default)]
pub struct TerminalInput {}

#[async_trait]
impl UserInput for TerminalInput {
    #[allow(clippy::implicit_return)]
    async fn prompt_for_text(&self, title: &str) -> Result<String> {
        let title = title.to_string();

        // Blocking method
        let res = task::spawn_blocking(move || {
            return Input::<String>::with_theme(&ColorfulTheme::default())
                .with_prompt(title)
                .allow_empty(true)
                .interact_text();
        })
        .await?;

        return res.map_err(|err| return anyhow!("Prompt was dismissed: {err}"));
    }
}
