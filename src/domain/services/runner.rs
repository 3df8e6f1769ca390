#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;

use std::path::Path;

use anyhow::Result;

use super::placeholders::resolve;
use super::response_writer::ResponseWriter;
use super::variables::CommandContext;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Command;
use crate::domain::models::Document;
use crate::domain::models::Message;
use crate::domain::models::Position;
use crate::domain::models::StreamClientBox;
use crate::domain::models::StreamHandler;
use crate::domain::models::StreamRequest;
use crate::domain::models::UserInput;

#[derive(Clone, Debug, Default)]
pub struct RunnerSettings {
    pub endpoint: String,
    pub token: String,
    pub organization: Option<String>,
    pub model: String,
    pub response_format: String,
}

impl RunnerSettings {
    pub fn from_config() -> RunnerSettings {
        let organization = Config::get(ConfigKey::OpenAiOrganization);

        return RunnerSettings {
            endpoint: Config::get(ConfigKey::OpenAiURL),
            token: Config::get(ConfigKey::OpenAiToken),
            organization: if organization.is_empty() {
                None
            } else {
                Some(organization)
            },
            model: Config::get(ConfigKey::Model),
            response_format: Config::get(ConfigKey::ResponseFormat),
        };
    }
}

/// Outcome of a command run. Stream errors do not fail the run, they are
/// collected here so the caller can surface them.
#[derive(Debug, Default)]
pub struct RunReport {
    pub response: String,
    pub errors: Vec<String>,
    pub cursor: Position,
}

struct DocumentSink<'a, D: Document + ?Sized> {
    writer: ResponseWriter<'a, D>,
    report: RunReport,
}

impl<'a, D: Document + ?Sized> StreamHandler for DocumentSink<'a, D> {
    fn on_message(&mut self, text: &str) {
        self.writer.write(text);
        self.report.response.push_str(text);
    }

    fn on_connecting(&mut self) {
        tracing::debug!("Connecting to completion endpoint");
    }

    fn on_start(&mut self) {
        tracing::debug!(cursor = %self.writer.cursor(), "Streaming response");
    }

    fn on_end(&mut self) {
        tracing::debug!(
            length = self.report.response.len(),
            "Response stream ended"
        );
    }

    fn on_error(&mut self, message: &str) {
        tracing::error!(error = message, "Response stream reported an error");
        self.report.errors.push(message.to_string());
    }
}

/// Runs commands against a document: resolves the command's templates,
/// streams the completion and writes it where the user was working.
pub struct CommandRunner {
    client: StreamClientBox,
    settings: RunnerSettings,
}

impl CommandRunner {
    pub fn new(client: StreamClientBox, settings: RunnerSettings) -> CommandRunner {
        return CommandRunner { client, settings };
    }

    /// The end of the last selection, which is the cursor when nothing is
    /// selected.
    pub fn write_target<D: Document + ?Sized>(document: &D) -> Position {
        return document
            .selections()
            .last()
            .map(|selection| return selection.end())
            .unwrap_or_else(|| return document.cursor());
    }

    #[allow(clippy::implicit_return)]
    pub async fn resolve_messages(
        &self,
        command: &Command,
        context: &CommandContext<'_>,
    ) -> Result<Vec<Message>> {
        let variables = context.variables();
        let mut messages: Vec<Message> = vec![];

        for template in &command.messages {
            let content = resolve(&template.content, &variables).await?;
            messages.push(template.with_content(content));
        }

        return Ok(messages);
    }

    /// Resolves every template, including interactive prompts, before the
    /// document is touched or a request is made.
    #[allow(clippy::implicit_return)]
    pub async fn run<D: Document + ?Sized>(
        &mut self,
        command: &Command,
        document: &mut D,
        path: &Path,
        input: &(dyn UserInput + Send + Sync),
    ) -> Result<RunReport> {
        let context = CommandContext::capture(&*document, path, input);
        let messages = self.resolve_messages(command, &context).await?;
        tracing::debug!(command = %command.id, messages = ?messages, "Resolved command");

        let format = command
            .format
            .clone()
            .unwrap_or_else(|| return self.settings.response_format.to_string());

        let target = CommandRunner::write_target(&*document);
        let mut writer = ResponseWriter::new(document, target);
        let response_cursor = writer.prepare_format(&format);
        tracing::debug!(target = %target, response = %response_cursor, "Prepared response format");

        let mut session = self.client.request(StreamRequest {
            endpoint: self.settings.endpoint.to_string(),
            token: self.settings.token.to_string(),
            organization: self.settings.organization.clone(),
            model: self.settings.model.to_string(),
            messages,
        });

        let mut sink = DocumentSink {
            writer,
            report: RunReport::default(),
        };
        session.dispatch(&mut sink).await;

        if session.is_cancelled() {
            tracing::debug!("Stream session was aborted before it finished");
        }
        tracing::debug!(status = %self.client.status(), errors = sink.report.errors.len(), "Stream session finished");

        sink.report.cursor = sink.writer.cursor();
        return Ok(sink.report);
    }
}
