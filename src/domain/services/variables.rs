#[cfg(test)]
#[path = "variables_test.rs"]
mod tests;

use std::path::Path;

use chrono::Local;
use futures::future;
use futures::future::FutureExt;

use super::placeholders::VariableTable;
use crate::domain::models::Document;
use crate::domain::models::UserInput;

const INPUT_TITLE: &str = "Input your prompt";

/// What a command can see of the document when it is invoked. Captured once,
/// before any placeholder is resolved, so resolvers never observe a document
/// that is being written to.
pub struct CommandContext<'a> {
    pub file_name: String,
    pub title: String,
    pub line: String,
    pub selection: String,
    pub body: String,
    input: &'a (dyn UserInput + Send + Sync),
}

impl<'a> CommandContext<'a> {
    pub fn capture<D: Document + ?Sized>(
        document: &D,
        path: &Path,
        input: &'a (dyn UserInput + Send + Sync),
    ) -> CommandContext<'a> {
        let file_name = path
            .file_name()
            .map(|name| return name.to_string_lossy().to_string())
            .unwrap_or_default();
        let title = path
            .file_stem()
            .map(|stem| return stem.to_string_lossy().to_string())
            .unwrap_or_default();

        return CommandContext {
            file_name,
            title,
            line: document.line(document.cursor().line),
            selection: document.selection(),
            body: document.value(),
            input,
        };
    }

    pub fn variables(&self) -> VariableTable<'a> {
        let mut table = VariableTable::new();
        table.register_value("TITLE", self.title.to_string());
        table.register_value("FILE_NAME", self.file_name.to_string());
        table.register_value("SELECTION", self.selection.to_string());
        table.register_value("LINE", self.line.to_string());
        table.register_value("BODY", self.body.to_string());

        table.register("DATE", || {
            return future::ready(Ok(Local::now().format("%x").to_string())).boxed();
        });
        table.register("TIME", || {
            return future::ready(Ok(Local::now().format("%X").to_string())).boxed();
        });

        let input = self.input;
        table.register("INPUT", move || {
            return input.prompt_for_text(INPUT_TITLE);
        });

        return table;
    }
}
