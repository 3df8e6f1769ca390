#[cfg(test)]
#[path = "command_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::Message;

/// A named prompt recipe. Message contents are templates resolved against the
/// document right before the command runs. `format` only understands
/// `{{RESPONSE}}` and `{{NEWLINE}}`; any other slot in it is written as is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Command {
    fn builtin(id: &str, icon: &str, name: &str, messages: Vec<Message>) -> Command {
        return Command {
            id: id.to_string(),
            name: name.to_string(),
            icon: Some(icon.to_string()),
            messages,
            format: None,
        };
    }

    /// Commands shipped with Scrivener. Custom commands sharing an id replace
    /// these.
    pub fn builtins() -> Vec<Command> {
        let mut continue_writing = Command::builtin(
            "continue-writing",
            "edit-3",
            "Continue writing for the current selection or line",
            vec![
                Message::system("The user is writing a document named {{FILE_NAME}}. Continue the user's content. Respond in the user's language. Write only the continuation and nothing else."),
                Message::user("{{SELECTION|LINE}}"),
            ],
        );
        continue_writing.format = Some("{{RESPONSE}}".to_string());

        return vec![
            Command::builtin(
                "ask",
                "rocket",
                "Ask AI anything",
                vec![
                    Message::system("You are a helpful assistant"),
                    Message::user("{{INPUT}}"),
                ],
            ),
            Command::builtin(
                "ask-selection",
                "rocket",
                "Ask AI based on selection",
                vec![
                    Message::system("You are a helpful assistant"),
                    Message::user("{{INPUT}}:\n \"{{SELECTION|LINE}}\""),
                ],
            ),
            continue_writing,
            Command::builtin(
                "outline",
                "list",
                "Generate outline based on selection or title",
                vec![
                    Message::system("Help write a brief outline for a document, formatted in markdown, without a title. Respond in the user's language."),
                    Message::user("{{SELECTION|TITLE}}"),
                ],
            ),
            Command::builtin(
                "summary",
                "book",
                "Generate summary based on selection or full document",
                vec![
                    Message::system("Help write a brief summary for a document, formatted in markdown, without a title. Respond in the user's language."),
                    Message::user("{{SELECTION|BODY}}"),
                ],
            ),
        ];
    }
}
