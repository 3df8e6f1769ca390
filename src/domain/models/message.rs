#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;

/// A single chat message. Within a command these are templates whose `content`
/// still holds placeholders; once resolved they are sent as-is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Message {
    pub fn new(role: &str, content: &str) -> Message {
        return Message {
            role: role.to_string(),
            content: content.to_string(),
            name: None,
        };
    }

    pub fn system(content: &str) -> Message {
        return Message::new("system", content);
    }

    pub fn user(content: &str) -> Message {
        return Message::new("user", content);
    }

    /// Returns a copy of this message with its content swapped out, keeping the
    /// role and name.
    pub fn with_content(&self, content: String) -> Message {
        return Message {
            role: self.role.to_string(),
            content,
            name: self.name.clone(),
        };
    }
}
