#[cfg(test)]
#[path = "commands_test.rs"]
mod tests;

use crate::domain::models::Command;

/// Commands available to the user, plus a notice for every custom command
/// that had to be dropped.
#[derive(Debug, Default)]
pub struct CommandSet {
    pub commands: Vec<Command>,
    pub notices: Vec<String>,
}

impl CommandSet {
    pub fn find(&self, id: &str) -> Option<&Command> {
        return self.commands.iter().find(|command| return command.id == id);
    }
}

/// Merges commands keyed by id. An override replaces the command with the same
/// id in place; unknown ids are appended in the order they appear. When ids
/// repeat, the later definition wins.
pub fn merge(builtins: Vec<Command>, overrides: Vec<Command>) -> Vec<Command> {
    let mut merged: Vec<Command> = vec![];

    for command in builtins.into_iter().chain(overrides) {
        if let Some(existing) = merged.iter_mut().find(|e| return e.id == command.id) {
            *existing = command;
        } else {
            merged.push(command);
        }
    }

    return merged;
}

/// Parses the user's JSON command list. Entries that are not valid commands
/// are skipped with a notice; a document that is not a JSON array yields no
/// commands and a single notice.
pub fn parse_custom(json: &str) -> (Vec<Command>, Vec<String>) {
    if json.trim().is_empty() {
        return (vec![], vec![]);
    }

    let entries = match serde_json::from_str::<Vec<serde_json::Value>>(json) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(error = ?err, "Custom commands are not a JSON list");
            return (
                vec![],
                vec![format!("Custom commands could not be loaded: {err}")],
            );
        }
    };

    let mut commands: Vec<Command> = vec![];
    let mut notices: Vec<String> = vec![];

    for (idx, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<Command>(entry) {
            Ok(command) => commands.push(command),
            Err(err) => {
                tracing::warn!(index = idx, error = ?err, "Dropping invalid custom command");
                notices.push(format!("Custom command #{} was ignored: {err}", idx + 1));
            }
        }
    }

    return (commands, notices);
}

pub struct CommandService {}

impl CommandService {
    /// Built-in commands merged with the user's custom command JSON.
    pub fn load(custom_json: &str) -> CommandSet {
        let (custom, notices) = parse_custom(custom_json);
        let commands = merge(Command::builtins(), custom);

        tracing::debug!(
            count = commands.len(),
            rejected = notices.len(),
            "Loaded commands"
        );

        return CommandSet { commands, notices };
    }
}
