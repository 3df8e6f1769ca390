#[cfg(test)]
#[path = "text_test.rs"]
mod tests;

use std::path::Path;

use anyhow::Result;
use tokio::fs;

use crate::domain::models::Document;
use crate::domain::models::Position;
use crate::domain::models::Selection;

fn byte_index(line: &str, ch: usize) -> usize {
    return line
        .char_indices()
        .nth(ch)
        .map(|(idx, _)| return idx)
        .unwrap_or(line.len());
}

/// Line-based, in-memory document. Positions past the end of a line or of the
/// document are clamped to the nearest valid location.
#[derive(Clone, Debug)]
pub struct TextDocument {
    lines: Vec<String>,
    cursor: Position,
    selections: Vec<Selection>,
}

impl TextDocument {
    pub fn new(text: &str) -> TextDocument {
        return TextDocument {
            lines: text.split('\n').map(|line| return line.to_string()).collect(),
            cursor: Position::default(),
            selections: vec![],
        };
    }

    #[allow(clippy::implicit_return)]
    pub async fn open(path: &Path) -> Result<TextDocument> {
        let text = fs::read_to_string(path).await?;
        return Ok(TextDocument::new(&text));
    }

    #[allow(clippy::implicit_return)]
    pub async fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.value()).await?;
        return Ok(());
    }

    pub fn line_count(&self) -> usize {
        return self.lines.len();
    }

    /// Replaces the selections and moves the cursor to the head of the last
    /// one, the way an editor does after a drag. Out of range anchors and
    /// heads are clamped like the cursor.
    pub fn set_selections(&mut self, selections: Vec<Selection>) {
        let selections = selections
            .into_iter()
            .map(|selection| {
                return Selection::new(self.clamp(selection.anchor), self.clamp(selection.head));
            })
            .collect::<Vec<Selection>>();

        if let Some(last) = selections.last() {
            self.cursor = last.head;
        }
        self.selections = selections;
    }

    fn line_len(&self, line: usize) -> usize {
        return self
            .lines
            .get(line)
            .map(|text| return text.chars().count())
            .unwrap_or(0);
    }

    /// A line past the last one maps to the end of the document.
    fn clamp(&self, pos: Position) -> Position {
        let last = self.lines.len().saturating_sub(1);
        if pos.line > last {
            return Position::new(last, self.line_len(last));
        }

        return Position {
            line: pos.line,
            ch: pos.ch.min(self.line_len(pos.line)),
        };
    }

    fn text_range(&self, start: Position, end: Position) -> String {
        let start = self.clamp(start);
        let end = self.clamp(end);

        if start.line == end.line {
            return self.lines[start.line]
                .chars()
                .skip(start.ch)
                .take(end.ch - start.ch)
                .collect();
        }

        let mut parts: Vec<String> = vec![self.lines[start.line].chars().skip(start.ch).collect()];
        for line in start.line + 1..end.line {
            parts.push(self.lines[line].to_string());
        }
        parts.push(self.lines[end.line].chars().take(end.ch).collect());

        return parts.join("\n");
    }
}

impl Document for TextDocument {
    fn cursor(&self) -> Position {
        return self.cursor;
    }

    fn line(&self, n: usize) -> String {
        return self.lines.get(n).cloned().unwrap_or_default();
    }

    fn selection(&self) -> String {
        if let Some(primary) = self.selections.last() {
            return self.text_range(primary.start(), primary.end());
        }

        return "".to_string();
    }

    fn value(&self) -> String {
        return self.lines.join("\n");
    }

    fn selections(&self) -> Vec<Selection> {
        if self.selections.is_empty() {
            return vec![Selection::new(self.cursor, self.cursor)];
        }

        return self.selections.clone();
    }

    fn set_cursor(&mut self, pos: Position) {
        self.cursor = self.clamp(pos);
        self.selections.clear();
    }

    fn insert(&mut self, pos: Position, text: &str) {
        let pos = self.clamp(pos);
        let mut segments = text.split('\n');

        let current = &mut self.lines[pos.line];
        let split_at = byte_index(current, pos.ch);
        let tail = current.split_off(split_at);
        current.push_str(segments.next().unwrap_or_default());

        let mut row = pos.line;
        for segment in segments {
            row += 1;
            self.lines.insert(row, segment.to_string());
        }
        self.lines[row].push_str(&tail);
    }
}
