#[cfg(test)]
#[path = "document_test.rs"]
mod tests;

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use anyhow::Error;
use anyhow::Result;

/// Zero-indexed location in a document. `ch` counts characters, not bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub ch: usize,
}

impl Position {
    pub fn new(line: usize, ch: usize) -> Position {
        return Position { line, ch };
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        return write!(f, "{}:{}", self.line, self.ch);
    }
}

impl FromStr for Position {
    type Err = Error;

    fn from_str(text: &str) -> Result<Position> {
        let (line, ch) = text
            .trim()
            .split_once(':')
            .ok_or_else(|| return anyhow!("Position '{text}' must be formatted as LINE:COLUMN"))?;

        return Ok(Position {
            line: line.trim().parse::<usize>()?,
            ch: ch.trim().parse::<usize>()?,
        });
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub anchor: Position,
    pub head: Position,
}

impl Selection {
    pub fn new(anchor: Position, head: Position) -> Selection {
        return Selection { anchor, head };
    }

    pub fn start(&self) -> Position {
        return self.anchor.min(self.head);
    }

    pub fn end(&self) -> Position {
        return self.anchor.max(self.head);
    }

    pub fn is_empty(&self) -> bool {
        return self.anchor == self.head;
    }
}

impl FromStr for Selection {
    type Err = Error;

    fn from_str(text: &str) -> Result<Selection> {
        let (anchor, head) = text.trim().split_once('-').ok_or_else(|| {
            return anyhow!("Selection '{text}' must be formatted as LINE:COLUMN-LINE:COLUMN");
        })?;

        return Ok(Selection {
            anchor: anchor.parse::<Position>()?,
            head: head.parse::<Position>()?,
        });
    }
}

/// Host document the commands read from and stream answers into. Mutations
/// happen on a single logical thread, one insertion at a time.
pub trait Document {
    fn cursor(&self) -> Position;

    /// Text of line `n`, or an empty string past the end of the document.
    fn line(&self, n: usize) -> String;

    /// Text covered by the primary selection, empty when nothing is selected.
    fn selection(&self) -> String;

    fn value(&self) -> String;

    fn selections(&self) -> Vec<Selection>;

    fn set_cursor(&mut self, pos: Position);

    /// Atomically inserts `text` at `pos`. `text` may contain line breaks.
    fn insert(&mut self, pos: Position, text: &str);
}
