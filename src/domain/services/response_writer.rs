#[cfg(test)]
#[path = "response_writer_test.rs"]
mod tests;

use super::placeholders::tokenize;
use super::placeholders::Token;
use crate::domain::models::Document;
use crate::domain::models::Position;

const RESPONSE: &str = "RESPONSE";
const NEWLINE: &str = "NEWLINE";

/// Inserts `text` at `cursor` and returns the position right after it. Line
/// breaks are inserted one at a time so the cursor stays correct however the
/// text was chunked.
pub fn write_text<D: Document + ?Sized>(document: &mut D, cursor: Position, text: &str) -> Position {
    let mut line = cursor.line;
    let mut ch = cursor.ch;
    let mut segments = text.split('\n').peekable();

    while let Some(segment) = segments.next() {
        if !segment.is_empty() {
            document.insert(Position::new(line, ch), segment);
            ch += segment.chars().count();
        }

        if segments.peek().is_some() {
            document.insert(Position::new(line, ch), "\n");
            line += 1;
            ch = 0;
        }
    }

    let next = Position::new(line, ch);
    document.set_cursor(next);

    return next;
}

/// Streams a response into a document, carrying the insertion cursor across
/// chunks.
pub struct ResponseWriter<'a, D: Document + ?Sized> {
    document: &'a mut D,
    cursor: Position,
}

impl<'a, D: Document + ?Sized> ResponseWriter<'a, D> {
    pub fn new(document: &'a mut D, cursor: Position) -> ResponseWriter<'a, D> {
        return ResponseWriter { document, cursor };
    }

    pub fn cursor(&self) -> Position {
        return self.cursor;
    }

    pub fn write(&mut self, text: &str) -> Position {
        self.cursor = write_text(&mut *self.document, self.cursor, text);
        return self.cursor;
    }

    /// Breaks the line only when it has content, so answers never start with
    /// a double blank line. The break goes after the line's content, not at
    /// the cursor.
    fn ensure_empty_line(&mut self, cursor: Position) -> Position {
        let line = self.document.line(cursor.line);
        if line.is_empty() {
            return cursor;
        }

        let end = Position::new(cursor.line, line.chars().count());
        return write_text(&mut *self.document, end, "\n");
    }

    /// Lays out the literal parts of a response format around the current
    /// cursor and moves the writer to where the streamed answer belongs.
    /// Literals following `{{RESPONSE}}` end up after the answer.
    pub fn prepare_format(&mut self, format: &str) -> Position {
        let mut cursor = self.cursor;
        let mut response: Option<Position> = None;

        for token in tokenize(format) {
            match token {
                Token::Text(text) => {
                    cursor = write_text(&mut *self.document, cursor, &text);
                }
                Token::Variable(variable) if variable.is(NEWLINE) => {
                    cursor = self.ensure_empty_line(cursor);
                }
                Token::Variable(variable) if variable.is(RESPONSE) => {
                    response = Some(cursor);
                }
                Token::Variable(variable) => {
                    cursor = write_text(&mut *self.document, cursor, &variable.raw);
                }
            }
        }

        self.cursor = response.unwrap_or(cursor);
        self.document.set_cursor(self.cursor);

        return self.cursor;
    }
}
