use super::write_text;
use super::ResponseWriter;
use crate::domain::models::Document;
use crate::domain::models::Position;
use crate::domain::models::Selection;
use crate::infrastructure::documents::TextDocument;

/// Wraps a `TextDocument` and records every insertion.
struct RecordingDocument {
    inner: TextDocument,
    inserts: Vec<(Position, String)>,
}

impl RecordingDocument {
    fn new(text: &str) -> RecordingDocument {
        return RecordingDocument {
            inner: TextDocument::new(text),
            inserts: vec![],
        };
    }
}

impl Document for RecordingDocument {
    fn cursor(&self) -> Position {
        return self.inner.cursor();
    }

    fn line(&self, n: usize) -> String {
        return self.inner.line(n);
    }

    fn selection(&self) -> String {
        return self.inner.selection();
    }

    fn value(&self) -> String {
        return self.inner.value();
    }

    fn selections(&self) -> Vec<Selection> {
        return self.inner.selections();
    }

    fn set_cursor(&mut self, pos: Position) {
        self.inner.set_cursor(pos);
    }

    fn insert(&mut self, pos: Position, text: &str) {
        self.inserts.push((pos, text.to_string()));
        self.inner.insert(pos, text);
    }
}

#[test]
fn it_writes_line_breaks_as_separate_insertions() {
    let mut document = RecordingDocument::new("x\ny\nzzz");
    let start = Position::new(2, 3);

    let next = write_text(&mut document, start, "a\nb");

    assert_eq!(next, Position::new(start.line + 1, 1));
    assert_eq!(
        document.inserts,
        vec![
            (Position::new(2, 3), "a".to_string()),
            (Position::new(2, 4), "\n".to_string()),
            (Position::new(3, 0), "b".to_string()),
        ]
    );
    assert_eq!(document.value(), "x\ny\nzzza\nb");
    assert_eq!(document.cursor(), next);
}

#[test]
fn it_is_invariant_to_chunk_boundaries() {
    let start = Position::new(0, 7);

    let mut whole = TextDocument::new("Intro: ");
    let mut whole_writer = ResponseWriter::new(&mut whole, start);
    let whole_cursor = whole_writer.write("hello world");

    let mut chunked = TextDocument::new("Intro: ");
    let mut chunked_writer = ResponseWriter::new(&mut chunked, start);
    chunked_writer.write("hello ");
    let chunked_cursor = chunked_writer.write("world");

    assert_eq!(whole_cursor, chunked_cursor);
    assert_eq!(whole_cursor, Position::new(0, 18));
    assert_eq!(whole.value(), chunked.value());
    assert_eq!(whole.value(), "Intro: hello world");
}

#[test]
fn it_carries_the_cursor_across_multi_line_chunks() {
    let mut document = TextDocument::new("## Notes\nafter");
    let mut writer = ResponseWriter::new(&mut document, Position::new(1, 0));

    writer.write("line one\n\nline");
    writer.write(" two\n");
    let cursor = writer.write("- item");

    assert_eq!(cursor, Position::new(4, 6));
    assert_eq!(
        document.value(),
        "## Notes\nline one\n\nline two\n- itemafter"
    );
}

#[test]
fn it_writes_nothing_for_empty_chunks() {
    let mut document = RecordingDocument::new("abc");
    let next = write_text(&mut document, Position::new(0, 1), "");

    assert_eq!(next, Position::new(0, 1));
    assert!(document.inserts.is_empty());
}

#[test]
fn it_breaks_non_empty_lines_before_the_response() {
    let mut document = TextDocument::new("Title line");
    let mut writer = ResponseWriter::new(&mut document, Position::new(0, 10));

    let response = writer.prepare_format("{{NEWLINE}}{{RESPONSE}}{{NEWLINE}}");
    assert_eq!(response, Position::new(1, 0));

    writer.write("Hi");
    writer.write(" there");
    assert_eq!(document.value(), "Title line\nHi there");
}

#[test]
fn it_does_not_add_blank_lines_on_an_empty_line() {
    let mut document = RecordingDocument::new("Title\n");
    let mut writer = ResponseWriter::new(&mut document, Position::new(1, 0));

    let response = writer.prepare_format("{{NEWLINE}}{{RESPONSE}}{{NEWLINE}}");

    assert_eq!(response, Position::new(1, 0));
    assert!(document.inserts.is_empty());
    assert_eq!(document.value(), "Title\n");
}

#[test]
fn it_breaks_after_the_line_content_not_at_the_cursor() {
    let mut document = TextDocument::new("abc");
    let mut writer = ResponseWriter::new(&mut document, Position::new(0, 1));

    let response = writer.prepare_format("{{NEWLINE}}{{RESPONSE}}");

    assert_eq!(response, Position::new(1, 0));
    assert_eq!(document.value(), "abc\n");
}

#[test]
fn it_keeps_suffix_literals_after_the_response() {
    let mut document = TextDocument::new("");
    let mut writer = ResponseWriter::new(&mut document, Position::new(0, 0));

    let response = writer.prepare_format("> {{RESPONSE}} <");
    assert_eq!(response, Position::new(0, 2));

    writer.write("hi");
    assert_eq!(document.value(), "> hi <");
}

#[test]
fn it_pads_with_literal_line_breaks() {
    let mut document = TextDocument::new("Question?");
    let mut writer = ResponseWriter::new(&mut document, Position::new(0, 9));

    let response = writer.prepare_format("\n{{RESPONSE}}\n");
    assert_eq!(response, Position::new(1, 0));

    writer.write("Yes");
    assert_eq!(document.value(), "Question?\nYes\n");
}

#[test]
fn it_continues_after_formats_without_a_response_slot() {
    let mut document = TextDocument::new("");
    let mut writer = ResponseWriter::new(&mut document, Position::new(0, 0));

    let response = writer.prepare_format("---\n");
    assert_eq!(response, Position::new(1, 0));
    assert_eq!(writer.cursor(), Position::new(1, 0));
}

#[test]
fn it_writes_other_placeholders_verbatim() {
    let mut document = TextDocument::new("");
    let mut writer = ResponseWriter::new(&mut document, Position::new(0, 0));

    let response = writer.prepare_format("{{DATE}}: {{RESPONSE}}");
    assert_eq!(response, Position::new(0, 10));
    assert_eq!(document.value(), "{{DATE}}: ");
}
