use std::path::Path;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use anyhow::Result;
use async_trait::async_trait;

use super::CommandContext;
use crate::domain::models::Document;
use crate::domain::models::Position;
use crate::domain::models::Selection;
use crate::domain::models::UserInput;
use crate::domain::services::placeholders::resolve;
use crate::infrastructure::documents::TextDocument;

#[derive(Default)]
struct CountingInput {
    calls: AtomicUsize,
}

#[async_trait]
impl UserInput for CountingInput {
    #[allow(clippy::implicit_return)]
    async fn prompt_for_text(&self, _title: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        return Ok("Explain this".to_string());
    }
}

fn fixture() -> TextDocument {
    let mut document = TextDocument::new("# Groceries\n- apples\n- pears");
    document.set_cursor(Position::new(1, 3));
    return document;
}

#[test]
fn it_captures_document_state() {
    let input = CountingInput::default();
    let document = fixture();
    let context = CommandContext::capture(&document, Path::new("notes/shopping.md"), &input);

    assert_eq!(context.file_name, "shopping.md");
    assert_eq!(context.title, "shopping");
    assert_eq!(context.line, "- apples");
    assert_eq!(context.selection, "");
    assert_eq!(context.body, "# Groceries\n- apples\n- pears");
}

#[tokio::test]
async fn it_prefers_the_selection_when_present() -> Result<()> {
    let input = CountingInput::default();
    let mut document = fixture();
    document.set_selections(vec![Selection::new(
        Position::new(2, 2),
        Position::new(2, 7),
    )]);
    let context = CommandContext::capture(&document, Path::new("shopping.md"), &input);
    let variables = context.variables();

    assert_eq!(resolve("{{SELECTION|LINE}}", &variables).await?, "pears");
    return Ok(());
}

#[tokio::test]
async fn it_falls_back_to_the_line_without_a_selection() -> Result<()> {
    let input = CountingInput::default();
    let document = fixture();
    let context = CommandContext::capture(&document, Path::new("shopping.md"), &input);
    let variables = context.variables();

    assert_eq!(resolve("{{SELECTION|LINE}}", &variables).await?, "- apples");
    assert_eq!(
        resolve("{{SELECTION|TITLE}}", &variables).await?,
        "shopping"
    );
    return Ok(());
}

#[tokio::test]
async fn it_only_prompts_when_the_input_slot_is_reached() -> Result<()> {
    let input = CountingInput::default();
    let document = fixture();
    let context = CommandContext::capture(&document, Path::new("shopping.md"), &input);
    let variables = context.variables();

    assert_eq!(resolve("{{LINE|INPUT}}", &variables).await?, "- apples");
    assert_eq!(input.calls.load(Ordering::SeqCst), 0);

    assert_eq!(
        resolve("{{INPUT}}: {{FILE_NAME}}", &variables).await?,
        "Explain this: shopping.md"
    );
    assert_eq!(input.calls.load(Ordering::SeqCst), 1);
    return Ok(());
}

#[tokio::test]
async fn it_resolves_date_and_time() -> Result<()> {
    let input = CountingInput::default();
    let document = fixture();
    let context = CommandContext::capture(&document, Path::new("shopping.md"), &input);
    let variables = context.variables();

    assert!(!resolve("{{DATE}}", &variables).await?.is_empty());
    assert!(!resolve("{{TIME}}", &variables).await?.is_empty());
    assert_ne!(resolve("{{DATE}}", &variables).await?, "{{DATE}}");
    return Ok(());
}
