/// A single server-sent event carrying `data`.
pub fn sse_event(data: &str) -> String {
    return format!("data: {data}\n\n");
}

/// A streamed chat-completion frame whose delta carries `content`.
pub fn completion_chunk(content: &str) -> String {
    return serde_json::json!({
        "choices": [{ "delta": { "content": content } }]
    })
    .to_string();
}

/// A full event-stream body streaming `chunks` in order, terminated with
/// `[DONE]`.
pub fn completion_stream(chunks: &[&str]) -> String {
    let mut body = chunks
        .iter()
        .map(|chunk| return sse_event(&completion_chunk(chunk)))
        .collect::<Vec<String>>()
        .join("");

    body += &sse_event("[DONE]");
    return body;
}

pub fn document_fixture() -> &'static str {
    return r#"
# Weekly notes

Ship the streaming writer.
Review the placeholder fallbacks.
"#
    .trim();
}
