#[cfg(test)]
#[path = "sse_test.rs"]
mod tests;

const DEFAULT_EVENT: &str = "message";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SseFrame {
    pub event: String,
    pub data: String,
}

/// Line-oriented server-sent events decoder. Feed it one line at a time,
/// without the trailing newline.
#[derive(Default)]
pub struct SseDecoder {
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn push_line(&mut self, line: &str) -> Option<SseFrame> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            return self.flush();
        }

        // Comment, commonly used as a keep-alive.
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            _ => {
                tracing::debug!(field = field, "Ignoring unsupported SSE field");
            }
        }

        return None;
    }

    /// Emits the pending event, if any data was collected for it.
    pub fn flush(&mut self) -> Option<SseFrame> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }

        let frame = SseFrame {
            event: event.unwrap_or_else(|| return DEFAULT_EVENT.to_string()),
            data: self.data.join("\n"),
        };
        self.data.clear();

        return Some(frame);
    }
}
