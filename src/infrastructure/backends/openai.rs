#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;

use anyhow::anyhow;
use anyhow::Result;
use futures::stream::TryStreamExt;
use serde::Deserialize;
use serde::Serialize;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tokio::sync::watch;
use tokio_util::io::StreamReader;
use tokio_util::sync::CancellationToken;

use super::sse::SseDecoder;
use super::sse::SseFrame;
use crate::domain::models::Message;
use crate::domain::models::StreamClient;
use crate::domain::models::StreamEvent;
use crate::domain::models::StreamRequest;
use crate::domain::models::StreamSession;
use crate::domain::models::StreamStatus;

const DONE: &str = "[DONE]";
const GENERIC_ERROR: &str = "An error occurred. Please check the logs for more details.";

fn convert_err(err: reqwest::Error) -> std::io::Error {
    let err_msg = err.to_string();
    return std::io::Error::new(std::io::ErrorKind::Interrupted, err_msg);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionDeltaResponse {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionChoiceResponse {
    delta: CompletionDeltaResponse,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoiceResponse>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ErrorDetailResponse {
    message: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ErrorResponse {
    error: ErrorDetailResponse,
}

/// Pulls the incremental text out of a completion frame. Frames without
/// content, such as the opening role frame, yield `None`.
fn decode_message(data: &str) -> Result<Option<String>> {
    let res: CompletionResponse = serde_json::from_str(data)?;
    let choice = res
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| return anyhow!("Completion frame has no choices"))?;

    return Ok(choice.delta.content.filter(|content| return !content.is_empty()));
}

fn error_message(data: &str) -> String {
    return match serde_json::from_str::<ErrorResponse>(data) {
        Ok(res) => res.error.message,
        Err(err) => {
            tracing::error!(error = ?err, data = %data, "Unable to decode error payload");
            GENERIC_ERROR.to_string()
        }
    };
}

/// Write side of one session. Owned by the session task; goes quiet as soon
/// as the session is cancelled.
struct SessionEmitter {
    tx: mpsc::UnboundedSender<StreamEvent>,
    status: watch::Sender<StreamStatus>,
    cancel: CancellationToken,
}

impl SessionEmitter {
    fn send(&self, event: StreamEvent) {
        if self.cancel.is_cancelled() {
            return;
        }

        if self.tx.send(event).is_err() {
            tracing::debug!("Stream session receiver was dropped");
        }
    }

    /// Moves to `next`, announcing it once per entry into the state.
    fn transition(&self, next: StreamStatus) {
        if *self.status.borrow() == next {
            return;
        }

        tracing::debug!(status = %next, "Stream session status changed");
        self.status.send_replace(next);

        match next {
            StreamStatus::Connecting => self.send(StreamEvent::Connecting),
            StreamStatus::Open => self.send(StreamEvent::Start),
            StreamStatus::Closed => self.send(StreamEvent::End),
            StreamStatus::Idle => {}
        }
    }

    fn message(&self, text: String) {
        self.send(StreamEvent::Message(text));
    }

    fn error(&self, message: String) {
        self.send(StreamEvent::Error(message));
    }

    fn frame(&self, frame: SseFrame) {
        if frame.event == "error" {
            self.error(error_message(&frame.data));
            return;
        }

        if frame.data.trim() == DONE {
            return;
        }

        match decode_message(&frame.data) {
            Ok(Some(text)) => self.message(text),
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(error = ?err, data = %frame.data, "Failed to decode completion frame");
                self.error(err.to_string());
            }
        }
    }
}

#[allow(clippy::implicit_return)]
async fn stream_completion(
    http: &reqwest::Client,
    request: &StreamRequest,
    emitter: &SessionEmitter,
) -> Result<()> {
    emitter.transition(StreamStatus::Connecting);

    let body = CompletionRequest {
        model: &request.model,
        messages: &request.messages,
        stream: true,
    };

    let mut req = http
        .post(&request.endpoint)
        .header("Authorization", format!("Bearer {}", request.token))
        .header("Content-Type", "application/json")
        .json(&body);

    if let Some(organization) = request.organization.as_deref() {
        if !organization.is_empty() {
            req = req.header("OpenAI-Organization", organization);
        }
    }

    let res = req.send().await?;

    if !res.status().is_success() {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        tracing::error!(status = status, body = %text, "Completion request was rejected");
        emitter.error(error_message(&text));
        return Ok(());
    }

    emitter.transition(StreamStatus::Open);

    let stream = res.bytes_stream().map_err(convert_err);
    let mut lines_reader = StreamReader::new(stream).lines();
    let mut decoder = SseDecoder::default();

    while let Some(line) = lines_reader.next_line().await? {
        if let Some(frame) = decoder.push_line(&line) {
            emitter.frame(frame);
        }
    }

    if let Some(frame) = decoder.flush() {
        emitter.frame(frame);
    }

    return Ok(());
}

#[allow(clippy::implicit_return)]
async fn run_session(http: reqwest::Client, request: StreamRequest, emitter: SessionEmitter) {
    let cancel = emitter.cancel.clone();

    tokio::select! {
        _ = cancel.cancelled() => {
            tracing::debug!("Stream session aborted");
            emitter.status.send_replace(StreamStatus::Closed);
        }
        res = stream_completion(&http, &request, &emitter) => {
            if let Err(err) = res {
                tracing::error!(error = ?err, "Stream session failed");
                emitter.error(err.to_string());
            }
            emitter.transition(StreamStatus::Closed);
        }
    }
}

struct ActiveSession {
    cancel: CancellationToken,
    status: watch::Receiver<StreamStatus>,
}

/// Streams chat completions from an OpenAI compatible endpoint. Each request
/// runs in its own task.
pub struct OpenAI {
    http: reqwest::Client,
    active: Option<ActiveSession>,
}

impl Default for OpenAI {
    fn default() -> OpenAI {
        return OpenAI {
            http: reqwest::Client::new(),
            active: None,
        };
    }
}

impl Drop for OpenAI {
    fn drop(&mut self) {
        self.abort();
    }
}

impl StreamClient for OpenAI {
    fn request(&mut self, request: StreamRequest) -> StreamSession {
        self.abort();

        let (tx, rx) = mpsc::unbounded_channel::<StreamEvent>();
        let (status_tx, status_rx) = watch::channel(StreamStatus::Idle);
        let cancel = CancellationToken::new();

        tracing::debug!(
            endpoint = %request.endpoint,
            model = %request.model,
            messages = request.messages.len(),
            "Starting stream session"
        );

        let emitter = SessionEmitter {
            tx,
            status: status_tx,
            cancel: cancel.clone(),
        };
        tokio::spawn(run_session(self.http.clone(), request, emitter));

        self.active = Some(ActiveSession {
            cancel: cancel.clone(),
            status: status_rx,
        });

        return StreamSession::new(rx, cancel);
    }

    fn abort(&mut self) {
        let Some(active) = &self.active else {
            return;
        };

        if active.cancel.is_cancelled() || *active.status.borrow() == StreamStatus::Closed {
            return;
        }

        tracing::debug!("Aborting stream session");
        active.cancel.cancel();
    }

    fn status(&self) -> StreamStatus {
        return match &self.active {
            None => StreamStatus::Idle,
            Some(active) if active.cancel.is_cancelled() => StreamStatus::Closed,
            Some(active) => *active.status.borrow(),
        };
    }
}
