#[cfg(test)]
#[path = "stream_test.rs"]
mod tests;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::Message;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum StreamStatus {
    Idle,
    Connecting,
    Open,
    Closed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamEvent {
    /// The session entered `StreamStatus::Connecting`.
    Connecting,
    /// The session entered `StreamStatus::Open`.
    Start,
    /// An incremental piece of the completion.
    Message(String),
    Error(String),
    /// The session entered `StreamStatus::Closed`.
    End,
}

#[derive(Clone, Debug, Default)]
pub struct StreamRequest {
    pub endpoint: String,
    pub token: String,
    pub organization: Option<String>,
    pub model: String,
    pub messages: Vec<Message>,
}

/// Lifecycle hooks for a stream session. Everything but `on_message` is
/// optional.
pub trait StreamHandler {
    fn on_message(&mut self, text: &str);

    fn on_connecting(&mut self) {}

    fn on_start(&mut self) {}

    fn on_end(&mut self) {}

    fn on_error(&mut self, _message: &str) {}
}

/// Receiving end of one request. Once the session is cancelled it yields
/// nothing else, including events that were already queued.
pub struct StreamSession {
    events: mpsc::UnboundedReceiver<StreamEvent>,
    cancel: CancellationToken,
}

impl StreamSession {
    pub fn new(
        events: mpsc::UnboundedReceiver<StreamEvent>,
        cancel: CancellationToken,
    ) -> StreamSession {
        return StreamSession { events, cancel };
    }

    pub fn is_cancelled(&self) -> bool {
        return self.cancel.is_cancelled();
    }

    #[allow(clippy::implicit_return)]
    pub async fn recv(&mut self) -> Option<StreamEvent> {
        if self.cancel.is_cancelled() {
            return None;
        }

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            event = self.events.recv() => event,
        }
    }

    /// Feeds every event of the session to `handler`, in arrival order, until
    /// the session ends or is cancelled.
    #[allow(clippy::implicit_return)]
    pub async fn dispatch<H: StreamHandler + ?Sized>(&mut self, handler: &mut H) {
        while let Some(event) = self.recv().await {
            match event {
                StreamEvent::Connecting => handler.on_connecting(),
                StreamEvent::Start => handler.on_start(),
                StreamEvent::Message(text) => handler.on_message(&text),
                StreamEvent::Error(message) => handler.on_error(&message),
                StreamEvent::End => handler.on_end(),
            }
        }
    }
}

/// A chat-completion backend that streams its answer. At most one session is
/// open per client; requesting again aborts the previous session.
pub trait StreamClient {
    fn request(&mut self, request: StreamRequest) -> StreamSession;

    /// Terminates the open session, if any. Safe to call repeatedly.
    fn abort(&mut self);

    fn status(&self) -> StreamStatus;
}

pub type StreamClientBox = Box<dyn StreamClient + Send + Sync>;
