use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::StreamEvent;
use super::StreamHandler;
use super::StreamSession;

#[derive(Default)]
struct Recorder {
    calls: Vec<String>,
}

impl StreamHandler for Recorder {
    fn on_message(&mut self, text: &str) {
        self.calls.push(format!("message:{text}"));
    }

    fn on_connecting(&mut self) {
        self.calls.push("connecting".to_string());
    }

    fn on_start(&mut self) {
        self.calls.push("start".to_string());
    }

    fn on_end(&mut self) {
        self.calls.push("end".to_string());
    }

    fn on_error(&mut self, message: &str) {
        self.calls.push(format!("error:{message}"));
    }
}

#[tokio::test]
async fn it_dispatches_events_in_order() {
    let (tx, rx) = mpsc::unbounded_channel::<StreamEvent>();
    let mut session = StreamSession::new(rx, CancellationToken::new());

    tx.send(StreamEvent::Connecting).unwrap();
    tx.send(StreamEvent::Start).unwrap();
    tx.send(StreamEvent::Message("Hi".to_string())).unwrap();
    tx.send(StreamEvent::Error("bad frame".to_string())).unwrap();
    tx.send(StreamEvent::Message(" there".to_string())).unwrap();
    tx.send(StreamEvent::End).unwrap();
    drop(tx);

    let mut recorder = Recorder::default();
    session.dispatch(&mut recorder).await;

    assert_eq!(
        recorder.calls,
        vec![
            "connecting",
            "start",
            "message:Hi",
            "error:bad frame",
            "message: there",
            "end"
        ]
    );
}

#[tokio::test]
async fn it_yields_nothing_after_cancellation() {
    let (tx, rx) = mpsc::unbounded_channel::<StreamEvent>();
    let cancel = CancellationToken::new();
    let mut session = StreamSession::new(rx, cancel.clone());

    tx.send(StreamEvent::Start).unwrap();
    assert_eq!(session.recv().await, Some(StreamEvent::Start));

    tx.send(StreamEvent::Message("queued".to_string())).unwrap();
    cancel.cancel();

    assert!(session.is_cancelled());
    assert_eq!(session.recv().await, None);
}
