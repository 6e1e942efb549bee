use axum::{
    Router,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use futures::stream::{self, Stream};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::{convert::Infallible, time::Duration};
use tokio::sync::broadcast;
use tracing::warn;

use crate::state::AppState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

/// A toast-style notification pushed to connected clients.
#[derive(Clone, Debug, Serialize)]
pub struct NotificationEvent {
    /// Monotonic per-process id, safe for client-side de-duplication.
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
}

/// Owns the broadcast channel and the id counter. One per application,
/// injected through [`AppState`]; the channel is bounded so a burst of
/// notifications cannot grow without limit.
#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<NotificationEvent>,
    next_id: Arc<AtomicU64>,
}

impl Notifier {
    #[must_use]
    pub fn new(buffer_size: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer_size);
        Self {
            tx,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.tx.subscribe()
    }

    pub fn notify(&self, kind: NotificationKind, message: impl Into<String>) {
        let event = NotificationEvent {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            kind,
            message: message.into(),
        };
        // Send only fails when nobody is subscribed, which is fine.
        let _ = self.tx.send(event);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notify(NotificationKind::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(NotificationKind::Error, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.notify(NotificationKind::Info, message);
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/events/stream", get(sse_handler))
}

async fn sse_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.notifier.subscribe();

    let stream = stream::unfold(rx, |mut rx| async move {
        match rx.recv().await {
            Ok(event) => {
                let json = serde_json::to_string(&event).unwrap_or_default();
                Some((Ok(Event::default().data(json)), rx))
            }
            Err(broadcast::error::RecvError::Lagged(count)) => {
                warn!("Client lagged by {} messages", count);

                Some((
                    Ok(Event::default().event("warning").data("Missed some events")),
                    rx,
                ))
            }
            Err(broadcast::error::RecvError::Closed) => None,
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_notification_ids_are_monotonic() {
        let notifier = Notifier::new(16);
        let mut rx = notifier.subscribe();

        notifier.success("first");
        notifier.error("second");
        notifier.info("third");

        let a = rx.recv().await.unwrap();
        let b = rx.recv().await.unwrap();
        let c = rx.recv().await.unwrap();

        assert!(a.id < b.id);
        assert!(b.id < c.id);
        assert_eq!(a.kind, NotificationKind::Success);
        assert_eq!(c.message, "third");
    }

    #[test]
    fn test_notify_without_subscribers_is_harmless() {
        let notifier = Notifier::new(4);
        notifier.success("nobody listening");
    }
}
