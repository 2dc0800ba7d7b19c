//! Realtime event channel over WebSocket.
//!
//! One persistent connection per client, established lazily by
//! [`PosterClient::realtime`](crate::PosterClient::realtime) and
//! authenticated at connection time with the client's bearer token. Incoming
//! frames are `{"event": <name>, "data": <payload>}`; payloads are handed to
//! subscribers uninspected. There is no reconnection or backoff, and no
//! ordering guarantee across event kinds.

mod events;

pub use events::EventKind;

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use url::Url;

/// Errors that can occur on the realtime channel.
#[derive(Debug, Error)]
pub enum RealtimeError {
    /// WebSocket connect or send failed.
    #[error("websocket error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    /// Failed to encode the connection-time auth frame.
    #[error("failed to encode auth frame: {0}")]
    Json(#[from] serde_json::Error),
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connection-time authentication frame.
#[derive(Debug, Serialize)]
struct AuthFrame<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    token: &'a str,
}

/// Incoming event frame.
#[derive(Debug, Deserialize)]
struct EventFrame {
    event: String,
    #[serde(default)]
    data: Value,
}

/// A registered subscriber for one event kind.
struct Subscriber {
    id: u64,
    tx: mpsc::UnboundedSender<Value>,
}

/// Subscriber registry shared between the channel handle and the read loop.
#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: HashMap<EventKind, Vec<Subscriber>>,
}

impl Registry {
    fn subscribe(&mut self, kind: EventKind) -> (u64, mpsc::UnboundedReceiver<Value>) {
        let id = self.next_id;
        self.next_id += 1;
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .entry(kind)
            .or_default()
            .push(Subscriber { id, tx });
        (id, rx)
    }

    fn unsubscribe(&mut self, kind: EventKind, id: u64) {
        if let Some(subscribers) = self.subscribers.get_mut(&kind) {
            subscribers.retain(|s| s.id != id);
        }
    }

    /// Deliver `data` to every live subscriber of `kind`, pruning any whose
    /// receiver has been dropped.
    fn dispatch(&mut self, kind: EventKind, data: &Value) {
        if let Some(subscribers) = self.subscribers.get_mut(&kind) {
            subscribers.retain(|s| s.tx.send(data.clone()).is_ok());
        }
    }

    fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers.get(&kind).map_or(0, Vec::len)
    }
}

/// Handle to the realtime connection.
///
/// Cloning shares the underlying connection and subscriber registry; the
/// connection ends when the server closes it or the last handle is dropped.
#[derive(Clone)]
pub struct RealtimeChannel {
    inner: Arc<ChannelInner>,
}

struct ChannelInner {
    registry: Arc<Mutex<Registry>>,
    task: tokio::task::JoinHandle<()>,
}

impl Drop for ChannelInner {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl RealtimeChannel {
    /// Connect to `url`, sending an auth frame when a token is present.
    pub(crate) async fn connect(url: &Url, token: Option<String>) -> Result<Self, RealtimeError> {
        let (ws, _) = connect_async(url.as_str()).await?;
        let (mut sink, stream) = ws.split();

        if let Some(token) = token.as_deref() {
            let frame = serde_json::to_string(&AuthFrame {
                kind: "auth",
                token,
            })?;
            sink.send(Message::Text(frame.into())).await?;
        }
        tracing::info!(%url, authenticated = token.is_some(), "realtime channel connected");

        let registry = Arc::new(Mutex::new(Registry::default()));
        let task = tokio::spawn(read_loop(sink, stream, Arc::clone(&registry)));

        Ok(Self {
            inner: Arc::new(ChannelInner { registry, task }),
        })
    }

    /// Register a subscriber for `kind`.
    ///
    /// Every subscriber of a kind receives its own copy of each payload.
    /// Dropping the returned [`Subscription`] also ends delivery; explicit
    /// [`unsubscribe`](Self::unsubscribe) removes the registration eagerly.
    pub fn subscribe(&self, kind: EventKind) -> Subscription {
        let (id, rx) = self.inner.registry.lock().subscribe(kind);
        Subscription { id, kind, rx }
    }

    /// Remove a subscription from the registry.
    pub fn unsubscribe(&self, subscription: &Subscription) {
        self.inner
            .registry
            .lock()
            .unsubscribe(subscription.kind, subscription.id);
    }

    /// Whether the underlying connection has ended.
    pub fn is_closed(&self) -> bool {
        self.inner.task.is_finished()
    }
}

/// A registration for one event kind on one channel.
pub struct Subscription {
    id: u64,
    kind: EventKind,
    rx: mpsc::UnboundedReceiver<Value>,
}

impl Subscription {
    /// The event kind this subscription receives.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Receive the next payload, or `None` once the channel has closed and
    /// all buffered payloads were drained.
    pub async fn recv(&mut self) -> Option<Value> {
        self.rx.recv().await
    }

    /// Receive a buffered payload without waiting.
    pub fn try_recv(&mut self) -> Option<Value> {
        self.rx.try_recv().ok()
    }
}

/// Read frames until the connection ends, dispatching events to subscribers.
async fn read_loop(
    mut sink: SplitSink<WsStream, Message>,
    mut stream: SplitStream<WsStream>,
    registry: Arc<Mutex<Registry>>,
) {
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => match serde_json::from_str::<EventFrame>(&text) {
                Ok(frame) => match EventKind::parse(&frame.event) {
                    Some(kind) => registry.lock().dispatch(kind, &frame.data),
                    None => tracing::debug!(event = %frame.event, "dropping unknown event"),
                },
                Err(e) => tracing::warn!("dropping unparseable realtime frame: {e}"),
            },
            Ok(Message::Ping(data)) => {
                let _ = sink.send(Message::Pong(data)).await;
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("realtime transport error: {e}");
                break;
            }
        }
    }
    tracing::info!("realtime channel closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dispatch_reaches_all_subscribers_of_kind() {
        let mut registry = Registry::default();
        let (_, mut rx_a) = registry.subscribe(EventKind::NewMessage);
        let (_, mut rx_b) = registry.subscribe(EventKind::NewMessage);
        let (_, mut rx_other) = registry.subscribe(EventKind::Typing);

        registry.dispatch(EventKind::NewMessage, &json!({"content": "hi"}));

        assert_eq!(rx_a.try_recv().ok(), Some(json!({"content": "hi"})));
        assert_eq!(rx_b.try_recv().ok(), Some(json!({"content": "hi"})));
        assert!(rx_other.try_recv().is_err());
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut registry = Registry::default();
        let (id, mut rx) = registry.subscribe(EventKind::NewNotification);

        registry.unsubscribe(EventKind::NewNotification, id);
        registry.dispatch(EventKind::NewNotification, &json!({"id": "n1"}));

        assert!(rx.try_recv().is_err());
        assert_eq!(registry.subscriber_count(EventKind::NewNotification), 0);
    }

    #[test]
    fn test_dropped_receiver_is_pruned_on_dispatch() {
        let mut registry = Registry::default();
        let (_, rx) = registry.subscribe(EventKind::Typing);
        let (_, mut live_rx) = registry.subscribe(EventKind::Typing);
        drop(rx);

        registry.dispatch(EventKind::Typing, &json!({"conversationId": "c1"}));

        assert_eq!(registry.subscriber_count(EventKind::Typing), 1);
        assert!(live_rx.try_recv().is_ok());
    }

    #[test]
    fn test_subscription_ids_are_unique() {
        let mut registry = Registry::default();
        let (a, _rx_a) = registry.subscribe(EventKind::Typing);
        let (b, _rx_b) = registry.subscribe(EventKind::Typing);
        assert_ne!(a, b);
    }

    #[test]
    fn test_event_frame_parses_with_and_without_data() {
        let frame: EventFrame =
            serde_json::from_str(r#"{"event": "new_message", "data": {"content": "hi"}}"#).unwrap();
        assert_eq!(frame.event, "new_message");
        assert_eq!(frame.data["content"], "hi");

        let frame: EventFrame = serde_json::from_str(r#"{"event": "typing"}"#).unwrap();
        assert_eq!(frame.data, Value::Null);
    }

    #[test]
    fn test_auth_frame_wire_shape() {
        let frame = AuthFrame {
            kind: "auth",
            token: "tok123",
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json, json!({"type": "auth", "token": "tok123"}));
    }
}
