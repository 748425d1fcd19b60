//! Change feed: every mutation publishes a [`ChangeEvent`]; browsers listen
//! over Server-Sent Events and simply re-fetch on whatever arrives.
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

const CHANNEL_CAPACITY: usize = 256;
pub const SSE_EVENT_NAME: &str = "change";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Reviews,
    Pricing,
    UserIntegrations,
    Feedback,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub table: Table,
    pub kind: ChangeKind,
    pub user_id: String,
    pub record_id: String,
}

#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn publish(&self, table: Table, kind: ChangeKind, user_id: &str, record_id: &str) {
        // No subscribers is the normal case between page loads.
        let _ = self.tx.send(ChangeEvent {
            table,
            kind,
            user_id: user_id.to_string(),
            record_id: record_id.to_string(),
        });
    }

    /// Events for one user. Lagged receivers skip what they missed; the
    /// client re-fetches everything on the next event anyway.
    pub fn subscribe(&self, user_id: String) -> impl Stream<Item = ChangeEvent> {
        BroadcastStream::new(self.tx.subscribe()).filter_map(move |msg| {
            let user_id = user_id.clone();
            async move {
                match msg {
                    Ok(event) if event.user_id == user_id => Some(event),
                    _ => None,
                }
            }
        })
    }
}

/// Frames an event as one SSE message.
pub fn sse_frame(event: &ChangeEvent) -> String {
    let data = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());
    format!("event: {SSE_EVENT_NAME}\ndata: {data}\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_only_see_their_own_events() {
        let feed = ChangeFeed::new();
        let mut stream = Box::pin(feed.subscribe("alice".into()));

        feed.publish(Table::Reviews, ChangeKind::Insert, "bob", "r1");
        feed.publish(Table::Reviews, ChangeKind::Update, "alice", "r2");

        let event = stream.next().await.unwrap();
        assert_eq!(event.user_id, "alice");
        assert_eq!(event.record_id, "r2");
        assert_eq!(event.kind, ChangeKind::Update);
    }

    #[test]
    fn frames_are_named_sse_messages() {
        let frame = sse_frame(&ChangeEvent {
            table: Table::Pricing,
            kind: ChangeKind::Delete,
            user_id: "u".into(),
            record_id: "p".into(),
        });
        assert!(frame.starts_with("event: change\ndata: {"));
        assert!(frame.contains("\"table\":\"pricing\""));
        assert!(frame.ends_with("\n\n"));
    }
}
