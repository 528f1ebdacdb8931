//! In-process fan-out of match events for live observers.

use async_trait::async_trait;
use futures::{stream::BoxStream, StreamExt};
use lanebot_types::{events::MatchEvent, Result};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

#[async_trait]
pub trait MatchFeed: Send + Sync {
    async fn publish(&self, event: MatchEvent) -> Result<()>;
    fn subscribe(&self) -> BoxStream<'static, MatchEvent>;
}

/// Feed backed by a broadcast channel. Slow observers drop events rather
/// than back-pressure the match loop.
#[derive(Clone)]
pub struct LocalFeed {
    tx: broadcast::Sender<MatchEvent>,
}

impl LocalFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }
}

#[async_trait]
impl MatchFeed for LocalFeed {
    async fn publish(&self, event: MatchEvent) -> Result<()> {
        // No subscribers is fine; events are advisory.
        let _ = self.tx.send(event);
        Ok(())
    }

    fn subscribe(&self) -> BoxStream<'static, MatchEvent> {
        BroadcastStream::new(self.tx.subscribe())
            .filter_map(|event| async move { event.ok() })
            .boxed()
    }
}
