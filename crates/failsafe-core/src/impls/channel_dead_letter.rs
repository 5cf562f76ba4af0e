//! ChannelDeadLetterSink - tokio mpsc 経由で dead-letter を配送
//!
//! The receiving half is owned by whoever writes dead letters out (a file,
//! stderr, another queue). Once every sender is dropped the receiver sees
//! the end of the stream.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::dead_letter::DeadLetterRecord;
use crate::domain::errors::SinkError;
use crate::ports::DeadLetterSink;

pub struct ChannelDeadLetterSink<O, C> {
    tx: mpsc::Sender<DeadLetterRecord<O, C>>,
}

impl<O, C> ChannelDeadLetterSink<O, C> {
    /// Create a sink and its receiver. `send` waits while `buffer` records are in flight.
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<DeadLetterRecord<O, C>>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self { tx }, rx)
    }
}

impl<O, C> Clone for ChannelDeadLetterSink<O, C> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

#[async_trait]
impl<O, C> DeadLetterSink<O, C> for ChannelDeadLetterSink<O, C>
where
    O: Send + 'static,
    C: Send + 'static,
{
    async fn send(&self, record: DeadLetterRecord<O, C>) -> Result<(), SinkError> {
        self.tx.send(record).await.map_err(|_| SinkError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::envelope::FailsafeEnvelope;
    use crate::domain::ids::DeadLetterId;
    use chrono::Utc;
    use ulid::Ulid;

    fn record() -> DeadLetterRecord<String, String> {
        let envelope = FailsafeEnvelope::ingest("raw".to_string()).with_error_message("bad");
        DeadLetterRecord::new(DeadLetterId::from_ulid(Ulid::new()), "parse", Utc::now(), envelope)
    }

    #[tokio::test]
    async fn delivers_to_receiver() {
        let (sink, mut rx) = ChannelDeadLetterSink::new(4);
        let sent = record();
        sink.send(sent.clone()).await.unwrap();
        drop(sink);

        assert_eq!(rx.recv().await, Some(sent));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn closed_receiver_is_an_error() {
        let (sink, rx) = ChannelDeadLetterSink::new(1);
        drop(rx);
        assert!(matches!(sink.send(record()).await, Err(SinkError::Closed)));
    }
}
