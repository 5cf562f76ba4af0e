//! InMemoryDeadLetterSink - 開発用の dead-letter sink
//!
//! Records are kept in arrival order until drained, so tests and tools can
//! inspect or replay them.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::dead_letter::DeadLetterRecord;
use crate::domain::errors::SinkError;
use crate::ports::DeadLetterSink;

/// Clones share the same storage.
pub struct InMemoryDeadLetterSink<O, C> {
    records: Arc<Mutex<Vec<DeadLetterRecord<O, C>>>>,
    capacity: Option<usize>,
}

impl<O, C> InMemoryDeadLetterSink<O, C> {
    /// 上限なしの sink を作成
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            capacity: None,
        }
    }

    /// A sink that rejects records once `capacity` of them are held.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            capacity: Some(capacity),
        }
    }

    /// Number of records currently held.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// `true` when nothing is held.
    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    /// Take every held record, oldest first.
    pub async fn drain(&self) -> Vec<DeadLetterRecord<O, C>> {
        std::mem::take(&mut *self.records.lock().await)
    }

    /// Copy of every held record, oldest first. Nothing is removed.
    pub async fn snapshot(&self) -> Vec<DeadLetterRecord<O, C>>
    where
        O: Clone,
        C: Clone,
    {
        self.records.lock().await.clone()
    }
}

impl<O, C> Default for InMemoryDeadLetterSink<O, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O, C> Clone for InMemoryDeadLetterSink<O, C> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            capacity: self.capacity,
        }
    }
}

#[async_trait]
impl<O, C> DeadLetterSink<O, C> for InMemoryDeadLetterSink<O, C>
where
    O: Send + 'static,
    C: Send + 'static,
{
    async fn send(&self, record: DeadLetterRecord<O, C>) -> Result<(), SinkError> {
        let mut records = self.records.lock().await;
        if let Some(capacity) = self.capacity
            && records.len() >= capacity
        {
            return Err(SinkError::Rejected {
                id: record.id(),
                reason: format!("capacity of {capacity} records reached"),
            });
        }
        records.push(record);
        Ok(())
    }
}
