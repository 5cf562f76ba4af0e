//! DeadLetterSink port - 失敗レコードの配送先
//!
//! The pipeline framework must provide somewhere for failed records to go.
//! A sink either accepts a record or returns an error; it never drops one
//! silently.

use async_trait::async_trait;

use crate::domain::dead_letter::DeadLetterRecord;
use crate::domain::errors::SinkError;

#[async_trait]
pub trait DeadLetterSink<O, C>: Send + Sync
where
    O: Send + 'static,
    C: Send + 'static,
{
    async fn send(&self, record: DeadLetterRecord<O, C>) -> Result<(), SinkError>;
}
