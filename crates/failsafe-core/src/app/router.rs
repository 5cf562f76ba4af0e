//! DeadLetterRouter - stage の結果を main output と dead-letter sink に振り分ける
//!
//! Healthy envelopes are handed back to the caller for the next stage;
//! failed ones are stamped with an id, the stage name and a failure time and
//! sent to the sink. A sink error is returned to the caller, so a failed
//! record is either stored or reported, never lost.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::stage::StageOutcome;
use crate::domain::dead_letter::DeadLetterRecord;
use crate::domain::envelope::FailsafeEnvelope;
use crate::domain::errors::SinkError;
use crate::ports::{Clock, DeadLetterSink, IdGenerator, SystemClock, UlidGenerator};

/// Per-router counters for observability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteCounts {
    pub forwarded: u64,
    pub dead_lettered: u64,
}

pub struct DeadLetterRouter<S> {
    stage: String,
    sink: S,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    forwarded: AtomicU64,
    dead_lettered: AtomicU64,
}

impl<S> DeadLetterRouter<S> {
    /// Router for `stage` using the system clock and ULID ids.
    pub fn new(stage: impl Into<String>, sink: S) -> Self {
        Self {
            stage: stage.into(),
            sink,
            clock: Arc::new(SystemClock),
            ids: Arc::new(UlidGenerator::new(SystemClock)),
            forwarded: AtomicU64::new(0),
            dead_lettered: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn stage(&self) -> &str {
        &self.stage
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn counts(&self) -> RouteCounts {
        RouteCounts {
            forwarded: self.forwarded.load(Ordering::Relaxed),
            dead_lettered: self.dead_lettered.load(Ordering::Relaxed),
        }
    }

    /// Forward a success, or dead-letter a failure and return `None`.
    pub async fn route<O, C, D>(
        &self,
        outcome: StageOutcome<O, C, D>,
    ) -> Result<Option<FailsafeEnvelope<O, D>>, SinkError>
    where
        S: DeadLetterSink<O, C>,
        O: Send + 'static,
        C: Send + 'static,
    {
        match outcome {
            StageOutcome::Succeeded(envelope) => {
                self.forwarded.fetch_add(1, Ordering::Relaxed);
                Ok(Some(envelope))
            }
            StageOutcome::Failed(envelope) => {
                let record = DeadLetterRecord::new(
                    self.ids.generate_dead_letter_id(),
                    self.stage.as_str(),
                    self.clock.now(),
                    envelope,
                );
                let id = record.id();

                if let Err(e) = self.sink.send(record).await {
                    tracing::error!(stage = %self.stage, %id, error = %e, "failed to dead-letter record");
                    return Err(e);
                }

                self.dead_lettered.fetch_add(1, Ordering::Relaxed);
                tracing::info!(stage = %self.stage, %id, "record dead-lettered");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::FailsafeStage;
    use crate::domain::row::ParseRow;
    use crate::impls::{ChannelDeadLetterSink, InMemoryDeadLetterSink};
    use crate::ports::FixedClock;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn healthy_records_are_forwarded_and_failures_dead_lettered() {
        let sink = InMemoryDeadLetterSink::<String, String>::new();
        let router = DeadLetterRouter::new("parse-row", sink.clone());
        let stage = FailsafeStage::new(ParseRow);

        let good = stage.process(FailsafeEnvelope::ingest(r#"{"a":"1"}"#.to_string()));
        let bad = stage.process(FailsafeEnvelope::ingest("nope".to_string()));

        let forwarded = router.route(good).await.unwrap();
        assert!(forwarded.is_some());
        assert_eq!(router.route(bad).await.unwrap(), None);

        assert_eq!(
            router.counts(),
            RouteCounts {
                forwarded: 1,
                dead_lettered: 1
            }
        );

        let records = sink.drain().await;
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.stage(), "parse-row");
        assert_eq!(record.envelope().original(), "nope");
        assert_eq!(record.envelope().current(), "nope");
        assert!(record.envelope().error_message().is_some());
    }

    #[tokio::test]
    async fn provenance_comes_from_clock_and_id_generator() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let clock = FixedClock::new(at);
        let sink = InMemoryDeadLetterSink::<i64, i64>::new();
        let router = DeadLetterRouter::new("ratio", sink.clone())
            .with_clock(Arc::new(clock))
            .with_id_generator(Arc::new(UlidGenerator::new(clock)));

        let failed = FailsafeEnvelope::new(1i64, 0i64).with_error_message("division by zero");
        router
            .route(StageOutcome::<i64, i64, f64>::Failed(failed))
            .await
            .unwrap();

        let records = sink.snapshot().await;
        let record = &records[0];
        assert_eq!(record.failed_at(), at);
        assert_eq!(record.id().as_ulid().timestamp_ms(), at.timestamp_millis() as u64);
    }

    #[tokio::test]
    async fn sink_errors_are_reported_not_swallowed() {
        let (sink, rx) = ChannelDeadLetterSink::<String, String>::new(1);
        drop(rx);
        let router = DeadLetterRouter::new("parse-row", sink);

        let failed = FailsafeEnvelope::ingest("x".to_string()).with_error_message("bad");
        let result = router
            .route(StageOutcome::<String, String, String>::Failed(failed))
            .await;

        assert!(matches!(result, Err(SinkError::Closed)));
        assert_eq!(router.counts().dead_lettered, 0);
    }
}
