//! DeadLetterRecord - dead-letter sink に届く失敗レコード
//!
//! Wraps a failed envelope with the provenance needed to inspect or replay
//! it: which stage gave up on it and when.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::envelope::FailsafeEnvelope;
use super::ids::DeadLetterId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadLetterRecord<O, C> {
    id: DeadLetterId,
    stage: String,
    failed_at: DateTime<Utc>,
    envelope: FailsafeEnvelope<O, C>,
}

impl<O, C> DeadLetterRecord<O, C> {
    pub fn new(
        id: DeadLetterId,
        stage: impl Into<String>,
        failed_at: DateTime<Utc>,
        envelope: FailsafeEnvelope<O, C>,
    ) -> Self {
        Self {
            id,
            stage: stage.into(),
            failed_at,
            envelope,
        }
    }

    /// Id under which the sink stores this record.
    pub fn id(&self) -> DeadLetterId {
        self.id
    }

    /// Name of the stage whose transform failed.
    pub fn stage(&self) -> &str {
        &self.stage
    }

    /// When the router handed the record to the sink.
    pub fn failed_at(&self) -> DateTime<Utc> {
        self.failed_at
    }

    /// The failed envelope, diagnostics included.
    pub fn envelope(&self) -> &FailsafeEnvelope<O, C> {
        &self.envelope
    }

    /// Drop the provenance and keep the envelope.
    pub fn into_envelope(self) -> FailsafeEnvelope<O, C> {
        self.envelope
    }

    /// A fresh, healthy envelope for re-ingesting the record from scratch.
    pub fn replay(&self) -> FailsafeEnvelope<O, O>
    where
        O: Clone,
    {
        FailsafeEnvelope::ingest(self.envelope.original().clone())
    }
}
