//! FailsafeEnvelope - record の original / current と診断情報の運搬用データ
//!
//! An envelope travels with one record through every stage of an ingestion
//! pipeline. It keeps the record exactly as it entered the pipeline
//! (`original`) next to its latest successfully transformed form (`current`),
//! and carries error diagnostics once a stage has failed on it. Failed
//! envelopes are routed to a dead-letter sink instead of being dropped.
//!
//! # Ownership
//! - Derivation methods take `self` by value. Once an envelope has been
//!   handed to another stage or queue, the previous owner can no longer
//!   annotate it.
//! - `original` has no setter at all.

use serde::{Deserialize, Serialize};

use super::errors::TransformFailure;

/// Failsafe wrapper around a record moving through a transform pipeline.
///
/// `O` is the type of the record at pipeline entry (e.g. raw bytes or a raw
/// line), `C` the type of its current form (e.g. a parsed [`Row`]). The two
/// are independent so an envelope can cross type-changing stages.
///
/// Equality and hashing cover all four fields and delegate to the payload
/// types, so container payloads compare by content:
///
/// ```
/// use std::collections::HashMap;
/// use failsafe_core::FailsafeEnvelope;
///
/// let a: HashMap<_, _> = [("k1", "v1"), ("k2", "v2")].into_iter().collect();
/// let b: HashMap<_, _> = [("k2", "v2"), ("k1", "v1")].into_iter().collect();
///
/// assert_eq!(FailsafeEnvelope::new("raw", a), FailsafeEnvelope::new("raw", b));
/// ```
///
/// [`Row`]: crate::domain::row::Row
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FailsafeEnvelope<O, C> {
    original: O,
    current: C,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    stacktrace: Option<String>,
}

impl<O, C> FailsafeEnvelope<O, C> {
    /// Create a healthy envelope (no diagnostics).
    pub fn new(original: O, current: C) -> Self {
        Self {
            original,
            current,
            error_message: None,
            stacktrace: None,
        }
    }

    /// Build a distinct envelope structurally equal to `source`, diagnostics included.
    pub fn copy_of(source: &Self) -> Self
    where
        O: Clone,
        C: Clone,
    {
        Self {
            original: source.original.clone(),
            current: source.current.clone(),
            error_message: source.error_message.clone(),
            stacktrace: source.stacktrace.clone(),
        }
    }

    /// The record as it entered the pipeline.
    pub fn original(&self) -> &O {
        &self.original
    }

    /// The latest successfully transformed form of the record.
    pub fn current(&self) -> &C {
        &self.current
    }

    /// Why the record failed, or `None` while it is healthy.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Failure detail (error source chain, panic text), if captured.
    pub fn stacktrace(&self) -> Option<&str> {
        self.stacktrace.as_deref()
    }

    /// An envelope is failed as soon as either diagnostic field is present.
    pub fn is_failed(&self) -> bool {
        self.error_message.is_some() || self.stacktrace.is_some()
    }

    /// Same envelope with `error_message` set. `stacktrace` is left untouched.
    #[must_use]
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Same envelope with `stacktrace` set. `error_message` is left untouched.
    ///
    /// A finished failed envelope carries a message whenever it carries a
    /// trace. Set the message too (or use [`fail`](Self::fail), which always
    /// does) before handing the envelope on. A trace-only envelope still
    /// counts as failed and still round-trips through every codec.
    #[must_use]
    pub fn with_stacktrace(mut self, stacktrace: impl Into<String>) -> Self {
        self.stacktrace = Some(stacktrace.into());
        self
    }

    /// Derive the envelope for the next stage: `current` is replaced, the
    /// original payload and diagnostics are carried forward.
    pub fn with_current<D>(self, current: D) -> FailsafeEnvelope<O, D> {
        FailsafeEnvelope {
            original: self.original,
            current,
            error_message: self.error_message,
            stacktrace: self.stacktrace,
        }
    }

    /// Annotate with a transform failure. Both diagnostic fields are replaced
    /// by the failure's message and trace; payloads stay as they were.
    #[must_use]
    pub fn fail(mut self, failure: &TransformFailure) -> Self {
        self.error_message = Some(failure.message().to_owned());
        self.stacktrace = failure.trace().map(str::to_owned);
        self
    }

    /// Drop everything but the original payload.
    pub fn into_original(self) -> O {
        self.original
    }

    /// Split into `(original, current, error_message, stacktrace)`.
    pub fn into_parts(self) -> (O, C, Option<String>, Option<String>) {
        (
            self.original,
            self.current,
            self.error_message,
            self.stacktrace,
        )
    }
}

impl<T: Clone> FailsafeEnvelope<T, T> {
    /// Entry point of a record into the pipeline: original = current = `raw`.
    pub fn ingest(raw: T) -> Self {
        Self::new(raw.clone(), raw)
    }
}
