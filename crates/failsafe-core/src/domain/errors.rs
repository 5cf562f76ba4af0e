//! Errors - エラー型と分類
//!
//! - [`ConversionError`]: malformed input to a conversion utility. Surfaced to the caller.
//! - [`TransformFailure`]: a stage could not process a record. Never propagated
//!   out of a stage; it becomes diagnostics on the record's envelope.
//! - [`CodecError`]: payload or envelope (de)serialization failed.
//! - [`SinkError`]: a dead-letter destination did not accept a record.

use std::any::Any;
use std::fmt::Write as _;

use thiserror::Error;

use super::ids::DeadLetterId;

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("invalid json: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("expected a json object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("value for key '{key}' is not a string")]
    NonStringValue { key: String },
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("json codec: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid utf-8 in {field}")]
    InvalidUtf8 {
        field: &'static str,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("truncated frame: {needed} more bytes needed")]
    Truncated { needed: usize },

    #[error("bad frame magic: 0x{0:02x}")]
    BadMagic(u8),

    #[error("unsupported frame version: {0}")]
    UnsupportedVersion(u8),

    #[error("invalid presence flag for {field}: {flag}")]
    InvalidFlag { field: &'static str, flag: u8 },

    #[error("section too large to frame: {0} bytes")]
    TooLarge(usize),

    #[error("{0} trailing bytes after frame")]
    TrailingBytes(usize),
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("dead-letter sink is closed")]
    Closed,

    #[error("dead-letter sink rejected {id}: {reason}")]
    Rejected { id: DeadLetterId, reason: String },
}

/// A stage's failure to process one record.
///
/// `message` is the human-readable reason shown at the dead-letter sink.
/// `trace` is optional detail (the rendered error source chain, or a panic
/// location) that ends up in the envelope's `stacktrace`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransformFailure {
    message: String,
    trace: Option<String>,
}

impl TransformFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            trace: None,
        }
    }

    /// Build a failure from any error. The trace lists the error and each of
    /// its sources, one per line.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut trace = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            // String への write! は失敗しない
            let _ = write!(trace, "\n  caused by: {cause}");
            source = cause.source();
        }
        Self {
            message: err.to_string(),
            trace: Some(trace),
        }
    }

    /// Build a failure from a caught panic payload.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let detail = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_owned()
        };
        Self::new(format!("transform panicked: {detail}"))
    }

    #[must_use]
    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }

    #[must_use]
    pub fn without_trace(mut self) -> Self {
        self.trace = None;
        self
    }

    /// Cut the message to at most `max_len` bytes on a char boundary.
    #[must_use]
    pub fn truncated(mut self, max_len: usize) -> Self {
        if self.message.len() > max_len {
            let mut idx = max_len;
            while !self.message.is_char_boundary(idx) {
                idx -= 1;
            }
            self.message.truncate(idx);
        }
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn trace(&self) -> Option<&str> {
        self.trace.as_deref()
    }
}
