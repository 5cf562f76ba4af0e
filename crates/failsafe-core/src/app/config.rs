//! Stage configuration.

use serde::{Deserialize, Serialize};

/// How a failsafe stage records failures.
///
/// Missing fields fall back to [`StageConfig::default`], so `{}` is a valid
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Keep the failure trace in the envelope's `stacktrace`.
    pub capture_stacktrace: bool,

    /// Upper bound (bytes) for the error message stored on the envelope.
    pub max_error_message_len: Option<usize>,

    /// Catch panics from the transform and dead-letter the record instead of unwinding.
    pub catch_panics: bool,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            capture_stacktrace: true,
            max_error_message_len: Some(4096),
            catch_panics: true,
        }
    }
}

impl StageConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
