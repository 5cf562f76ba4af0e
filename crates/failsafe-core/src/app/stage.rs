//! FailsafeStage - Transform を包んで失敗を envelope に記録する
//!
//! # フロー
//! 1. 既に failed の envelope はそのまま通す（再処理しない）
//! 2. `Transform::apply(current)` を実行
//! 3. 成功: current を置き換えた新しい envelope
//! 4. 失敗 / panic: current は失敗前のまま、診断情報を付けた envelope

use std::panic::{self, AssertUnwindSafe};

use super::config::StageConfig;
use crate::domain::envelope::FailsafeEnvelope;
use crate::domain::errors::TransformFailure;
use crate::typed::Transform;

/// Result of running one envelope through a stage.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome<O, C, D> {
    /// The transform succeeded; `current` now holds its output.
    Succeeded(FailsafeEnvelope<O, D>),
    /// The envelope carries diagnostics and its pre-failure `current`.
    Failed(FailsafeEnvelope<O, C>),
}

impl<O, C, D> StageOutcome<O, C, D> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    /// `Ok` for the main output, `Err` for the dead-letter path.
    pub fn into_result(self) -> Result<FailsafeEnvelope<O, D>, FailsafeEnvelope<O, C>> {
        match self {
            Self::Succeeded(envelope) => Ok(envelope),
            Self::Failed(envelope) => Err(envelope),
        }
    }
}

/// Wraps a [`Transform`] so that a bad record never aborts the pipeline.
pub struct FailsafeStage<T> {
    transform: T,
    config: StageConfig,
}

impl<T> FailsafeStage<T> {
    pub fn new(transform: T) -> Self {
        Self::with_config(transform, StageConfig::default())
    }

    pub fn with_config(transform: T, config: StageConfig) -> Self {
        Self { transform, config }
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    pub fn transform(&self) -> &T {
        &self.transform
    }

    /// Run the transform on `envelope.current()` and derive the next envelope.
    ///
    /// Caught panics still go through the process panic hook, so the default
    /// hook prints them to stderr. Callers that write records to stderr should
    /// install their own hook or send dead letters elsewhere.
    pub fn process<O, C>(
        &self,
        envelope: FailsafeEnvelope<O, C>,
    ) -> StageOutcome<O, C, <T as Transform<C>>::Output>
    where
        T: Transform<C>,
    {
        let stage = Transform::<C>::name(&self.transform);

        if envelope.is_failed() {
            tracing::debug!(stage, "skipping already failed record");
            return StageOutcome::Failed(envelope);
        }

        let result = if self.config.catch_panics {
            panic::catch_unwind(AssertUnwindSafe(|| self.transform.apply(envelope.current())))
                .unwrap_or_else(|payload| Err(TransformFailure::from_panic(&*payload)))
        } else {
            self.transform.apply(envelope.current())
        };

        match result {
            Ok(output) => StageOutcome::Succeeded(envelope.with_current(output)),
            Err(failure) => {
                let failure = self.shape(failure);
                tracing::warn!(
                    stage,
                    error = failure.message(),
                    "transform failed, record will be dead-lettered"
                );
                StageOutcome::Failed(envelope.fail(&failure))
            }
        }
    }

    fn shape(&self, failure: TransformFailure) -> TransformFailure {
        let failure = if self.config.capture_stacktrace {
            failure
        } else {
            failure.without_trace()
        };
        match self.config.max_error_message_len {
            Some(max) => failure.truncated(max),
            None => failure,
        }
    }
}
