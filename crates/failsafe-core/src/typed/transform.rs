//! Transform trait - failsafe stage が包む処理の定義
//!
//! A transform only describes the happy path plus its own failure value.
//! Catching failures and turning them into envelope diagnostics is the job
//! of [`FailsafeStage`](crate::app::FailsafeStage).

use crate::domain::errors::TransformFailure;

/// One step of record processing: `I` → `Self::Output`.
///
/// # 使用例
/// ```
/// use failsafe_core::domain::TransformFailure;
/// use failsafe_core::typed::Transform;
///
/// struct Upper;
///
/// impl Transform<String> for Upper {
///     type Output = String;
///
///     fn name(&self) -> &str {
///         "upper"
///     }
///
///     fn apply(&self, input: &String) -> Result<String, TransformFailure> {
///         Ok(input.to_uppercase())
///     }
/// }
///
/// assert_eq!(Upper.apply(&"abc".to_string()).unwrap(), "ABC");
/// ```
pub trait Transform<I>: Send + Sync {
    type Output;

    /// Stage name used in logs and dead-letter provenance.
    fn name(&self) -> &str;

    fn apply(&self, input: &I) -> Result<Self::Output, TransformFailure>;
}

/// Adapter turning a named closure into a [`Transform`].
pub struct FnTransform<F> {
    name: String,
    f: F,
}

impl<F> FnTransform<F> {
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<I, R, F> Transform<I> for FnTransform<F>
where
    F: Fn(&I) -> Result<R, TransformFailure> + Send + Sync,
{
    type Output = R;

    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, input: &I) -> Result<R, TransformFailure> {
        (self.f)(input)
    }
}
