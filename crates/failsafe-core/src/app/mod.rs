//! App - アプリケーション層
//!
//! Ports と typed API を組み合わせて failsafe な処理を組み立てます。
//!
//! # 主要コンポーネント
//! - **StageConfig**: per-stage failure handling options
//! - **FailsafeStage**: runs a `Transform` and turns failures into envelope diagnostics
//! - **DeadLetterRouter**: forwards healthy envelopes, sends failed ones to a sink

pub mod config;
pub mod router;
pub mod stage;

pub use self::config::StageConfig;
pub use self::router::{DeadLetterRouter, RouteCounts};
pub use self::stage::{FailsafeStage, StageOutcome};
