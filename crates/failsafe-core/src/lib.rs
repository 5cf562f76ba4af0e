//! failsafe-core
//!
//! Failsafe record handling for ingestion pipelines.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（envelope, row, dead-letter record, ids, errors）
//! - **ports**: 抽象化レイヤー（DeadLetterSink, Clock, IdGenerator）
//! - **app**: FailsafeStage, DeadLetterRouter, StageConfig
//! - **typed**: Transform trait と PayloadCodec / EnvelopeCodec
//! - **impls**: 実装（InMemoryDeadLetterSink, ChannelDeadLetterSink）
//! - **conversion**: timestamp / tag / json map / args の変換ユーティリティ

pub mod app;
pub mod conversion;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod typed;

pub use domain::envelope::FailsafeEnvelope;
