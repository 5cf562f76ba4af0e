//! Impls - ports の実装
//!
//! - **InMemoryDeadLetterSink**: 開発・テスト用、レコードを保持して drain できる
//! - **ChannelDeadLetterSink**: tokio mpsc で別タスクに流す

pub mod channel_dead_letter;
pub mod inmem_dead_letter;

pub use self::channel_dead_letter::ChannelDeadLetterSink;
pub use self::inmem_dead_letter::InMemoryDeadLetterSink;
