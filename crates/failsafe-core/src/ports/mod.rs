//! Ports - 抽象化レイヤー
//!
//! The seams the surrounding pipeline framework plugs into: where failed
//! records go, what time it is, and how dead-letter ids are minted.

pub mod clock;
pub mod dead_letter_sink;
pub mod id_generator;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::dead_letter_sink::DeadLetterSink;
pub use self::id_generator::{IdGenerator, UlidGenerator};
