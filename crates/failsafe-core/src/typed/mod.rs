//! Typed - 型付き payload codec と Transform API
//!
//! - **codec**: `PayloadCodec<T>` and the stock codecs (JSON, bytes, UTF-8)
//! - **envelope_codec**: `EnvelopeCodec` composing two payload codecs
//! - **transform**: `Transform<I>`, the business logic a failsafe stage wraps

pub mod codec;
pub mod envelope_codec;
pub mod transform;

pub use self::codec::{BytesCodec, JsonCodec, PayloadCodec, Utf8Codec};
pub use self::envelope_codec::EnvelopeCodec;
pub use self::transform::{FnTransform, Transform};
