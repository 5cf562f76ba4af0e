//! Domain model (envelope, row payloads, dead-letter records, ids, errors).

pub mod dead_letter;
pub mod envelope;
pub mod errors;
pub mod ids;
pub mod row;

pub use dead_letter::DeadLetterRecord;
pub use envelope::FailsafeEnvelope;
pub use errors::{CodecError, ConversionError, SinkError, TransformFailure};
pub use ids::{DeadLetterId, IdParseError};
pub use row::{ParseRow, Row, Value};
