//! EnvelopeCodec - payload codec を組み合わせた envelope の直列化
//!
//! Frame layout (all integers big-endian):
//!
//! ```text
//! magic:u8 = 0xFE | version:u8 = 1
//! original_len:u32 | original bytes        (OC)
//! current_len:u32  | current bytes         (CC)
//! has_error:u8     | [len:u32 | utf-8]     (error_message)
//! has_trace:u8     | [len:u32 | utf-8]     (stacktrace)
//! ```

use bytes::{Buf, BufMut, BytesMut};

use super::codec::PayloadCodec;
use crate::domain::envelope::FailsafeEnvelope;
use crate::domain::errors::CodecError;

const FRAME_MAGIC: u8 = 0xFE;
const FRAME_VERSION: u8 = 1;

const ABSENT: u8 = 0;
const PRESENT: u8 = 1;

/// Serializes `FailsafeEnvelope<O, C>` given one codec for `O` and one for `C`.
///
/// ```
/// use failsafe_core::FailsafeEnvelope;
/// use failsafe_core::typed::{BytesCodec, EnvelopeCodec, PayloadCodec, Utf8Codec};
///
/// let codec = EnvelopeCodec::new(BytesCodec, Utf8Codec);
/// let env = FailsafeEnvelope::new(b"raw".to_vec(), "parsed".to_string())
///     .with_error_message("bad field");
///
/// let bytes = codec.encode(&env).unwrap();
/// let back: FailsafeEnvelope<Vec<u8>, String> = codec.decode(&bytes).unwrap();
/// assert_eq!(back, env);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnvelopeCodec<OC, CC> {
    original: OC,
    current: CC,
}

impl<OC, CC> EnvelopeCodec<OC, CC> {
    pub fn new(original: OC, current: CC) -> Self {
        Self { original, current }
    }
}

impl<O, C, OC, CC> PayloadCodec<FailsafeEnvelope<O, C>> for EnvelopeCodec<OC, CC>
where
    OC: PayloadCodec<O>,
    CC: PayloadCodec<C>,
{
    fn encode(&self, envelope: &FailsafeEnvelope<O, C>) -> Result<Vec<u8>, CodecError> {
        let original = self.original.encode(envelope.original())?;
        let current = self.current.encode(envelope.current())?;
        let error_message = envelope.error_message();
        let stacktrace = envelope.stacktrace();

        let capacity = 2
            + 4
            + original.len()
            + 4
            + current.len()
            + 5
            + error_message.map_or(0, str::len)
            + 5
            + stacktrace.map_or(0, str::len);
        let mut buf = BytesMut::with_capacity(capacity);

        buf.put_u8(FRAME_MAGIC);
        buf.put_u8(FRAME_VERSION);
        put_section(&mut buf, &original)?;
        put_section(&mut buf, &current)?;
        put_optional(&mut buf, error_message)?;
        put_optional(&mut buf, stacktrace)?;

        Ok(buf.to_vec())
    }

    fn decode(&self, bytes: &[u8]) -> Result<FailsafeEnvelope<O, C>, CodecError> {
        let mut buf = bytes;

        let magic = take_u8(&mut buf)?;
        if magic != FRAME_MAGIC {
            return Err(CodecError::BadMagic(magic));
        }
        let version = take_u8(&mut buf)?;
        if version != FRAME_VERSION {
            return Err(CodecError::UnsupportedVersion(version));
        }

        let original = self.original.decode(take_section(&mut buf)?)?;
        let current = self.current.decode(take_section(&mut buf)?)?;
        let error_message = take_optional(&mut buf, "error_message")?;
        let stacktrace = take_optional(&mut buf, "stacktrace")?;

        if buf.has_remaining() {
            return Err(CodecError::TrailingBytes(buf.remaining()));
        }

        let mut envelope = FailsafeEnvelope::new(original, current);
        if let Some(message) = error_message {
            envelope = envelope.with_error_message(message);
        }
        if let Some(trace) = stacktrace {
            envelope = envelope.with_stacktrace(trace);
        }
        Ok(envelope)
    }
}

fn put_section(buf: &mut BytesMut, section: &[u8]) -> Result<(), CodecError> {
    let len = u32::try_from(section.len()).map_err(|_| CodecError::TooLarge(section.len()))?;
    buf.put_u32(len);
    buf.put_slice(section);
    Ok(())
}

fn put_optional(buf: &mut BytesMut, value: Option<&str>) -> Result<(), CodecError> {
    match value {
        Some(s) => {
            buf.put_u8(PRESENT);
            put_section(buf, s.as_bytes())
        }
        None => {
            buf.put_u8(ABSENT);
            Ok(())
        }
    }
}

fn take_u8(buf: &mut &[u8]) -> Result<u8, CodecError> {
    if !buf.has_remaining() {
        return Err(CodecError::Truncated { needed: 1 });
    }
    Ok(buf.get_u8())
}

fn take_section<'a>(buf: &mut &'a [u8]) -> Result<&'a [u8], CodecError> {
    if buf.remaining() < 4 {
        return Err(CodecError::Truncated {
            needed: 4 - buf.remaining(),
        });
    }
    let len = buf.get_u32() as usize;
    if buf.len() < len {
        return Err(CodecError::Truncated {
            needed: len - buf.len(),
        });
    }
    let remaining: &'a [u8] = *buf;
    let (section, rest) = remaining.split_at(len);
    *buf = rest;
    Ok(section)
}

fn take_optional(buf: &mut &[u8], field: &'static str) -> Result<Option<String>, CodecError> {
    match take_u8(buf)? {
        ABSENT => Ok(None),
        PRESENT => {
            let section = take_section(buf)?;
            String::from_utf8(section.to_vec())
                .map(Some)
                .map_err(|source| CodecError::InvalidUtf8 { field, source })
        }
        flag => Err(CodecError::InvalidFlag { field, flag }),
    }
}
