//! Payload codecs used by the keyed store.
//!
//! # Responsibility
//! - Convert in-memory values to the JSON payload stored inside an envelope.
//! - Keep date handling in one place so feature slices never hand-roll it.
//!
//! # Invariants
//! - Encoding never mutates the in-memory value.
//! - Decoding failures are reported as `CodecError`, never panics.

pub mod iso8601;
pub mod temporal;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use temporal::{DateAwareCodec, TemporalValue};

pub type CodecResult<T> = Result<T, CodecError>;

/// Codec error for payload conversion.
#[derive(Debug)]
pub enum CodecError {
    /// In-memory value could not be represented as JSON.
    Encode(serde_json::Error),
    /// Stored payload does not match the expected shape.
    Decode(serde_json::Error),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "payload encode failed: {err}"),
            Self::Decode(err) => write!(f, "payload decode failed: {err}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) | Self::Decode(err) => Some(err),
        }
    }
}

/// Encode/decode pair applied around every envelope payload.
pub trait PayloadCodec<T> {
    fn encode(&self, value: &T) -> CodecResult<Value>;
    fn decode(&self, payload: Value) -> CodecResult<T>;
}

/// Typed codec: each entity declares its temporal fields through serde.
///
/// Date fields use the `iso8601::utc` / `iso8601::utc_option` helpers, so the
/// payload carries canonical timestamps without any field-name heuristics.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeCodec;

impl<T> PayloadCodec<T> for SerdeCodec
where
    T: Serialize + DeserializeOwned,
{
    fn encode(&self, value: &T) -> CodecResult<Value> {
        serde_json::to_value(value).map_err(CodecError::Encode)
    }

    fn decode(&self, payload: Value) -> CodecResult<T> {
        serde_json::from_value(payload).map_err(CodecError::Decode)
    }
}
