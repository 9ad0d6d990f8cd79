//! Keyed persistent store.
//!
//! # Responsibility
//! - Give each feature slice a namespaced, enveloped, codec-aware entry.
//! - Keep storage failures at this boundary: reads fall back to defaults,
//!   writes return explicit results.
//!
//! # Invariants
//! - Every written entry is a complete `Envelope`.
//! - No storage error panics or escapes `read`.
//! - Backends are injected; there is no process-global store.

pub mod backend;
pub mod envelope;
pub mod keyed_state;
pub mod keyed_store;
pub mod keys;
pub mod sqlite_backend;

use crate::codec::CodecError;
use backend::BackendError;
use keys::KeyRegistryError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use backend::{BackendResult, MemoryBackend, StorageBackend};
pub use envelope::{Envelope, SCHEMA_VERSION};
pub use keyed_state::{BindingPhase, KeyedState, SubscriptionId, WRITE_FAILURE_WARNING_THRESHOLD};
pub use keyed_store::{KeyedStore, Loaded, WriteReceipt};
pub use sqlite_backend::SqliteBackend;

pub type StoreResult<T> = Result<T, StoreError>;

/// Keyed store error.
#[derive(Debug)]
pub enum StoreError {
    Key(KeyRegistryError),
    Backend(BackendError),
    Codec(CodecError),
    /// Stored text is not a JSON envelope.
    MalformedEnvelope {
        key: String,
        source: serde_json::Error,
    },
    /// Envelope could not be rendered to text.
    Serialize(serde_json::Error),
}

impl StoreError {
    /// Stable short code for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Key(_) => "invalid_key",
            Self::Backend(BackendError::QuotaExceeded { .. }) => "quota_exceeded",
            Self::Backend(BackendError::Unavailable(_)) => "storage_unavailable",
            Self::Backend(BackendError::Db(_)) => "storage_db_failed",
            Self::Codec(_) => "codec_failed",
            Self::MalformedEnvelope { .. } => "malformed_envelope",
            Self::Serialize(_) => "serialize_failed",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Key(err) => write!(f, "{err}"),
            Self::Backend(err) => write!(f, "{err}"),
            Self::Codec(err) => write!(f, "{err}"),
            Self::MalformedEnvelope { key, source } => {
                write!(f, "malformed envelope under `{key}`: {source}")
            }
            Self::Serialize(err) => write!(f, "envelope serialize failed: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Key(err) => Some(err),
            Self::Backend(err) => Some(err),
            Self::Codec(err) => Some(err),
            Self::MalformedEnvelope { source, .. } => Some(source),
            Self::Serialize(err) => Some(err),
        }
    }
}

impl From<KeyRegistryError> for StoreError {
    fn from(value: KeyRegistryError) -> Self {
        Self::Key(value)
    }
}

impl From<BackendError> for StoreError {
    fn from(value: BackendError) -> Self {
        Self::Backend(value)
    }
}

impl From<CodecError> for StoreError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}
