//! Storage port for raw string entries.
//!
//! # Responsibility
//! - Define the minimal key/value contract the keyed store depends on.
//! - Provide an in-process implementation for tests and ephemeral sessions.
//!
//! # Invariants
//! - Backends store opaque strings; envelopes are built by `KeyedStore`.
//! - Methods take `&self`; implementations are single-threaded and use
//!   interior mutability where needed.

use crate::db::DbError;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type BackendResult<T> = Result<T, BackendError>;

/// Transport-level storage failure.
#[derive(Debug)]
pub enum BackendError {
    /// Write rejected because it would exceed the storage quota.
    QuotaExceeded {
        key: String,
        requested_bytes: usize,
        limit_bytes: usize,
    },
    /// Storage is disabled or otherwise not reachable.
    Unavailable(String),
    Db(DbError),
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QuotaExceeded {
                key,
                requested_bytes,
                limit_bytes,
            } => write!(
                f,
                "storage quota exceeded writing `{key}`: {requested_bytes} bytes over limit {limit_bytes}"
            ),
            Self::Unavailable(reason) => write!(f, "storage unavailable: {reason}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BackendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for BackendError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for BackendError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Raw key/value port, modelled on browser-style local storage.
pub trait StorageBackend {
    fn get_item(&self, key: &str) -> BackendResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> BackendResult<()>;
    fn remove_item(&self, key: &str) -> BackendResult<()>;
    /// Returns every stored key, sorted ascending.
    fn keys(&self) -> BackendResult<Vec<String>>;
}

impl<B: StorageBackend + ?Sized> StorageBackend for &B {
    fn get_item(&self, key: &str) -> BackendResult<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> BackendResult<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> BackendResult<()> {
        (**self).remove_item(key)
    }

    fn keys(&self) -> BackendResult<Vec<String>> {
        (**self).keys()
    }
}

/// In-process backend with an optional byte quota.
///
/// Quota accounting counts key and value bytes of every entry, which is how
/// browser storage reports usage.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RefCell<BTreeMap<String, String>>,
    quota_bytes: Option<usize>,
    disabled: Cell<bool>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend that rejects writes past `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::default()
        }
    }

    /// Makes every subsequent call fail with `BackendError::Unavailable`.
    pub fn disable(&self) {
        self.disabled.set(true);
    }

    pub fn enable(&self) {
        self.disabled.set(false);
    }

    /// Current usage in bytes (keys + values).
    pub fn used_bytes(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .map(|(key, value)| key.len() + value.len())
            .sum()
    }

    fn ensure_enabled(&self) -> BackendResult<()> {
        if self.disabled.get() {
            return Err(BackendError::Unavailable(
                "memory backend disabled".to_string(),
            ));
        }
        Ok(())
    }
}

impl StorageBackend for MemoryBackend {
    fn get_item(&self, key: &str) -> BackendResult<Option<String>> {
        self.ensure_enabled()?;
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> BackendResult<()> {
        self.ensure_enabled()?;
        if let Some(limit_bytes) = self.quota_bytes {
            let existing = self
                .entries
                .borrow()
                .get(key)
                .map_or(0, |old| key.len() + old.len());
            let requested_bytes = self.used_bytes() - existing + key.len() + value.len();
            if requested_bytes > limit_bytes {
                return Err(BackendError::QuotaExceeded {
                    key: key.to_string(),
                    requested_bytes,
                    limit_bytes,
                });
            }
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> BackendResult<()> {
        self.ensure_enabled()?;
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn keys(&self) -> BackendResult<Vec<String>> {
        self.ensure_enabled()?;
        Ok(self.entries.borrow().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{BackendError, MemoryBackend, StorageBackend};

    #[test]
    fn quota_rejects_oversized_write_and_keeps_previous_value() {
        let backend = MemoryBackend::with_quota(16);
        backend.set_item("k", "small").unwrap();

        let err = backend.set_item("k", "this value is far too long").unwrap_err();
        assert!(matches!(err, BackendError::QuotaExceeded { limit_bytes: 16, .. }));
        assert_eq!(backend.get_item("k").unwrap().as_deref(), Some("small"));
    }

    #[test]
    fn quota_counts_replacement_not_sum() {
        let backend = MemoryBackend::with_quota(10);
        backend.set_item("k", "123456789").unwrap();
        backend.set_item("k", "987654321").unwrap();
        assert_eq!(backend.used_bytes(), 10);
    }

    #[test]
    fn disabled_backend_fails_every_call() {
        let backend = MemoryBackend::new();
        backend.disable();
        assert!(matches!(
            backend.get_item("k"),
            Err(BackendError::Unavailable(_))
        ));
        backend.enable();
        assert!(backend.get_item("k").unwrap().is_none());
    }
}
