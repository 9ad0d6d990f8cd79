//! Namespaced, enveloped access to a storage backend.

use super::backend::StorageBackend;
use super::envelope::{Envelope, SCHEMA_VERSION};
use super::keys::{is_valid_short_name, KeyRegistry, KeyRegistryError, DEFAULT_KEY_PREFIX};
use super::{StoreError, StoreResult};
use crate::codec::PayloadCodec;
use log::{debug, info, warn};
use std::cell::RefCell;

/// Decoded entry plus envelope metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub value: T,
    pub written_at: i64,
    pub schema_version: String,
}

impl<T> Loaded<T> {
    pub fn is_current_schema(&self) -> bool {
        self.schema_version == SCHEMA_VERSION
    }
}

/// Result of a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReceipt {
    /// Fully-qualified storage key.
    pub key: String,
    pub written_at: i64,
    /// Size of the serialized envelope.
    pub bytes: usize,
}

/// Store facade over one backend and one key prefix.
///
/// Holds no cached values. The only in-process state is the registry of
/// short names currently bound by a `KeyedState`.
pub struct KeyedStore<B: StorageBackend> {
    backend: B,
    prefix: String,
    registry: RefCell<KeyRegistry>,
}

impl<B: StorageBackend> KeyedStore<B> {
    /// Creates a store using `DEFAULT_KEY_PREFIX`.
    pub fn new(backend: B) -> Self {
        Self::with_prefix(backend, DEFAULT_KEY_PREFIX)
    }

    pub fn with_prefix(backend: B, prefix: impl Into<String>) -> Self {
        Self {
            backend,
            prefix: prefix.into(),
            registry: RefCell::new(KeyRegistry::new()),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns `prefix + short_name` after validating the short name.
    pub fn full_key(&self, short_name: &str) -> StoreResult<String> {
        if !is_valid_short_name(short_name) {
            return Err(KeyRegistryError::InvalidShortName(short_name.to_string()).into());
        }
        Ok(format!("{}{}", self.prefix, short_name))
    }

    /// Loads and decodes one entry, surfacing every failure.
    ///
    /// Returns `Ok(None)` when nothing is stored under the key.
    pub fn load<T, C>(&self, short_name: &str, codec: &C) -> StoreResult<Option<Loaded<T>>>
    where
        C: PayloadCodec<T>,
    {
        let full_key = self.full_key(short_name)?;
        let Some(raw) = self.backend.get_item(&full_key)? else {
            return Ok(None);
        };

        let envelope: Envelope =
            serde_json::from_str(&raw).map_err(|source| StoreError::MalformedEnvelope {
                key: full_key.clone(),
                source,
            })?;
        if !envelope.is_current_schema() {
            warn!(
                "event=store_read module=store status=version_mismatch key={} stored_version={} current_version={}",
                full_key, envelope.schema_version, SCHEMA_VERSION
            );
        }

        let value = codec.decode(envelope.payload)?;
        Ok(Some(Loaded {
            value,
            written_at: envelope.written_at,
            schema_version: envelope.schema_version,
        }))
    }

    /// Reads one entry, substituting `default` on absence or any failure.
    ///
    /// Never returns an error and never writes to storage.
    pub fn read<T, C>(&self, short_name: &str, default: T, codec: &C) -> T
    where
        C: PayloadCodec<T>,
    {
        match self.load(short_name, codec) {
            Ok(Some(loaded)) => {
                debug!(
                    "event=store_read module=store status=ok key={} written_at={}",
                    short_name, loaded.written_at
                );
                loaded.value
            }
            Ok(None) => {
                debug!("event=store_read module=store status=absent key={short_name}");
                default
            }
            Err(err) => {
                warn!(
                    "event=store_read module=store status=fallback key={} error_code={} error={}",
                    short_name,
                    err.code(),
                    err
                );
                default
            }
        }
    }

    /// Encodes `value`, wraps it in a fresh envelope and persists it.
    pub fn write<T, C>(&self, short_name: &str, value: &T, codec: &C) -> StoreResult<WriteReceipt>
    where
        C: PayloadCodec<T>,
    {
        let result = self.write_inner(short_name, value, codec);
        match &result {
            Ok(receipt) => debug!(
                "event=store_write module=store status=ok key={} bytes={} written_at={}",
                short_name, receipt.bytes, receipt.written_at
            ),
            Err(err) => warn!(
                "event=store_write module=store status=error key={} error_code={} error={}",
                short_name,
                err.code(),
                err
            ),
        }
        result
    }

    fn write_inner<T, C>(&self, short_name: &str, value: &T, codec: &C) -> StoreResult<WriteReceipt>
    where
        C: PayloadCodec<T>,
    {
        let full_key = self.full_key(short_name)?;
        let envelope = Envelope::new(codec.encode(value)?);
        let raw = serde_json::to_string(&envelope).map_err(StoreError::Serialize)?;
        self.backend.set_item(&full_key, &raw)?;
        Ok(WriteReceipt {
            key: full_key,
            written_at: envelope.written_at,
            bytes: raw.len(),
        })
    }

    /// Deletes one entry. Removing a missing key succeeds.
    pub fn remove(&self, short_name: &str) -> StoreResult<()> {
        let full_key = self.full_key(short_name)?;
        self.backend.remove_item(&full_key).inspect_err(|err| {
            warn!("event=store_remove module=store status=error key={short_name} error={err}");
        })?;
        info!("event=store_remove module=store status=ok key={short_name}");
        Ok(())
    }

    /// Deletes every entry under this store's prefix.
    ///
    /// Entries written by other applications sharing the backend are kept.
    /// Returns the number of removed entries.
    pub fn clear(&self) -> StoreResult<usize> {
        let owned = self
            .backend
            .keys()?
            .into_iter()
            .filter(|key| key.starts_with(&self.prefix))
            .collect::<Vec<_>>();
        for (removed, key) in owned.iter().enumerate() {
            self.backend.remove_item(key).inspect_err(|err| {
                warn!("event=store_clear module=store status=error removed={removed} error={err}");
            })?;
        }
        info!(
            "event=store_clear module=store status=ok removed={}",
            owned.len()
        );
        Ok(owned.len())
    }

    /// Returns short names of all entries under this store's prefix.
    pub fn keys(&self) -> StoreResult<Vec<String>> {
        Ok(self
            .backend
            .keys()?
            .into_iter()
            .filter_map(|key| key.strip_prefix(self.prefix.as_str()).map(str::to_string))
            .collect())
    }

    pub(crate) fn claim(&self, short_name: &str) -> StoreResult<()> {
        self.registry.borrow_mut().claim(short_name)?;
        Ok(())
    }

    pub(crate) fn release(&self, short_name: &str) {
        self.registry.borrow_mut().release(short_name);
    }

    /// Returns whether a live binding currently owns `short_name`.
    pub fn is_bound(&self, short_name: &str) -> bool {
        self.registry.borrow().is_claimed(short_name)
    }
}

#[cfg(test)]
mod tests {
    use super::KeyedStore;
    use crate::codec::SerdeCodec;
    use crate::store::{MemoryBackend, StorageBackend};

    #[test]
    fn full_key_joins_prefix_and_short_name() {
        let store = KeyedStore::with_prefix(MemoryBackend::new(), "app:");
        assert_eq!(store.full_key("notes").unwrap(), "app:notes");
        assert!(store.full_key("").is_err());
    }

    #[test]
    fn clear_only_removes_prefixed_entries() {
        let store = KeyedStore::with_prefix(MemoryBackend::new(), "app:");
        store.write("notes", &vec!["a".to_string()], &SerdeCodec).unwrap();
        store.backend().set_item("other:notes", "{}").unwrap();

        assert_eq!(store.clear().unwrap(), 1);
        assert_eq!(
            store.backend().keys().unwrap(),
            vec!["other:notes".to_string()]
        );
    }

    #[test]
    fn keys_lists_short_names() {
        let store = KeyedStore::new(MemoryBackend::new());
        store.write("tasks", &0_u32, &SerdeCodec).unwrap();
        store.write("notes", &0_u32, &SerdeCodec).unwrap();
        assert_eq!(
            store.keys().unwrap(),
            vec!["notes".to_string(), "tasks".to_string()]
        );
    }
}
