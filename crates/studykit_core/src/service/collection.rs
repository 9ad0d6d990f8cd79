//! Shared plumbing for list-shaped slices.

use super::{ServiceError, ServiceResult};
use crate::codec::SerdeCodec;
use crate::store::{KeyedState, KeyedStore, StorageBackend};
use serde::de::DeserializeOwned;
use log::warn;
use serde::Serialize;
use std::fmt::Display;
use uuid::Uuid;

/// Entity stored in a list slice.
pub(crate) trait Record: Clone + Serialize + DeserializeOwned {
    const KIND: &'static str;
    type Invalid: Display;

    fn id(&self) -> Uuid;

    /// Entity invariants; loaded records failing them are dropped.
    fn check(&self) -> Result<(), Self::Invalid>;
}

/// Binding over `Vec<R>` with id-based mutation helpers.
pub(crate) struct Collection<'s, R: Record, B: StorageBackend> {
    state: KeyedState<'s, Vec<R>, B, SerdeCodec>,
}

impl<'s, R: Record, B: StorageBackend> Collection<'s, R, B> {
    /// Binds `short_name` and runs the initial load.
    ///
    /// Stored records that violate their invariants are dropped and the
    /// remaining slice is written back.
    pub(crate) fn open(store: &'s KeyedStore<B>, short_name: &str) -> ServiceResult<Self> {
        let mut state = KeyedState::new(store, short_name, Vec::new(), SerdeCodec)
            .map_err(ServiceError::Binding)?;
        state.mount();

        let loaded: &Vec<R> = state.value();
        let valid = loaded
            .iter()
            .filter(|record| match record.check() {
                Ok(()) => true,
                Err(err) => {
                    warn!(
                        "event=slice_load module=service status=dropped key={short_name} kind={} id={} error={err}",
                        R::KIND,
                        record.id()
                    );
                    false
                }
            })
            .cloned()
            .collect::<Vec<_>>();
        if valid.len() != loaded.len() {
            if let Err(err) = state.set(valid) {
                warn!(
                    "event=slice_load module=service status=error key={short_name} error_code={}",
                    err.code()
                );
            }
        }
        Ok(Self { state })
    }

    pub(crate) fn items(&self) -> &[R] {
        self.state.value()
    }

    pub(crate) fn get(&self, id: Uuid) -> Option<&R> {
        self.items().iter().find(|item| item.id() == id)
    }

    pub(crate) fn insert(&mut self, record: R) -> ServiceResult<R> {
        let mut next = self.items().to_vec();
        next.push(record.clone());
        self.commit(next)?;
        Ok(record)
    }

    /// Applies `f` to a copy of one record and commits the result.
    pub(crate) fn modify<E>(
        &mut self,
        id: Uuid,
        f: impl FnOnce(&mut R) -> Result<(), E>,
    ) -> ServiceResult<R>
    where
        ServiceError: From<E>,
    {
        let index = self.position(id)?;
        let mut next = self.items().to_vec();
        f(&mut next[index])?;
        let updated = next[index].clone();
        self.commit(next)?;
        Ok(updated)
    }

    pub(crate) fn remove(&mut self, id: Uuid) -> ServiceResult<R> {
        let index = self.position(id)?;
        let mut next = self.items().to_vec();
        let removed = next.remove(index);
        self.commit(next)?;
        Ok(removed)
    }

    pub(crate) fn persistence_degraded(&self) -> bool {
        self.state.persistence_degraded()
    }

    fn position(&self, id: Uuid) -> ServiceResult<usize> {
        self.items()
            .iter()
            .position(|item| item.id() == id)
            .ok_or(ServiceError::NotFound { kind: R::KIND, id })
    }

    fn commit(&mut self, next: Vec<R>) -> ServiceResult<()> {
        self.state.set(next).map_err(ServiceError::Persistence)
    }
}
