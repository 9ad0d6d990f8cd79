//! Reactive binding between UI state and one keyed store slice.
//!
//! # Responsibility
//! - Expose the default immediately, then the persisted value once mounted.
//! - Apply every change in memory first and persist it second.
//! - Tell callers when persistence keeps failing.
//!
//! # Invariants
//! - Phase moves `Uninitialized -> Loading -> Ready` at most once per binding;
//!   there is no way back to `Loading`.
//! - The in-memory value is authoritative once set, whatever the write outcome.
//! - A short name is bound by at most one live binding per store.

use super::backend::StorageBackend;
use super::keyed_store::KeyedStore;
use super::StoreResult;
use crate::codec::{PayloadCodec, SerdeCodec};
use log::{debug, warn};

/// Consecutive failed writes after which `persistence_degraded()` is true.
pub const WRITE_FAILURE_WARNING_THRESHOLD: u32 = 2;

/// Load state of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingPhase {
    /// Created, not mounted yet; value is the caller default.
    Uninitialized,
    /// Mount is reading from storage.
    Loading,
    /// Load attempt finished (loaded, absent, or failed and defaulted).
    Ready,
}

/// Handle returned by `KeyedState::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Listener<'s, T> = Box<dyn FnMut(&T) + 's>;

/// Reactive, persisted slice of state.
pub struct KeyedState<'s, T, B, C = SerdeCodec>
where
    B: StorageBackend,
    C: PayloadCodec<T>,
{
    store: &'s KeyedStore<B>,
    key: String,
    codec: C,
    value: T,
    phase: BindingPhase,
    locally_set: bool,
    consecutive_write_failures: u32,
    listeners: Vec<(SubscriptionId, Listener<'s, T>)>,
    next_subscription: u64,
}

impl<'s, T, B, C> KeyedState<'s, T, B, C>
where
    T: Clone,
    B: StorageBackend,
    C: PayloadCodec<T>,
{
    /// Binds `short_name` with `default` as the pre-load value.
    ///
    /// # Errors
    /// - `StoreError::Key` when the name is invalid or already bound.
    pub fn new(
        store: &'s KeyedStore<B>,
        short_name: impl Into<String>,
        default: T,
        codec: C,
    ) -> StoreResult<Self> {
        let key = short_name.into();
        store.claim(&key)?;
        Ok(Self {
            store,
            key,
            codec,
            value: default,
            phase: BindingPhase::Uninitialized,
            locally_set: false,
            consecutive_write_failures: 0,
            listeners: Vec::new(),
            next_subscription: 0,
        })
    }

    /// Runs the one-time load. Later calls are no-ops.
    ///
    /// When `set` already ran, the local value wins and storage is not read.
    pub fn mount(&mut self) {
        if self.phase != BindingPhase::Uninitialized {
            debug!(
                "event=binding_mount module=store status=skipped key={} reason=already_mounted",
                self.key
            );
            return;
        }

        self.phase = BindingPhase::Loading;
        if self.locally_set {
            debug!(
                "event=binding_mount module=store status=skipped key={} reason=local_value",
                self.key
            );
        } else {
            let fallback = self.value.clone();
            self.value = self.store.read(&self.key, fallback, &self.codec);
        }
        self.phase = BindingPhase::Ready;
        self.notify();
    }

    /// Replaces the value in memory, then persists it.
    ///
    /// # Errors
    /// Returns the write error; the new in-memory value is kept regardless.
    pub fn set(&mut self, value: T) -> StoreResult<()> {
        self.value = value;
        if self.phase == BindingPhase::Uninitialized {
            self.locally_set = true;
        }
        self.notify();

        match self.store.write(&self.key, &self.value, &self.codec) {
            Ok(_) => {
                self.consecutive_write_failures = 0;
                Ok(())
            }
            Err(err) => {
                self.consecutive_write_failures = self.consecutive_write_failures.saturating_add(1);
                if self.consecutive_write_failures == WRITE_FAILURE_WARNING_THRESHOLD {
                    warn!(
                        "event=binding_write module=store status=degraded key={} consecutive_failures={}",
                        self.key, self.consecutive_write_failures
                    );
                }
                Err(err)
            }
        }
    }

    /// Applies `f` to a copy of the current value and `set`s the result.
    pub fn update(&mut self, f: impl FnOnce(&mut T)) -> StoreResult<()> {
        let mut next = self.value.clone();
        f(&mut next);
        self.set(next)
    }

    /// Registers a listener called after every load or change.
    pub fn subscribe(&mut self, listener: impl FnMut(&T) + 's) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(candidate, _)| *candidate != id);
        self.listeners.len() != before
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn phase(&self) -> BindingPhase {
        self.phase
    }

    /// True until the mount load has completed.
    pub fn is_loading(&self) -> bool {
        self.phase != BindingPhase::Ready
    }

    pub fn consecutive_write_failures(&self) -> u32 {
        self.consecutive_write_failures
    }

    /// True when recent changes may not have been saved.
    pub fn persistence_degraded(&self) -> bool {
        self.consecutive_write_failures >= WRITE_FAILURE_WARNING_THRESHOLD
    }

    fn notify(&mut self) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.value);
        }
    }
}

impl<T, B, C> Drop for KeyedState<'_, T, B, C>
where
    B: StorageBackend,
    C: PayloadCodec<T>,
{
    fn drop(&mut self) {
        self.store.release(&self.key);
    }
}
