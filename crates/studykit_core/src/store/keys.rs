//! Namespaced key names and slice ownership registry.
//!
//! # Invariants
//! - A full key is always `prefix + short_name`.
//! - Short names are non-empty and use only `[a-z0-9._-]`.
//! - At most one live binding owns a short name at a time.

use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Prefix applied when no explicit prefix is configured.
pub const DEFAULT_KEY_PREFIX: &str = "studykit:";

pub const NOTES_KEY: &str = "notes";
pub const TASKS_KEY: &str = "tasks";
pub const ATTENDANCE_SUBJECTS_KEY: &str = "attendance-subjects";

/// Slice registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyRegistryError {
    InvalidShortName(String),
    AlreadyClaimed(String),
}

impl Display for KeyRegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidShortName(name) => write!(f, "invalid storage key name: `{name}`"),
            Self::AlreadyClaimed(name) => {
                write!(f, "storage key already bound by another slice: `{name}`")
            }
        }
    }
}

impl Error for KeyRegistryError {}

/// Returns whether `name` can be used as a short key name.
pub fn is_valid_short_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|ch| {
            ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '-' | '_' | '.')
        })
}

/// Tracks which short names are currently bound.
#[derive(Debug, Default)]
pub struct KeyRegistry {
    claimed: BTreeSet<String>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims one short name for exclusive binding.
    pub fn claim(&mut self, name: &str) -> Result<(), KeyRegistryError> {
        if !is_valid_short_name(name) {
            return Err(KeyRegistryError::InvalidShortName(name.to_string()));
        }
        if !self.claimed.insert(name.to_string()) {
            return Err(KeyRegistryError::AlreadyClaimed(name.to_string()));
        }
        Ok(())
    }

    /// Releases a claim; releasing an unclaimed name is a no-op.
    pub fn release(&mut self, name: &str) {
        self.claimed.remove(name);
    }

    pub fn is_claimed(&self, name: &str) -> bool {
        self.claimed.contains(name)
    }

    /// Returns claimed names in sorted order.
    pub fn claimed(&self) -> Vec<String> {
        self.claimed.iter().cloned().collect()
    }
}
