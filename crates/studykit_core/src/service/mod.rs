//! Feature use-case services.
//!
//! # Responsibility
//! - Own one keyed slice per feature through a `KeyedState` binding.
//! - Validate every mutation before it reaches the binding.
//!
//! # Invariants
//! - A mutation is applied in memory before it is persisted; a failed write
//!   surfaces as `ServiceError::Persistence` and the change is kept.
//! - Services never touch another feature's slice.

pub mod attendance_projection;
pub mod attendance_service;
mod collection;
pub mod note_service;
pub mod task_service;

use crate::model::attendance::AttendanceValidationError;
use crate::model::note::NoteValidationError;
use crate::model::task::TaskValidationError;
use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    Attendance(AttendanceValidationError),
    Task(TaskValidationError),
    Note(NoteValidationError),
    NotFound {
        kind: &'static str,
        id: Uuid,
    },
    /// Slice could not be bound (invalid key or already bound).
    Binding(StoreError),
    /// Change applied in memory but not persisted.
    Persistence(StoreError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Attendance(err) => write!(f, "{err}"),
            Self::Task(err) => write!(f, "{err}"),
            Self::Note(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Binding(err) => write!(f, "slice binding failed: {err}"),
            Self::Persistence(err) => write!(f, "changes may not be saved: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Attendance(err) => Some(err),
            Self::Task(err) => Some(err),
            Self::Note(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::Binding(err) | Self::Persistence(err) => Some(err),
        }
    }
}

impl From<AttendanceValidationError> for ServiceError {
    fn from(value: AttendanceValidationError) -> Self {
        Self::Attendance(value)
    }
}

impl From<TaskValidationError> for ServiceError {
    fn from(value: TaskValidationError) -> Self {
        Self::Task(value)
    }
}

impl From<NoteValidationError> for ServiceError {
    fn from(value: NoteValidationError) -> Self {
        Self::Note(value)
    }
}
