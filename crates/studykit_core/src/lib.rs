//! Core domain logic for StudyKit.
//! This crate is the single source of truth for persistence and business
//! invariants; UI hosts talk to it through services or the FFI crate.

pub mod codec;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use codec::{CodecError, DateAwareCodec, PayloadCodec, SerdeCodec, TemporalValue};
pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::attendance::{
    AttendanceSubject, AttendanceValidationError, SubjectId, DEFAULT_TARGET_PERCENTAGE,
};
pub use model::note::{Note, NoteId, NoteValidationError};
pub use model::task::{Task, TaskId, TaskPriority, TaskValidationError};
pub use service::attendance_projection::{
    project_attendance, AttendanceProjection, ClassesNeeded, SkipAllowance,
};
pub use service::attendance_service::{
    AttendanceService, AttendanceSummary, CreateSubjectRequest, SubjectPatch,
};
pub use service::note_service::NoteService;
pub use service::task_service::TaskService;
pub use service::{ServiceError, ServiceResult};
pub use store::{
    BindingPhase, Envelope, KeyedState, KeyedStore, Loaded, MemoryBackend, SqliteBackend,
    StorageBackend, StoreError, StoreResult, WriteReceipt, SCHEMA_VERSION,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
