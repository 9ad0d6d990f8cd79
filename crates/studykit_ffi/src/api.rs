//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Keep error semantics simple: envelopes with `ok` + `message`.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Store read-modify-write cycles are serialized within the process.

use chrono::{DateTime, Utc};
use log::warn;
use std::sync::{Mutex, OnceLock};
use studykit_core::db::open_db;
use studykit_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    project_attendance, AttendanceProjection, AttendanceService, AttendanceSubject,
    ClassesNeeded, CoreConfig, CreateSubjectRequest, KeyedStore, ServiceError, SkipAllowance,
    SqliteBackend, TaskPriority, TaskService,
};
use uuid::Uuid;

static ENTRY_CONFIG: OnceLock<CoreConfig> = OnceLock::new();
static STORE_LOCK: Mutex<()> = Mutex::new(());

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryActionResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// ID of the created or mutated record.
    pub record_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
    /// True when the change is visible but may not have been saved.
    pub unsaved: bool,
}

impl EntryActionResponse {
    fn success(message: impl Into<String>, record_id: String) -> Self {
        Self {
            ok: true,
            record_id: Some(record_id),
            message: message.into(),
            unsaved: false,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            record_id: None,
            message: message.into(),
            unsaved: false,
        }
    }

    fn from_service_error(operation: &str, err: ServiceError) -> Self {
        let unsaved = matches!(err, ServiceError::Persistence(_));
        Self {
            unsaved,
            ..Self::failure(format!("{operation} failed: {err}"))
        }
    }
}

/// Projection view with flattened optional counts.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceProjectionView {
    pub ok: bool,
    pub message: String,
    pub current_percentage: f64,
    /// `None` when skips are unlimited (0% target).
    pub classes_to_skip: Option<u32>,
    /// `None` when the target can no longer be reached (100% after a miss).
    pub classes_needed: Option<u32>,
    pub is_on_track: bool,
}

/// One row of the attendance list.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceSubjectItem {
    pub subject_id: String,
    pub name: String,
    pub total_classes: u32,
    pub attended_classes: u32,
    pub target_percentage: f64,
    pub current_percentage: f64,
    pub is_on_track: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceListResponse {
    /// False when the store could not be opened; `items` is then empty.
    pub ok: bool,
    pub items: Vec<AttendanceSubjectItem>,
    pub message: String,
}

/// Pure projection for ad-hoc counts; touches no storage.
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_project(
    total_classes: u32,
    attended_classes: u32,
    target_percentage: f64,
) -> AttendanceProjectionView {
    match project_attendance(total_classes, attended_classes, target_percentage) {
        Ok(projection) => to_projection_view(&projection),
        Err(err) => AttendanceProjectionView {
            ok: false,
            message: format!("attendance_project failed: {err}"),
            current_percentage: 0.0,
            classes_to_skip: Some(0),
            classes_needed: Some(0),
            is_on_track: false,
        },
    }
}

/// Creates an attendance subject.
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_create_subject(
    name: String,
    total_classes: u32,
    attended_classes: u32,
    target_percentage: Option<f64>,
) -> EntryActionResponse {
    let request = CreateSubjectRequest {
        name,
        total_classes,
        attended_classes,
        target_percentage,
    };
    with_store("attendance_create_subject", |store| {
        let mut service = match AttendanceService::open(store) {
            Ok(service) => service,
            Err(err) => {
                return EntryActionResponse::from_service_error("attendance_create_subject", err)
            }
        };
        match service.create_subject(&request) {
            Ok(subject) => EntryActionResponse::success("Subject created.", subject.id.to_string()),
            Err(err) => EntryActionResponse::from_service_error("attendance_create_subject", err),
        }
    })
}

/// Marks one class as attended (`present = true`) or missed.
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_mark(subject_id: String, present: bool) -> EntryActionResponse {
    let Ok(id) = Uuid::parse_str(subject_id.trim()) else {
        return EntryActionResponse::failure(format!(
            "attendance_mark failed: invalid subject id `{subject_id}`"
        ));
    };
    with_store("attendance_mark", |store| {
        let result = AttendanceService::open(store).and_then(|mut service| {
            if present {
                service.mark_present(id)
            } else {
                service.mark_absent(id)
            }
        });
        match result {
            Ok(subject) => EntryActionResponse::success(
                if present {
                    "Marked present."
                } else {
                    "Marked absent."
                },
                subject.id.to_string(),
            ),
            Err(err) => EntryActionResponse::from_service_error("attendance_mark", err),
        }
    })
}

/// Lists attendance subjects with their on-track status.
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_list() -> AttendanceListResponse {
    let mut items = Vec::new();
    let response = with_store("attendance_list", |store| {
        match AttendanceService::open(store) {
            Ok(service) => {
                items = service
                    .list_subjects()
                    .iter()
                    .map(to_subject_item)
                    .collect();
                EntryActionResponse {
                    ok: true,
                    record_id: None,
                    message: format!("Found {} subject(s).", items.len()),
                    unsaved: false,
                }
            }
            Err(err) => EntryActionResponse::from_service_error("attendance_list", err),
        }
    });
    AttendanceListResponse {
        ok: response.ok,
        items,
        message: response.message,
    }
}

/// Adds a task with optional due time in epoch milliseconds.
#[flutter_rust_bridge::frb(sync)]
pub fn task_add(title: String, due_epoch_ms: Option<i64>) -> EntryActionResponse {
    let due_date = match due_epoch_ms {
        Some(millis) => match DateTime::<Utc>::from_timestamp_millis(millis) {
            Some(value) => Some(value),
            None => {
                return EntryActionResponse::failure(format!(
                    "task_add failed: due time `{millis}` is out of range"
                ))
            }
        },
        None => None,
    };
    with_store("task_add", |store| {
        let result = TaskService::open(store)
            .and_then(|mut service| service.add_task(title, TaskPriority::default(), due_date));
        match result {
            Ok(task) => EntryActionResponse::success("Task added.", task.id.to_string()),
            Err(err) => EntryActionResponse::from_service_error("task_add", err),
        }
    })
}

/// Deletes every entry under the configured key prefix.
#[flutter_rust_bridge::frb(sync)]
pub fn store_reset() -> EntryActionResponse {
    with_store("store_reset", |store| match store.clear() {
        Ok(removed) => EntryActionResponse {
            ok: true,
            record_id: None,
            message: format!("Removed {removed} entr(ies)."),
            unsaved: false,
        },
        Err(err) => EntryActionResponse::failure(format!("store_reset failed: {err}")),
    })
}

fn entry_config() -> &'static CoreConfig {
    ENTRY_CONFIG.get_or_init(CoreConfig::from_env)
}

fn with_store(
    operation: &str,
    f: impl FnOnce(&KeyedStore<SqliteBackend<'_>>) -> EntryActionResponse,
) -> EntryActionResponse {
    let Ok(_guard) = STORE_LOCK.lock() else {
        warn!("event=ffi_store module=ffi status=error operation={operation} error_code=lock_poisoned");
        return EntryActionResponse::failure(format!("{operation} failed: store lock poisoned"));
    };

    let config = entry_config();
    let conn = match open_db(&config.db_path) {
        Ok(conn) => conn,
        Err(err) => return EntryActionResponse::failure(format!("{operation} failed: {err}")),
    };
    let backend = match SqliteBackend::try_new(&conn) {
        Ok(backend) => backend,
        Err(err) => return EntryActionResponse::failure(format!("{operation} failed: {err}")),
    };
    let store = KeyedStore::with_prefix(backend, config.key_prefix.clone());
    f(&store)
}

fn to_projection_view(projection: &AttendanceProjection) -> AttendanceProjectionView {
    AttendanceProjectionView {
        ok: true,
        message: String::new(),
        current_percentage: projection.current_percentage,
        classes_to_skip: match projection.classes_to_skip {
            SkipAllowance::Count(count) => Some(count),
            SkipAllowance::Unlimited => None,
        },
        classes_needed: match projection.classes_needed {
            ClassesNeeded::Count(count) => Some(count),
            ClassesNeeded::Unreachable => None,
        },
        is_on_track: projection.is_on_track,
    }
}

fn to_subject_item(subject: &AttendanceSubject) -> AttendanceSubjectItem {
    let on_track = project_attendance(
        subject.total_classes,
        subject.attended_classes,
        subject.target_percentage,
    )
    .map(|projection| projection.is_on_track)
    .unwrap_or(false);
    AttendanceSubjectItem {
        subject_id: subject.id.to_string(),
        name: subject.name.clone(),
        total_classes: subject.total_classes,
        attended_classes: subject.attended_classes,
        target_percentage: subject.target_percentage,
        current_percentage: subject.current_percentage(),
        is_on_track: on_track,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        attendance_create_subject, attendance_list, attendance_mark, attendance_project,
        core_version, init_logging, ping, task_add,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_relative_log_dir() {
        let error = init_logging("info".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn attendance_project_flattens_projection() {
        let view = attendance_project(20, 18, 75.0);
        assert!(view.ok);
        assert_eq!(view.classes_to_skip, Some(4));
        assert_eq!(view.classes_needed, Some(0));

        let unreachable = attendance_project(10, 9, 100.0);
        assert_eq!(unreachable.classes_needed, None);

        let invalid = attendance_project(1, 2, 75.0);
        assert!(!invalid.ok);
        assert!(invalid.message.contains("cannot exceed"));
    }

    #[test]
    fn created_subject_can_be_marked_and_listed() {
        let name = unique_token("subject");
        let created = attendance_create_subject(name.clone(), 0, 0, Some(80.0));
        assert!(created.ok, "{}", created.message);
        let subject_id = created.record_id.expect("create should return record_id");

        let marked = attendance_mark(subject_id.clone(), true);
        assert!(marked.ok, "{}", marked.message);

        let listed = attendance_list();
        assert!(listed.ok, "{}", listed.message);
        let item = listed
            .items
            .iter()
            .find(|item| item.subject_id == subject_id)
            .expect("created subject should be listed");
        assert_eq!(item.name, name);
        assert_eq!(item.total_classes, 1);
        assert_eq!(item.attended_classes, 1);
        assert!(item.is_on_track);
    }

    #[test]
    fn attendance_mark_rejects_invalid_and_unknown_ids() {
        let invalid = attendance_mark("not-a-uuid".to_string(), true);
        assert!(!invalid.ok);

        let unknown = attendance_mark("00000000-0000-4000-8000-000000000000".to_string(), false);
        assert!(!unknown.ok);
        assert!(unknown.message.contains("not found"));
    }

    #[test]
    fn task_add_rejects_blank_title() {
        let response = task_add("   ".to_string(), None);
        assert!(!response.ok);
        assert!(response.message.contains("title"));

        let created = task_add(unique_token("task"), Some(1_700_000_000_000));
        assert!(created.ok, "{}", created.message);
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
