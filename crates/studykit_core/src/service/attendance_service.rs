//! Attendance use-case service.
//!
//! # Responsibility
//! - Create, mark, edit and delete attendance subjects.
//! - Derive per-subject projections and an overall summary.
//!
//! # Invariants
//! - Every stored subject passes `AttendanceSubject::validate()` after a
//!   mutation made through this service.
//! - Projections are computed on demand and never persisted.

use super::attendance_projection::{project_attendance, AttendanceProjection};
use super::collection::{Collection, Record};
use super::{ServiceError, ServiceResult};
use crate::model::attendance::{
    AttendanceSubject, AttendanceValidationError, SubjectId, DEFAULT_TARGET_PERCENTAGE,
};
use crate::store::keys::ATTENDANCE_SUBJECTS_KEY;
use crate::store::{KeyedStore, StorageBackend};
use log::info;
use uuid::Uuid;

impl Record for AttendanceSubject {
    const KIND: &'static str = "attendance subject";
    type Invalid = AttendanceValidationError;

    fn id(&self) -> Uuid {
        self.id
    }

    fn check(&self) -> Result<(), Self::Invalid> {
        self.validate()
    }
}

/// Request model for creating a subject.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateSubjectRequest {
    pub name: String,
    pub total_classes: u32,
    pub attended_classes: u32,
    /// Falls back to `DEFAULT_TARGET_PERCENTAGE` when `None`.
    pub target_percentage: Option<f64>,
}

/// Direct-edit patch; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubjectPatch {
    pub name: Option<String>,
    pub total_classes: Option<u32>,
    pub attended_classes: Option<u32>,
    pub target_percentage: Option<f64>,
}

/// Aggregate across all subjects.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceSummary {
    pub subject_count: usize,
    pub total_classes: u64,
    pub attended_classes: u64,
    /// `0` when no class has been recorded.
    pub overall_percentage: f64,
    pub subjects_on_track: usize,
}

/// Attendance facade over the `attendance-subjects` slice.
pub struct AttendanceService<'s, B: StorageBackend> {
    subjects: Collection<'s, AttendanceSubject, B>,
}

impl<'s, B: StorageBackend> AttendanceService<'s, B> {
    /// Binds the attendance slice and loads persisted subjects.
    pub fn open(store: &'s KeyedStore<B>) -> ServiceResult<Self> {
        Ok(Self {
            subjects: Collection::open(store, ATTENDANCE_SUBJECTS_KEY)?,
        })
    }

    pub fn list_subjects(&self) -> &[AttendanceSubject] {
        self.subjects.items()
    }

    pub fn get_subject(&self, id: SubjectId) -> Option<&AttendanceSubject> {
        self.subjects.get(id)
    }

    pub fn create_subject(
        &mut self,
        request: &CreateSubjectRequest,
    ) -> ServiceResult<AttendanceSubject> {
        let subject = AttendanceSubject::new(
            request.name.as_str(),
            request.total_classes,
            request.attended_classes,
            request
                .target_percentage
                .unwrap_or(DEFAULT_TARGET_PERCENTAGE),
        )?;
        info!(
            "event=attendance_create module=service status=ok subject_id={}",
            subject.id
        );
        self.subjects.insert(subject)
    }

    /// Records an attended class (total and attended both +1).
    pub fn mark_present(&mut self, id: SubjectId) -> ServiceResult<AttendanceSubject> {
        self.subjects.modify(id, AttendanceSubject::mark_present)
    }

    /// Records a missed class (total +1).
    pub fn mark_absent(&mut self, id: SubjectId) -> ServiceResult<AttendanceSubject> {
        self.subjects.modify(id, AttendanceSubject::mark_absent)
    }

    /// Applies a direct edit; the result must satisfy every invariant.
    pub fn edit_subject(
        &mut self,
        id: SubjectId,
        patch: &SubjectPatch,
    ) -> ServiceResult<AttendanceSubject> {
        self.subjects
            .modify(id, |subject| -> Result<(), AttendanceValidationError> {
                if let Some(name) = &patch.name {
                    subject.name = name.trim().to_string();
                }
                if let Some(total) = patch.total_classes {
                    subject.total_classes = total;
                }
                if let Some(attended) = patch.attended_classes {
                    subject.attended_classes = attended;
                }
                if let Some(target) = patch.target_percentage {
                    subject.target_percentage = target;
                }
                subject.validate()?;
                subject.touch();
                Ok(())
            })
    }

    pub fn delete_subject(&mut self, id: SubjectId) -> ServiceResult<()> {
        self.subjects.remove(id)?;
        info!("event=attendance_delete module=service status=ok subject_id={id}");
        Ok(())
    }

    /// Projection for one subject against its own target.
    pub fn project_subject(&self, id: SubjectId) -> ServiceResult<AttendanceProjection> {
        let subject = self
            .subjects
            .get(id)
            .ok_or(ServiceError::NotFound {
                kind: AttendanceSubject::KIND,
                id,
            })?;
        Ok(project_attendance(
            subject.total_classes,
            subject.attended_classes,
            subject.target_percentage,
        )?)
    }

    pub fn overall_summary(&self) -> AttendanceSummary {
        let subjects = self.subjects.items();
        let total_classes: u64 = subjects
            .iter()
            .map(|subject| u64::from(subject.total_classes))
            .sum();
        let attended_classes: u64 = subjects
            .iter()
            .map(|subject| u64::from(subject.attended_classes))
            .sum();
        let overall_percentage = if total_classes == 0 {
            0.0
        } else {
            attended_classes as f64 * 100.0 / total_classes as f64
        };
        let subjects_on_track = subjects
            .iter()
            .filter_map(|subject| {
                project_attendance(
                    subject.total_classes,
                    subject.attended_classes,
                    subject.target_percentage,
                )
                .ok()
            })
            .filter(|projection| projection.is_on_track)
            .count();

        AttendanceSummary {
            subject_count: subjects.len(),
            total_classes,
            attended_classes,
            overall_percentage,
            subjects_on_track,
        }
    }

    /// True when recent changes may not have been saved.
    pub fn persistence_degraded(&self) -> bool {
        self.subjects.persistence_degraded()
    }
}
