//! Attendance subject model.
//!
//! # Responsibility
//! - Hold recorded class counts and the target percentage for one course.
//! - Provide the only sanctioned count mutations (`mark_present`,
//!   `mark_absent`).
//!
//! # Invariants
//! - `attended_classes <= total_classes`.
//! - `target_percentage` is finite and within `[0, 100]`.
//! - Each mark operation increases `total_classes` by exactly one.

use crate::codec::iso8601;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type SubjectId = Uuid;

/// Target used when a subject is created without one.
pub const DEFAULT_TARGET_PERCENTAGE: f64 = 75.0;

/// Validation failure for attendance data.
#[derive(Debug, Clone, PartialEq)]
pub enum AttendanceValidationError {
    EmptyName,
    AttendedExceedsTotal { attended: u32, total: u32 },
    TargetOutOfRange(f64),
    /// Recording one more class would overflow the counter.
    CountOverflow,
}

impl Display for AttendanceValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "subject name cannot be empty"),
            Self::AttendedExceedsTotal { attended, total } => write!(
                f,
                "attended classes ({attended}) cannot exceed total classes ({total})"
            ),
            Self::TargetOutOfRange(value) => {
                write!(f, "target percentage must be within 0..=100, got {value}")
            }
            Self::CountOverflow => write!(f, "class count overflow"),
        }
    }
}

impl Error for AttendanceValidationError {}

/// One tracked course/class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSubject {
    pub id: SubjectId,
    pub name: String,
    pub total_classes: u32,
    pub attended_classes: u32,
    pub target_percentage: f64,
    #[serde(with = "iso8601::utc")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso8601::utc")]
    pub updated_at: DateTime<Utc>,
}

impl AttendanceSubject {
    /// Creates a validated subject with a generated ID.
    pub fn new(
        name: impl Into<String>,
        total_classes: u32,
        attended_classes: u32,
        target_percentage: f64,
    ) -> Result<Self, AttendanceValidationError> {
        let now = iso8601::now_utc();
        let subject = Self {
            id: Uuid::new_v4(),
            name: name.into().trim().to_string(),
            total_classes,
            attended_classes,
            target_percentage,
            created_at: now,
            updated_at: now,
        };
        subject.validate()?;
        Ok(subject)
    }

    pub fn validate(&self) -> Result<(), AttendanceValidationError> {
        if self.name.trim().is_empty() {
            return Err(AttendanceValidationError::EmptyName);
        }
        validate_counts(self.total_classes, self.attended_classes)?;
        validate_target(self.target_percentage)
    }

    /// Records an attended class.
    pub fn mark_present(&mut self) -> Result<(), AttendanceValidationError> {
        let total = self
            .total_classes
            .checked_add(1)
            .ok_or(AttendanceValidationError::CountOverflow)?;
        let attended = self
            .attended_classes
            .checked_add(1)
            .ok_or(AttendanceValidationError::CountOverflow)?;
        self.total_classes = total;
        self.attended_classes = attended;
        self.touch();
        Ok(())
    }

    /// Records a missed class.
    pub fn mark_absent(&mut self) -> Result<(), AttendanceValidationError> {
        self.total_classes = self
            .total_classes
            .checked_add(1)
            .ok_or(AttendanceValidationError::CountOverflow)?;
        self.touch();
        Ok(())
    }

    /// Attendance percentage, `0` when no class was recorded.
    pub fn current_percentage(&self) -> f64 {
        if self.total_classes == 0 {
            0.0
        } else {
            f64::from(self.attended_classes) * 100.0 / f64::from(self.total_classes)
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = iso8601::now_utc();
    }
}

pub fn validate_counts(total: u32, attended: u32) -> Result<(), AttendanceValidationError> {
    if attended > total {
        return Err(AttendanceValidationError::AttendedExceedsTotal { attended, total });
    }
    Ok(())
}

pub fn validate_target(target: f64) -> Result<(), AttendanceValidationError> {
    if !target.is_finite() || !(0.0..=100.0).contains(&target) {
        return Err(AttendanceValidationError::TargetOutOfRange(target));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{AttendanceSubject, AttendanceValidationError};

    #[test]
    fn new_rejects_attended_above_total() {
        let err = AttendanceSubject::new("Physics", 3, 4, 75.0).unwrap_err();
        assert_eq!(
            err,
            AttendanceValidationError::AttendedExceedsTotal {
                attended: 4,
                total: 3
            }
        );
    }

    #[test]
    fn new_rejects_nan_and_out_of_range_targets() {
        assert!(AttendanceSubject::new("Physics", 0, 0, f64::NAN).is_err());
        assert!(AttendanceSubject::new("Physics", 0, 0, 100.5).is_err());
        assert!(AttendanceSubject::new("Physics", 0, 0, -1.0).is_err());
    }

    #[test]
    fn new_trims_and_requires_name() {
        assert_eq!(
            AttendanceSubject::new("   ", 0, 0, 75.0).unwrap_err(),
            AttendanceValidationError::EmptyName
        );
        let subject = AttendanceSubject::new("  Chemistry ", 0, 0, 75.0).unwrap();
        assert_eq!(subject.name, "Chemistry");
    }

    #[test]
    fn mark_present_at_counter_limit_is_rejected_without_change() {
        let mut subject = AttendanceSubject::new("Math", u32::MAX, u32::MAX - 1, 75.0).unwrap();
        assert_eq!(
            subject.mark_present(),
            Err(AttendanceValidationError::CountOverflow)
        );
        assert_eq!(subject.total_classes, u32::MAX);
        assert_eq!(subject.attended_classes, u32::MAX - 1);
    }

    #[test]
    fn subject_serializes_camel_case_with_canonical_dates() {
        let subject = AttendanceSubject::new("Math", 2, 1, 80.0).unwrap();
        let value = serde_json::to_value(&subject).unwrap();
        assert_eq!(value["totalClasses"], 2);
        assert!(value["createdAt"]
            .as_str()
            .is_some_and(|text| text.ends_with('Z') && text.len() == 24));
    }
}
