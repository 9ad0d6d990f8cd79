//! Attendance target projection.
//!
//! # Responsibility
//! - Derive the current percentage, skip allowance and classes needed for
//!   one subject's counts and target.
//!
//! # Invariants
//! - Pure and deterministic: same inputs, same output.
//! - Branch selection compares `attended * 100` with `target * total`, so a
//!   percentage that rounds just below the target is never misclassified.
//! - Never divides by zero: `target == 0` and `target == 100` are explicit.

use crate::model::attendance::{validate_counts, validate_target, AttendanceValidationError};

/// How many further classes may be missed while staying on target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipAllowance {
    Count(u32),
    /// Target is 0%: any number of absences keeps the subject on track.
    Unlimited,
}

/// How many consecutive attended classes are needed to reach the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassesNeeded {
    Count(u32),
    /// Target is 100% and a class was already missed.
    Unreachable,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttendanceProjection {
    pub current_percentage: f64,
    pub classes_to_skip: SkipAllowance,
    pub classes_needed: ClassesNeeded,
    pub is_on_track: bool,
}

/// Projects attendance for `attended_classes` out of `total_classes`.
///
/// # Errors
/// - `AttendedExceedsTotal` when `attended_classes > total_classes`.
/// - `TargetOutOfRange` when the target is not a finite value in `[0, 100]`.
pub fn project_attendance(
    total_classes: u32,
    attended_classes: u32,
    target_percentage: f64,
) -> Result<AttendanceProjection, AttendanceValidationError> {
    validate_counts(total_classes, attended_classes)?;
    validate_target(target_percentage)?;

    let total = f64::from(total_classes);
    let attended = f64::from(attended_classes);
    let target = target_percentage;

    let current_percentage = if total_classes == 0 {
        0.0
    } else {
        attended * 100.0 / total
    };

    // attended*100 - target*total; positive means above target.
    let surplus = attended * 100.0 - target * total;
    let (above, below) = if total_classes == 0 {
        (false, target > 0.0)
    } else {
        (surplus > 0.0, surplus < 0.0)
    };

    let classes_to_skip = if !above {
        SkipAllowance::Count(0)
    } else if target == 0.0 {
        SkipAllowance::Unlimited
    } else {
        SkipAllowance::Count(saturating_count((surplus / target).floor()))
    };

    let classes_needed = if !below {
        ClassesNeeded::Count(0)
    } else if target >= 100.0 {
        if total_classes == 0 {
            ClassesNeeded::Count(0)
        } else {
            ClassesNeeded::Unreachable
        }
    } else {
        ClassesNeeded::Count(saturating_count((-surplus / (100.0 - target)).ceil()))
    };

    Ok(AttendanceProjection {
        current_percentage,
        classes_to_skip,
        classes_needed,
        is_on_track: !below,
    })
}

fn saturating_count(value: f64) -> u32 {
    if value.is_nan() || value <= 0.0 {
        0
    } else if value >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        value as u32
    }
}
