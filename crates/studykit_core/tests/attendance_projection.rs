use studykit_core::{
    project_attendance, AttendanceSubject, AttendanceValidationError, ClassesNeeded, SkipAllowance,
};

#[test]
fn above_target_reports_classes_that_can_be_skipped() {
    let projection = project_attendance(20, 18, 75.0).unwrap();

    assert_eq!(projection.current_percentage, 90.0);
    assert!(projection.is_on_track);
    assert_eq!(projection.classes_to_skip, SkipAllowance::Count(4));
    assert_eq!(projection.classes_needed, ClassesNeeded::Count(0));
}

#[test]
fn skipping_the_reported_count_stays_on_target() {
    let projection = project_attendance(20, 18, 75.0).unwrap();
    let SkipAllowance::Count(skips) = projection.classes_to_skip else {
        panic!("expected a bounded skip allowance");
    };

    let after = project_attendance(20 + skips, 18, 75.0).unwrap();
    let one_more = project_attendance(20 + skips + 1, 18, 75.0).unwrap();
    assert!(after.is_on_track);
    assert!(!one_more.is_on_track);
}

#[test]
fn below_target_reports_classes_needed() {
    let projection = project_attendance(20, 10, 75.0).unwrap();

    assert_eq!(projection.current_percentage, 50.0);
    assert!(!projection.is_on_track);
    assert_eq!(projection.classes_needed, ClassesNeeded::Count(20));
    assert_eq!(projection.classes_to_skip, SkipAllowance::Count(0));

    let recovered = project_attendance(40, 30, 75.0).unwrap();
    assert!(recovered.is_on_track);
}

#[test]
fn no_recorded_classes_does_not_divide_by_zero() {
    let projection = project_attendance(0, 0, 75.0).unwrap();

    assert_eq!(projection.current_percentage, 0.0);
    assert!(!projection.is_on_track);
    assert_eq!(projection.classes_needed, ClassesNeeded::Count(0));
    assert_eq!(projection.classes_to_skip, SkipAllowance::Count(0));
}

#[test]
fn full_target_with_no_classes_needs_nothing_yet() {
    let projection = project_attendance(0, 0, 100.0).unwrap();

    assert!(!projection.is_on_track);
    assert_eq!(projection.classes_needed, ClassesNeeded::Count(0));
}

#[test]
fn attended_above_total_is_rejected() {
    assert_eq!(
        project_attendance(5, 6, 75.0).unwrap_err(),
        AttendanceValidationError::AttendedExceedsTotal {
            attended: 6,
            total: 5
        }
    );
}

#[test]
fn marking_sequence_keeps_attended_within_total() {
    let mut subject = AttendanceSubject::new("Data Structures", 0, 0, 75.0).unwrap();
    let pattern = [true, false, true, true, false, false, true, false, true, true];

    for (step, present) in pattern.iter().cycle().take(50).enumerate() {
        let total_before = subject.total_classes;
        if *present {
            subject.mark_present().unwrap();
        } else {
            subject.mark_absent().unwrap();
        }
        assert_eq!(subject.total_classes, total_before + 1, "step {step}");
        assert!(subject.attended_classes <= subject.total_classes);
        subject.validate().unwrap();
    }

    assert_eq!(subject.total_classes, 50);
    assert_eq!(subject.attended_classes, 30);
}
