//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `studykit_core` linkage.
//! - Print an attendance projection for `<total> <attended> [target]` argv.
//! - Keep output deterministic for quick local sanity checks.

use std::process::ExitCode;
use studykit_core::{project_attendance, ClassesNeeded, SkipAllowance, DEFAULT_TARGET_PERCENTAGE};

fn main() -> ExitCode {
    println!("studykit_core ping={}", studykit_core::ping());
    println!("studykit_core version={}", studykit_core::core_version());

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        return ExitCode::SUCCESS;
    }

    match run_projection(&args) {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!("usage: studykit <total> <attended> [target]");
            ExitCode::from(2)
        }
    }
}

fn run_projection(args: &[String]) -> Result<Vec<String>, String> {
    let [total, attended, rest @ ..] = args else {
        return Err("expected at least two arguments".to_string());
    };
    let total: u32 = total
        .parse()
        .map_err(|_| format!("invalid total `{total}`"))?;
    let attended: u32 = attended
        .parse()
        .map_err(|_| format!("invalid attended `{attended}`"))?;
    let target = match rest {
        [] => DEFAULT_TARGET_PERCENTAGE,
        [value] => value
            .parse::<f64>()
            .map_err(|_| format!("invalid target `{value}`"))?,
        _ => return Err("too many arguments".to_string()),
    };

    let projection = project_attendance(total, attended, target).map_err(|err| err.to_string())?;
    let skip = match projection.classes_to_skip {
        SkipAllowance::Count(count) => count.to_string(),
        SkipAllowance::Unlimited => "unlimited".to_string(),
    };
    let needed = match projection.classes_needed {
        ClassesNeeded::Count(count) => count.to_string(),
        ClassesNeeded::Unreachable => "unreachable".to_string(),
    };
    Ok(vec![
        format!("attendance current={:.2}", projection.current_percentage),
        format!("attendance on_track={}", projection.is_on_track),
        format!("attendance can_skip={skip}"),
        format!("attendance needed={needed}"),
    ])
}

#[cfg(test)]
mod tests {
    use super::run_projection;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn projection_uses_default_target() {
        let lines = run_projection(&args(&["20", "18"])).expect("projection should succeed");
        assert_eq!(lines[0], "attendance current=90.00");
        assert_eq!(lines[2], "attendance can_skip=4");
    }

    #[test]
    fn projection_reports_unreachable_full_target() {
        let lines = run_projection(&args(&["10", "9", "100"])).expect("projection should succeed");
        assert_eq!(lines[3], "attendance needed=unreachable");
    }

    #[test]
    fn projection_rejects_bad_input() {
        assert!(run_projection(&args(&["ten", "1"])).is_err());
        assert!(run_projection(&args(&["1", "2"])).is_err());
        assert!(run_projection(&args(&["1"])).is_err());
    }
}
