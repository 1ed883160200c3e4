use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use motion_recorder_common::config::RecordingConfig;
use motion_recorder_common::frame::format_timestamp;

/// File name for a recording started at `started_at`.
/// e.g. "motion_20260218093000.avi"
pub fn output_filename(prefix: &str, started_at: &DateTime<Local>, extension: &str) -> String {
    format!(
        "{prefix}{ts}.{extension}",
        ts = format_timestamp(started_at)
    )
}

/// Full output path under the configured output directory.
pub fn output_path(config: &RecordingConfig, started_at: &DateTime<Local>) -> PathBuf {
    Path::new(&config.output_dir).join(output_filename(
        &config.file_prefix,
        started_at,
        &config.extension,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn is_motion_name(name: &str) -> bool {
        let Some(digits) = name
            .strip_prefix("motion_")
            .and_then(|rest| rest.strip_suffix(".avi"))
        else {
            return false;
        };
        digits.len() == 14 && digits.chars().all(|c| c.is_ascii_digit())
    }

    #[test]
    fn filename_format() {
        let at = Local.with_ymd_and_hms(2026, 2, 18, 9, 30, 0).unwrap();
        assert_eq!(
            output_filename("motion_", &at, "avi"),
            "motion_20260218093000.avi"
        );
    }

    #[test]
    fn starts_one_second_apart_get_distinct_names() {
        let first = Local.with_ymd_and_hms(2026, 10, 19, 23, 59, 59).unwrap();
        let second = first + Duration::seconds(1);

        let a = output_filename("motion_", &first, "avi");
        let b = output_filename("motion_", &second, "avi");
        assert_ne!(a, b);
        assert!(is_motion_name(&a), "{a}");
        assert!(is_motion_name(&b), "{b}");
    }

    #[test]
    fn current_time_matches_pattern() {
        assert!(is_motion_name(&output_filename("motion_", &Local::now(), "avi")));
    }

    #[test]
    fn path_uses_output_dir() {
        let config = RecordingConfig {
            output_dir: "/var/recordings".into(),
            ..RecordingConfig::default()
        };
        let at = Local.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            output_path(&config, &at),
            PathBuf::from("/var/recordings/motion_20260102030405.avi")
        );
    }
}
