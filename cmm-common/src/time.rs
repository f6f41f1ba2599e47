//! Time helpers for report display

use chrono::{DateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Format a duration in whole seconds as `M:SS` for report columns.
///
/// # Examples
///
/// ```
/// use cmm_common::time::format_track_time;
///
/// assert_eq!(format_track_time(0), "0:00");
/// assert_eq!(format_track_time(90), "1:30");
/// assert_eq!(format_track_time(150), "2:30");
/// assert_eq!(format_track_time(600), "10:00");
/// ```
pub fn format_track_time(seconds: u64) -> String {
    let minutes = seconds / 60;
    let secs = seconds % 60;
    format!("{}:{:02}", minutes, secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800);
    }

    #[test]
    fn test_format_sub_minute() {
        assert_eq!(format_track_time(0), "0:00");
        assert_eq!(format_track_time(5), "0:05");
        assert_eq!(format_track_time(59), "0:59");
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_track_time(60), "1:00");
        assert_eq!(format_track_time(90), "1:30");
        assert_eq!(format_track_time(150), "2:30");
        assert_eq!(format_track_time(3599), "59:59");
    }

    #[test]
    fn test_format_typical_program_lengths() {
        // Short program max 2:50, freeskate max 4:30
        assert_eq!(format_track_time(170), "2:50");
        assert_eq!(format_track_time(270), "4:30");
    }
}
