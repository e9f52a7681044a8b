//! Field normalization: turns nested, optional issue fields into flat display values.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

use super::category::status;
use super::cell::{CellValue, Color};
use super::issue::{Issue, Priority};

/// Display label for a priority level.
///
/// Unrecognized levels render as `-`, like an unset priority, but are logged so
/// that upstream drift shows up in the run output.
pub fn priority_label(priority: Priority) -> &'static str {
    match priority {
        Priority::Urgent => "Urgent",
        Priority::High => "High",
        Priority::Medium => "Medium",
        Priority::Low => "Low",
        Priority::Unset => "-",
        Priority::Unrecognized(value) => {
            tracing::warn!(priority = value, "Unrecognized priority level, rendering as unset");
            "-"
        }
    }
}

/// Format a raw date or timestamp as `YYYY-MM-DD`.
///
/// Returns an empty string for missing or unparseable input. The calendar date
/// is taken in whatever offset the input carries; no timezone conversion happens.
pub fn format_date(raw: Option<&str>) -> String {
    raw.and_then(parse_calendar_date)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Parse the calendar date a raw value encodes.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.date_naive());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    parse_naive_datetime(raw).map(|dt| dt.date())
}

/// Parse a raw timestamp into an instant.
///
/// Offset-less datetimes are read as local time and bare dates as UTC midnight.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc));
    }
    if let Some(naive) = parse_naive_datetime(raw) {
        return Local.from_local_datetime(&naive).earliest().map(|dt| dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn parse_naive_datetime(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

/// Title cell: a `HYPERLINK` formula when the issue has a URL, the plain title otherwise.
pub fn display_title(issue: &Issue) -> CellValue {
    let title = issue.title.as_deref().unwrap_or("");

    match issue.url.as_deref().filter(|u| !u.is_empty()) {
        Some(url) => CellValue::Formula(format!(
            "=HYPERLINK(\"{}\", \"{}\")",
            escape_formula_string(url),
            escape_formula_string(title)
        )),
        None => CellValue::text(title),
    }
}

/// Double embedded quotes so the value survives inside a formula string literal.
fn escape_formula_string(value: &str) -> String {
    value.replace('"', "\"\"")
}

/// Background color for a workflow status name.
pub fn status_color(status_name: &str) -> Option<Color> {
    match status_name {
        status::DONE => Some(Color::LIGHT_BLUE),
        status::AWAITING_RELEASE | status::IN_REVIEW => Some(Color::LIGHT_GREEN),
        status::IN_PROGRESS | status::TODO | status::ESTIMATING => Some(Color::LIGHT_YELLOW),
        status::UNASSIGNED => Some(Color::LIGHT_RED),
        status::TRIAGE => Some(Color::ORANGE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_label_known_levels() {
        assert_eq!(priority_label(Priority::Urgent), "Urgent");
        assert_eq!(priority_label(Priority::High), "High");
        assert_eq!(priority_label(Priority::Medium), "Medium");
        assert_eq!(priority_label(Priority::Low), "Low");
        assert_eq!(priority_label(Priority::from_raw(Some(0.0))), "-");
        assert_eq!(priority_label(Priority::from_raw(None)), "-");
    }

    #[test]
    fn test_priority_label_unrecognized_falls_back() {
        let five = Priority::from_raw(Some(5.0));
        assert_eq!(five, Priority::Unrecognized(5.0));
        assert_eq!(priority_label(five), "-");
    }

    #[test]
    fn test_format_date_missing_and_garbage() {
        assert_eq!(format_date(None), "");
        assert_eq!(format_date(Some("")), "");
        assert_eq!(format_date(Some("not-a-date")), "");
        assert_eq!(format_date(Some("2024-13-40")), "");
    }

    #[test]
    fn test_format_date_forms() {
        assert_eq!(format_date(Some("2024-03-05T00:00:00Z")), "2024-03-05");
        assert_eq!(format_date(Some("2024-03-05")), "2024-03-05");
        assert_eq!(format_date(Some("2024-03-05T23:30:00.000+09:00")), "2024-03-05");
        assert_eq!(format_date(Some("2024-3-5")), "2024-03-05");
        assert_eq!(format_date(Some("2024-03-05T08:15:00")), "2024-03-05");
    }

    #[test]
    fn test_parse_instant() {
        let instant = parse_instant("2024-03-05T09:00:00+09:00").unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap());

        let midnight = parse_instant("2024-03-05").unwrap();
        assert_eq!(midnight, Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap());

        assert!(parse_instant("yesterday").is_none());
    }

    #[test]
    fn test_display_title_with_url() {
        let issue = Issue::new("1").with_title("Fix login").with_url("https://linear.app/i/1");
        assert_eq!(
            display_title(&issue),
            CellValue::Formula(r#"=HYPERLINK("https://linear.app/i/1", "Fix login")"#.to_string())
        );
    }

    #[test]
    fn test_display_title_escapes_quotes() {
        let issue = Issue::new("1").with_title(r#"Say "hi""#).with_url("https://x");
        assert_eq!(
            display_title(&issue),
            CellValue::Formula(r#"=HYPERLINK("https://x", "Say ""hi""")"#.to_string())
        );
    }

    #[test]
    fn test_display_title_without_url() {
        assert_eq!(display_title(&Issue::new("1").with_title("Plain")), CellValue::text("Plain"));
        assert_eq!(display_title(&Issue::new("1")), CellValue::Empty);
    }

    #[test]
    fn test_status_color_table() {
        assert_eq!(status_color("完了"), Some(Color::LIGHT_BLUE));
        assert_eq!(status_color("リリース待ち"), Some(Color::LIGHT_GREEN));
        assert_eq!(status_color("レビュー中"), Some(Color::LIGHT_GREEN));
        assert_eq!(status_color("進行中"), Some(Color::LIGHT_YELLOW));
        assert_eq!(status_color("TODO"), Some(Color::LIGHT_YELLOW));
        assert_eq!(status_color("見積もり中"), Some(Color::LIGHT_YELLOW));
        assert_eq!(status_color("未対応"), Some(Color::LIGHT_RED));
        assert_eq!(status_color("Triage"), Some(Color::ORANGE));
        assert_eq!(status_color("Canceled"), None);
    }
}
