use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::ReportError;

const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse a report bound. Accepts a date, a naive date-time or an RFC 3339
/// timestamp; only the calendar date as written is kept.
pub fn parse_report_date(input: &str) -> Result<NaiveDate, ReportError> {
    let input = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date);
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(date_time) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(date_time.date());
        }
    }
    if let Ok(date_time) = DateTime::parse_from_rfc3339(input) {
        return Ok(date_time.date_naive());
    }

    Err(ReportError::InvalidDate(input.to_string()))
}
