//! Calendar date formatting

use chrono::{DateTime, Utc};

/// Format a timestamp as a calendar date without time of day
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use invoice_format::format_calendar_date;
///
/// let date = Utc.with_ymd_and_hms(2024, 1, 15, 23, 59, 0).unwrap();
/// assert_eq!(format_calendar_date(date), "January 15, 2024");
/// ```
pub fn format_calendar_date(date: DateTime<Utc>) -> String {
    date.format("%B %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_calendar_date() {
        let date = Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap();
        assert_eq!(format_calendar_date(date), "March 5, 2024");
    }

    #[test]
    fn test_format_calendar_date_end_of_year() {
        let date = Utc.with_ymd_and_hms(2025, 12, 31, 0, 0, 0).unwrap();
        assert_eq!(format_calendar_date(date), "December 31, 2025");
    }
}
