// Cell parsing for INPE exports and count formatting for the dashboard.
//
// Every parser returns `None` for a blank, NA-marked or unreadable cell; the
// cleaning stage decides what a missing value means.
use chrono::{NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

/// Canonical rendering of a detection timestamp, as found in `data_pas`.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Cell texts read as "no value", the same markers pandas uses by default.
const NA_MARKERS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_missing_cell(s: &str) -> bool {
    NA_MARKERS.contains(&s.trim())
}

/// Trim a cell and treat blank or NA-marked text as missing.
pub fn non_empty(s: Option<&str>) -> Option<&str> {
    let s = s?.trim();
    if is_missing_cell(s) {
        None
    } else {
        Some(s)
    }
}

/// Parse a string-like value into `f64`, coercing failures to `None`.
///
/// A single decimal comma (`"1,5"`) is accepted as a decimal point, which is
/// how some INPE exports write fractional values.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = non_empty(s)?;
    if let Ok(v) = s.parse::<f64>() {
        return v.is_finite().then_some(v);
    }
    if s.matches(',').count() == 1 && !s.contains('.') {
        return s.replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite());
    }
    None
}

/// Parse a detection timestamp. A bare date is read as midnight.
pub fn parse_datetime_safe(s: Option<&str>) -> Option<NaiveDateTime> {
    let s = non_empty(s)?;
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Format a count with `.` as thousands separator (`1.234.567`), the way the
/// dashboard metrics are shown to Brazilian readers.
pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en).replace(',', ".")
}
