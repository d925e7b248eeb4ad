//! Display formatting and lenient value parsing shared by the field kinds

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Shown for blank or unresolvable values
pub const BLANK: &str = "-";

/// Shown for true booleans
pub const YES: &str = "✓ Yes";

/// Shown for false booleans
pub const NO: &str = "✗ No";

/// Display format of dates (`January 03, 2025`)
pub const DATE_FORMAT: &str = "%B %d, %Y";

/// Display format of datetimes (`January 03, 2025 at 02:30 PM`)
pub const DATETIME_FORMAT: &str = "%B %d, %Y at %I:%M %p";

/// Storage format of dates
pub const STORED_DATE_FORMAT: &str = "%Y-%m-%d";

/// Value format of datetime inputs
pub const INPUT_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

const DATE_INPUTS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", DATE_FORMAT, "%b %d, %Y"];

const DATETIME_INPUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    DATETIME_FORMAT,
];

/// Raw textual form of a value (strings unquoted, null as `-`)
pub fn raw_text(value: &Value) -> String {
    match value {
        Value::Null => BLANK.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Truthiness used by boolean fields
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "t" | "on" | "yes"
        ),
        _ => false,
    }
}

/// Parse an ISO-ish date (a datetime string yields its date part)
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATE_INPUTS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| parse_datetime(text).map(|dt| dt.date_naive()))
}

/// Parse an ISO-ish datetime; naive values are taken as UTC
pub fn parse_datetime(text: &str) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt);
    }

    DATETIME_INPUTS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_INPUTS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Format a stored date for display
pub fn format_date(value: &Value) -> Result<String, String> {
    let text = value.as_str().ok_or_else(|| format!("{} is not a date string", value))?;
    parse_date(text)
        .map(|d| d.format(DATE_FORMAT).to_string())
        .ok_or_else(|| format!("'{}' is not a date", text))
}

/// Format a stored datetime for display
pub fn format_datetime(value: &Value) -> Result<String, String> {
    let text = value
        .as_str()
        .ok_or_else(|| format!("{} is not a datetime string", value))?;
    parse_datetime(text)
        .map(|dt| dt.format(DATETIME_FORMAT).to_string())
        .ok_or_else(|| format!("'{}' is not a datetime", text))
}

/// Numeric value of a stored number or numeric string
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
