//! Date helper functions

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Format a date the way readers in `language` expect it
///
/// # Examples
/// ```ignore
/// locale_date(&date, Tz::Asia__Shanghai, "zh-CN") // -> "2024/1/15"
/// ```
pub fn locale_date(date: &DateTime<Utc>, tz: Tz, language: &str) -> String {
    let local = date.with_timezone(&tz);
    let format = match language {
        "zh-CN" | "zh" | "ja" => "%Y/%-m/%-d",
        "en-US" => "%-m/%-d/%Y",
        _ => "%Y-%m-%d",
    };
    local.format(format).to_string()
}

/// Format a date in ISO 8601 for `datetime` attributes and APIs
pub fn date_xml(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string()
}
