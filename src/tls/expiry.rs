use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use x509_parser::time::ASN1Time;

const DATETIME_FORMATS: [&str; 6] = [
    "%b %d %H:%M:%S %Y",
    "%b %d %H:%M:%S%.f %Y",
    "%Y%m%d%H%M%S",
    "%y%m%d%H%M%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d %b %Y", "%b %d %Y", "%Y/%m/%d"];

/// Calendar date of a certificate's notAfter
#[must_use]
pub fn expiration_date(not_after: &ASN1Time) -> Option<NaiveDate> {
    let raw = not_after.to_datetime();
    DateTime::<Utc>::from_timestamp(raw.unix_timestamp(), 0)
        .map(|dt| dt.date_naive())
        .or_else(|| parse_not_after(&not_after.to_string()))
}

/// Parse the textual notAfter forms certificates and tools print:
/// `Jan  1 00:00:00 2030 GMT`, `Jan  1 00:00:00 2030 +00:00`, RFC 2822,
/// RFC 3339, ASN.1 `20300101000000Z` / `300101000000Z` and plain dates.
///
/// The date is taken as written; a trailing zone or offset is dropped.
#[must_use]
pub fn parse_not_after(text: &str) -> Option<NaiveDate> {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(&text) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(&text) {
        return Some(dt.date_naive());
    }

    let body = strip_zone(&text);

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(body, format).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(body, format).ok())
        })
}

fn strip_zone(text: &str) -> &str {
    if let Some((body, zone)) = text.rsplit_once(' ')
        && is_zone(zone)
    {
        return body;
    }
    text.strip_suffix('Z').unwrap_or(text)
}

fn is_zone(token: &str) -> bool {
    if matches!(
        token.to_ascii_uppercase().as_str(),
        "GMT" | "UTC" | "UT" | "Z"
    ) {
        return true;
    }
    token.starts_with(['+', '-'])
        && token
            .get(1..)
            .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit() || c == ':'))
}
