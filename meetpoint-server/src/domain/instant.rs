//! Availability timestamp normalization.
//!
//! Schedule records arrive as strings in whatever form the client wrote
//! them: RFC 3339 with an offset, a Postgres `timestamptz` rendering, or a
//! bare local date-time with no offset at all. Comparing those strings
//! directly is meaningless, so every timestamp is converted to a UTC
//! instant here, before it is counted or ordered.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Error returned when a timestamp cannot be normalized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid timestamp {input:?}: {reason}")]
pub struct InstantError {
    input: String,
    reason: &'static str,
}

impl InstantError {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

/// Offset-carrying formats beyond RFC 3339 (Postgres renders `+00`).
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];

/// Offset-less date-time formats, interpreted in the local zone.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Normalize a timestamp string to a UTC instant.
///
/// Strings carrying an offset keep their absolute meaning. Strings without
/// one are read as wall-clock time in `local`. A bare date means local
/// midnight.
///
/// # Examples
///
/// ```
/// use meetpoint_server::domain::normalize_instant;
///
/// let tz: chrono_tz::Tz = "Asia/Tokyo".parse().unwrap();
/// let a = normalize_instant("2024-01-01T19:00:00", tz).unwrap();
/// let b = normalize_instant("2024-01-01T10:00:00.000Z", tz).unwrap();
/// let c = normalize_instant("2024-01-01 10:00:00+00", tz).unwrap();
/// assert_eq!(a, b);
/// assert_eq!(b, c);
/// ```
pub fn normalize_instant(raw: &str, local: Tz) -> Result<DateTime<Utc>, InstantError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(InstantError::new(raw, "empty"));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| InstantError::new(raw, "unrecognized format"))?;

    local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| InstantError::new(raw, "local time does not exist in zone"))
}
