use crate::error::{GconcError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Parse a commit timestamp. Accepts RFC 3339 and the `YYYY-MM-DD HH:MM:SS[.f]`
/// form (with or without an offset); naive values are taken as UTC.
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"] {
        if let Ok(dt) = DateTime::parse_from_str(input, fmt) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    Err(GconcError::InvalidDate(format!("Unrecognized timestamp '{input}'")))
}

pub fn from_epoch(secs: i64) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .ok_or_else(|| GconcError::InvalidDate(format!("Invalid timestamp: {secs}")))
}

/// Mean of `timestamps` in epoch seconds, truncated to the calendar date.
/// `None` for an empty slice.
pub fn mean_date(timestamps: &[DateTime<Utc>]) -> Option<NaiveDate> {
    if timestamps.is_empty() {
        return None;
    }
    let sum: i128 = timestamps.iter().map(|t| t.timestamp() as i128).sum();
    let mean = sum.div_euclid(timestamps.len() as i128);
    let secs = i64::try_from(mean).ok()?;
    DateTime::<Utc>::from_timestamp(secs, 0).map(|dt| dt.date_naive())
}

/// ISO `YYYY-MM-DD`, used for every window date written to disk.
pub fn date_label(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Render a metric cell; undefined stays empty rather than becoming `0`.
pub fn format_value(value: Option<f64>) -> String {
    match value {
        // -0.0 shows up for single-entity entropy
        Some(v) if v == 0.0 => "0".to_string(),
        Some(v) => v.to_string(),
        None => String::new(),
    }
}

/// serde adapter for commit timestamps.
pub mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(de::Error::custom)
    }
}
