//! Validation for dialog start timestamps and extension field names
//!
//! Start times arrive either as native `chrono` values or as text in one of
//! several common layouts. Both are normalized to a single RFC 3339 form so
//! serialized dialogs compare and sort consistently.

use crate::error::{DialogError, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

/// Caller-supplied start time before normalization
#[derive(Debug, Clone, PartialEq)]
pub enum StartInput {
    Timestamp(DateTime<FixedOffset>),
    Text(String),
}

impl From<DateTime<FixedOffset>> for StartInput {
    fn from(ts: DateTime<FixedOffset>) -> Self {
        StartInput::Timestamp(ts)
    }
}

impl From<DateTime<Utc>> for StartInput {
    fn from(ts: DateTime<Utc>) -> Self {
        StartInput::Timestamp(ts.fixed_offset())
    }
}

impl From<&str> for StartInput {
    fn from(text: &str) -> Self {
        StartInput::Text(text.to_string())
    }
}

impl From<String> for StartInput {
    fn from(text: String) -> Self {
        StartInput::Text(text)
    }
}

/// Normalized dialog start timestamp
///
/// The canonical text is RFC 3339: `Z` for UTC, the numeric offset otherwise,
/// and fractional seconds only when the source had them.
///
/// # Examples
///
/// ```
/// use vcon_dialog::core::validation::DialogStart;
///
/// let start = DialogStart::new("2024-01-01T00:00:00Z").unwrap();
/// assert_eq!(start.as_str(), "2024-01-01T00:00:00Z");
///
/// let start = DialogStart::new("2024-01-01 09:30:00").unwrap();
/// assert_eq!(start.as_str(), "2024-01-01T09:30:00Z");
///
/// assert!(DialogStart::new("yesterday").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DialogStart {
    timestamp: DateTime<FixedOffset>,
    text: String,
}

impl DialogStart {
    /// Naive layouts accepted after RFC 3339 and RFC 2822, read as UTC
    const NAIVE_FORMATS: &'static [&'static str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    /// Normalize a start time
    ///
    /// # Errors
    ///
    /// Returns `InvalidStart` if text input matches none of the accepted layouts.
    pub fn new(input: impl Into<StartInput>) -> Result<Self> {
        let timestamp = match input.into() {
            StartInput::Timestamp(ts) => ts,
            StartInput::Text(text) => Self::parse(&text)?,
        };
        Ok(Self::from_timestamp(timestamp))
    }

    /// Current time in UTC
    pub fn now() -> Self {
        Self::from_timestamp(Utc::now().fixed_offset())
    }

    fn from_timestamp(timestamp: DateTime<FixedOffset>) -> Self {
        let text = timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true);
        DialogStart { timestamp, text }
    }

    fn parse(text: &str) -> Result<DateTime<FixedOffset>> {
        let trimmed = text.trim();

        if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(ts);
        }
        if let Ok(ts) = DateTime::parse_from_rfc2822(trimmed) {
            return Ok(ts);
        }
        for format in Self::NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(Utc.from_utc_datetime(&naive).fixed_offset());
            }
        }
        if let Some(midnight) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
        {
            return Ok(Utc.from_utc_datetime(&midnight).fixed_offset());
        }

        Err(DialogError::InvalidStart(format!(
            "'{}' is not a recognised timestamp",
            text
        )))
    }

    /// Canonical text form
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }
}

impl AsRef<str> for DialogStart {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl std::fmt::Display for DialogStart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Field names with a fixed meaning on the wire
///
/// Extension fields may not reuse these.
pub const RESERVED_FIELDS: &[&str] = &[
    "type",
    "start",
    "parties",
    "originator",
    "mimetype",
    "filename",
    "body",
    "encoding",
    "url",
    "alg",
    "signature",
    "disposition",
    "party_history",
    "meta",
    "metadata",
    "transferee",
    "transferor",
    "transfer_target",
    "original",
    "consultation",
    "target_dialog",
    "campaign",
    "interaction",
    "skill",
    "duration",
    "transfer",
    "signaling",
    "resolution",
    "frame_rate",
    "codec",
    "bitrate",
    "thumbnail",
];

/// Validate an extension field name
pub fn validate_extension_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(DialogError::invalid_field(
            "extension",
            "extension field name cannot be empty",
        ));
    }

    if RESERVED_FIELDS.contains(&key) {
        return Err(DialogError::invalid_field(
            key,
            "reserved field name cannot be set as an extension",
        ));
    }

    Ok(())
}

/// Reject NaN and infinite values, which have no JSON form
pub fn validate_finite(field: &str, value: Option<f64>) -> Result<()> {
    match value {
        Some(number) if !number.is_finite() => Err(DialogError::invalid_field(
            field,
            format!("{number} is not a finite number"),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_finite() {
        assert!(validate_finite("duration", None).is_ok());
        assert!(validate_finite("duration", Some(12.5)).is_ok());
        assert!(validate_finite("duration", Some(f64::NAN)).is_err());
        let err = validate_finite("frame_rate", Some(f64::INFINITY)).unwrap_err();
        assert!(err.to_string().contains("frame_rate"));
    }

    #[test]
    fn test_rfc3339_passthrough() -> Result<()> {
        let start = DialogStart::new("2024-01-01T00:00:00Z")?;
        assert_eq!(start.as_str(), "2024-01-01T00:00:00Z");

        let start = DialogStart::new("2024-01-01T10:00:00+02:00")?;
        assert_eq!(start.as_str(), "2024-01-01T10:00:00+02:00");

        let start = DialogStart::new("2024-01-01T00:00:00.250Z")?;
        assert_eq!(start.as_str(), "2024-01-01T00:00:00.250Z");
        Ok(())
    }

    #[test]
    fn test_utc_offset_normalized_to_z() -> Result<()> {
        let start = DialogStart::new("2024-01-01T00:00:00+00:00")?;
        assert_eq!(start.as_str(), "2024-01-01T00:00:00Z");
        Ok(())
    }

    #[test]
    fn test_other_layouts() -> Result<()> {
        assert_eq!(
            DialogStart::new("Mon, 01 Jan 2024 12:00:00 +0000")?.as_str(),
            "2024-01-01T12:00:00Z"
        );
        assert_eq!(
            DialogStart::new("2024-01-01T12:00:00")?.as_str(),
            "2024-01-01T12:00:00Z"
        );
        assert_eq!(DialogStart::new("2024-01-01")?.as_str(), "2024-01-01T00:00:00Z");
        Ok(())
    }

    #[test]
    fn test_native_timestamp() -> Result<()> {
        let ts = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        assert_eq!(DialogStart::new(ts)?.as_str(), "2024-05-06T07:08:09Z");
        Ok(())
    }

    #[test]
    fn test_same_instant_same_text() -> Result<()> {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(DialogStart::new(ts)?, DialogStart::new("2024-01-01T00:00:00Z")?);
        Ok(())
    }

    #[test]
    fn test_unparsable_start() {
        let err = DialogStart::new("not a date").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("not a date"));
    }

    #[test]
    fn test_extension_keys() {
        assert!(validate_extension_key("x-vendor-id").is_ok());
        assert!(validate_extension_key("").is_err());
        assert!(validate_extension_key("body").is_err());
        assert!(validate_extension_key("metadata").is_err());
    }
}
