use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime, UtcOffset};

use crate::ValidationError;

/// Instant normalized to UTC; serialized as RFC 3339 with a `Z` suffix.
///
/// Fetch times and provider session timestamps both go through this type,
/// so snapshot ages compare without offset arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UtcDateTime(OffsetDateTime);

impl UtcDateTime {
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    /// Any RFC 3339 offset is accepted and shifted to UTC.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        OffsetDateTime::parse(input.trim(), &Rfc3339)
            .map(|value| Self(value.to_offset(UtcOffset::UTC)))
            .map_err(|_| ValidationError::InvalidTimestamp {
                value: input.to_owned(),
            })
    }

    /// Provider epoch seconds; `None` outside the representable range.
    pub fn from_unix_timestamp(seconds: i64) -> Option<Self> {
        OffsetDateTime::from_unix_timestamp(seconds).ok().map(Self)
    }

    /// Calendar date of the session this timestamp belongs to.
    pub fn date(self) -> Date {
        self.0.date()
    }
}

impl Display for UtcDateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0.format(&Rfc3339) {
            Ok(text) => f.write_str(&text),
            Err(_) => write!(f, "{}", self.0.unix_timestamp()),
        }
    }
}

impl TryFrom<String> for UtcDateTime {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<UtcDateTime> for String {
    fn from(value: UtcDateTime) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_normalized_to_utc() {
        let parsed = UtcDateTime::parse("2024-01-01T01:00:00+01:00").expect("valid rfc3339");
        assert_eq!(parsed.to_string(), "2024-01-01T00:00:00Z");
        assert_eq!(parsed, UtcDateTime::parse("2024-01-01T00:00:00Z").expect("valid"));
    }

    #[test]
    fn rejects_non_rfc3339_input() {
        let err = UtcDateTime::parse("01/02/2024").expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidTimestamp { .. }));
    }

    #[test]
    fn unix_seconds_map_to_session_dates() {
        // 2024-03-01T14:30:00Z, a B3 session open
        let ts = UtcDateTime::from_unix_timestamp(1_709_303_400).expect("in range");
        assert_eq!(ts.date().to_string(), "2024-03-01");
    }

    #[test]
    fn serde_uses_rfc3339_strings() {
        let ts = UtcDateTime::from_unix_timestamp(1_709_303_400).expect("in range");
        let json = serde_json::to_string(&ts).expect("serialize");
        assert_eq!(json, "\"2024-03-01T14:30:00Z\"");

        let back: UtcDateTime = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, ts);
    }
}
