use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::ops::Deref;
use std::str::FromStr;
use thiserror::Error;

/// Timestamps sent by the PostHub API.
///
/// The server emits [RFC 3339] timestamps, but columns without a time
/// zone come through without an offset. Those are assumed to be UTC.
///
/// [RFC 3339]: https://www.rfc-editor.org/rfc/rfc3339
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

#[derive(Debug, Error)]
#[error("invalid timestamp {0:?}")]
pub struct ParseTimestampError(String);

impl Timestamp {
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Human friendly distance between this timestamp and `now`,
    /// e.g. `3 minutes ago`.
    #[must_use]
    pub fn relative_to(&self, now: DateTime<Utc>) -> String {
        let secs = (now - self.0).num_seconds();
        if secs < 0 {
            return "just now".into();
        }

        let (amount, unit) = match secs {
            0..=59 => return "less than a minute ago".into(),
            60..=3599 => (secs / 60, "minute"),
            3600..=86_399 => (secs / 3600, "hour"),
            86_400..=2_591_999 => (secs / 86_400, "day"),
            2_592_000..=31_535_999 => (secs / 2_592_000, "month"),
            _ => (secs / 31_536_000, "year"),
        };

        if amount == 1 {
            format!("1 {unit} ago")
        } else {
            format!("{amount} {unit}s ago")
        }
    }
}

impl FromStr for Timestamp {
    type Err = ParseTimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(value) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self(value.with_timezone(&Utc)));
        }

        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|v| Self(v.and_utc()))
            .map_err(|_| ParseTimestampError(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct Visitor;

        impl<'de> serde::de::Visitor<'de> for Visitor {
            type Value = Timestamp;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("PostHub timestamp")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Timestamp::from_str(v).map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_str(Visitor)
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.0.to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        s.fmt(f)
    }
}

impl Deref for Timestamp {
    type Target = DateTime<Utc>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn parses_offset_and_naive_forms() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 10, 20, 30).unwrap();

        let offset: Timestamp = "2024-05-01T12:20:30+02:00".parse().unwrap();
        assert_eq!(*offset, expected);

        let naive: Timestamp = "2024-05-01T10:20:30.000123".parse().unwrap();
        assert_eq!(naive.timestamp(), expected.timestamp());

        assert!("yesterday".parse::<Timestamp>().is_err());
    }

    #[test]
    fn relative_time() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let at = |d: Duration| Timestamp::from(now - d);

        assert_eq!(at(Duration::seconds(5)).relative_to(now), "less than a minute ago");
        assert_eq!(at(Duration::minutes(1)).relative_to(now), "1 minute ago");
        assert_eq!(at(Duration::minutes(3)).relative_to(now), "3 minutes ago");
        assert_eq!(at(Duration::hours(5)).relative_to(now), "5 hours ago");
        assert_eq!(at(Duration::days(2)).relative_to(now), "2 days ago");
        assert_eq!(at(Duration::days(400)).relative_to(now), "1 year ago");
        assert_eq!(at(Duration::seconds(-10)).relative_to(now), "just now");
    }

    #[test]
    fn display_is_rfc3339_millis() {
        let ts = Timestamp::from(Utc.with_ymd_and_hms(2024, 5, 1, 10, 20, 30).unwrap());
        assert_eq!(ts.to_string(), "2024-05-01T10:20:30.000Z");
    }
}
