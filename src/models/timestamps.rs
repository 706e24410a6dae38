// src/models/timestamps.rs
// Second-precision ISO 8601 for API payloads ("2026-02-10T12:00:00Z")

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serializer;

pub fn iso8601<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Stamped {
        #[serde(serialize_with = "iso8601")]
        at: DateTime<Utc>,
    }

    #[test]
    fn test_serializes_without_fractional_seconds() {
        let at = Utc.with_ymd_and_hms(2026, 2, 10, 8, 30, 5).unwrap()
            + chrono::Duration::milliseconds(250);
        let json = serde_json::to_string(&Stamped { at }).unwrap();
        assert_eq!(json, r#"{"at":"2026-02-10T08:30:05Z"}"#);
    }
}
