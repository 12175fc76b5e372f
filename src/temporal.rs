// ISO-8601 codec for point-in-time fields

use crate::error::DecodeError;
use chrono::{DateTime, SecondsFormat, Utc};

/// Encode an optional timestamp as an RFC 3339 UTC string
///
/// Sub-second digits are only written when present, so the round trip is
/// lossless down to the nanosecond.
pub fn encode(value: Option<DateTime<Utc>>) -> Option<String> {
    value.map(encode_required)
}

pub fn encode_required(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Decode an optional stored string back into a UTC timestamp
///
/// Any UTC offset is accepted and normalized. Malformed text is an error,
/// never a sentinel value.
pub fn decode(value: Option<&str>) -> Result<Option<DateTime<Utc>>, DecodeError> {
    value.map(decode_required).transpose()
}

pub fn decode_required(value: &str) -> Result<DateTime<Utc>, DecodeError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| DecodeError {
            field: String::new(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    #[test]
    fn test_encode_none_is_none() {
        assert_eq!(encode(None), None);
        assert_eq!(decode(None).unwrap(), None);
    }

    #[test]
    fn test_encode_is_utc_iso8601() {
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        assert_eq!(encode(Some(t)).as_deref(), Some("2024-05-01T08:00:00Z"));
    }

    #[test]
    fn test_round_trip_keeps_subsecond_precision() {
        let t = Utc.timestamp_opt(1_714_550_400, 123_456_789).unwrap();
        let encoded = encode(Some(t)).unwrap();
        assert_eq!(decode(Some(&encoded)).unwrap(), Some(t));
    }

    #[test]
    fn test_decode_normalizes_offsets() {
        let paris = FixedOffset::east_opt(2 * 3600).unwrap();
        let local = paris.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let decoded = decode_required(&local.to_rfc3339()).unwrap();
        assert_eq!(decoded, Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_decode_accepts_javascript_millis() {
        let decoded = decode_required("2024-05-01T17:00:00.000Z").unwrap();
        assert_eq!(decoded, Utc.with_ymd_and_hms(2024, 5, 1, 17, 0, 0).unwrap());
    }

    #[test]
    fn test_decode_malformed_fails() {
        let err = decode(Some("not-a-date")).unwrap_err();
        assert_eq!(err.value, "not-a-date");
        assert!(decode_required("").is_err());
        assert!(decode_required("2024-13-01T00:00:00Z").is_err());
    }
}
