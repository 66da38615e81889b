//! Creation timestamps and date rendering.
//!
//! Records serialize timestamps as RFC 3339 UTC. Inputs additionally accept
//! naive ISO-8601 date-times and bare dates, interpreted as UTC.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Current UTC time.
pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

/// Parse an RFC 3339, naive ISO-8601, or `YYYY-MM-DD` string as UTC.
pub fn parse_lenient(input: &str) -> Result<OffsetDateTime, time::error::Parse> {
    let input = input.trim();
    if let Ok(ts) = OffsetDateTime::parse(input, &Rfc3339) {
        return Ok(ts.to_offset(UtcOffset::UTC));
    }
    let with_fraction =
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");
    if let Ok(naive) = PrimitiveDateTime::parse(input, with_fraction) {
        return Ok(naive.assume_utc());
    }
    let whole_seconds = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    if let Ok(naive) = PrimitiveDateTime::parse(input, whole_seconds) {
        return Ok(naive.assume_utc());
    }
    Date::parse(input, format_description!("[year]-[month]-[day]"))
        .map(|date| date.midnight().assume_utc())
}

/// `October 17, 2026`
pub fn long_date(ts: OffsetDateTime) -> Result<String, time::error::Format> {
    ts.format(format_description!("[month repr:long] [day], [year]"))
}

/// `2026-10-17`
pub fn iso_date(ts: OffsetDateTime) -> Result<String, time::error::Format> {
    ts.format(format_description!("[year]-[month]-[day]"))
}

/// `2026-10-17 09:30:00`
pub fn iso_datetime(ts: OffsetDateTime) -> Result<String, time::error::Format> {
    ts.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ))
}

/// Serde adapter: RFC 3339 out, lenient in.
pub mod rfc3339 {
    use serde::de::Error as _;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::format_description::well_known::Rfc3339;
    use time::OffsetDateTime;

    pub fn serialize<S: Serializer>(ts: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        let text = ts.format(&Rfc3339).map_err(S::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<OffsetDateTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_lenient(&text)
            .map_err(|e| D::Error::custom(format!("invalid date-time '{}': {}", text, e)))
    }
}

/// Serialize a timestamp the way records store it.
pub fn to_rfc3339(ts: OffsetDateTime) -> Result<String, time::error::Format> {
    ts.format(&Rfc3339)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn accepts_rfc3339_and_normalizes_to_utc() {
        let ts = parse_lenient("2026-03-01T10:00:00+02:00").unwrap();
        assert_eq!(ts, datetime!(2026-03-01 08:00:00 UTC));
        assert_eq!(ts.offset(), UtcOffset::UTC);
    }

    #[test]
    fn accepts_naive_iso_datetimes_as_utc() {
        assert_eq!(
            parse_lenient("2026-03-01T10:00:00").unwrap(),
            datetime!(2026-03-01 10:00:00 UTC)
        );
        assert_eq!(
            parse_lenient("2026-03-01T10:00:00.250").unwrap(),
            datetime!(2026-03-01 10:00:00.25 UTC)
        );
    }

    #[test]
    fn accepts_bare_dates_at_midnight() {
        assert_eq!(
            parse_lenient("2026-03-01").unwrap(),
            datetime!(2026-03-01 00:00:00 UTC)
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_lenient("next tuesday").is_err());
    }

    #[test]
    fn renders_human_dates() {
        let ts = datetime!(2026-03-07 09:05:00 UTC);
        assert_eq!(long_date(ts).unwrap(), "March 07, 2026");
        assert_eq!(iso_date(ts).unwrap(), "2026-03-07");
        assert_eq!(iso_datetime(ts).unwrap(), "2026-03-07 09:05:00");
    }
}
