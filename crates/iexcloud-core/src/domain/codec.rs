//! Decoding helpers for the API's non-canonical wire encodings.
//!
//! The API mixes `YYYY-MM-DD` dates, compact `YYYYMMDD` dates, epoch
//! milliseconds and floats sent as strings, and omits fields freely. Wire
//! structs keep the raw values; these helpers turn them into canonical types.
//! Absent or unparsable optional values become `None` rather than errors;
//! required fields are enforced by [`Validate`](super::Validate).
//!
//! The `format_*` and `to_*` helpers go the other way, so a serialized
//! record reads back through its own wire struct.

use chrono::{NaiveDate, Offset, TimeZone};
use chrono_tz::America::New_York;
use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};
use tracing::debug;

use crate::ValidationError;

/// A float the API sometimes sends as a JSON number and sometimes as a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum FlexFloat {
    Number(f64),
    Text(String),
}

impl FlexFloat {
    pub(crate) fn value(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => parse_float_str(text),
        }
    }
}

pub(crate) fn flex_or_zero(value: Option<&FlexFloat>) -> f64 {
    value.and_then(FlexFloat::value).unwrap_or_default()
}

impl From<f64> for FlexFloat {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

pub fn parse_float_str(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Strictly parse a `YYYY-MM-DD` date.
pub fn parse_iso_date(input: &str) -> Result<Date, ValidationError> {
    Date::parse(input.trim(), format_description!("[year]-[month]-[day]")).map_err(|_| {
        ValidationError::InvalidDate {
            value: input.to_owned(),
            expected: "YYYY-MM-DD",
        }
    })
}

/// Strictly parse a compact `YYYYMMDD` date.
pub fn parse_compact_date(input: &str) -> Result<Date, ValidationError> {
    let invalid = || ValidationError::InvalidDate {
        value: input.to_owned(),
        expected: "YYYYMMDD",
    };

    let digits = input.trim();
    if digits.len() != 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let year: i32 = digits[0..4].parse().map_err(|_| invalid())?;
    let month: u8 = digits[4..6].parse().map_err(|_| invalid())?;
    let day: u8 = digits[6..8].parse().map_err(|_| invalid())?;
    let month = Month::try_from(month).map_err(|_| invalid())?;

    Date::from_calendar_date(year, month, day).map_err(|_| invalid())
}

/// Format a date the way the API expects in `exactDate`-style parameters.
pub fn format_compact_date(date: Date) -> String {
    format!(
        "{:04}{:02}{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Format a date as `YYYY-MM-DD`.
pub fn format_iso_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Epoch milliseconds to a UTC timestamp. Zero and negative values mean "absent".
pub fn from_epoch_millis(millis: i64) -> Option<OffsetDateTime> {
    if millis <= 0 {
        return None;
    }
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000).ok()
}

/// Inverse of [`from_epoch_millis`].
pub fn to_epoch_millis(at: OffsetDateTime) -> Option<i64> {
    i64::try_from(at.unix_timestamp_nanos() / 1_000_000).ok()
}

/// Lenient variant used for optional date fields.
pub(crate) fn optional_iso_date(field: &'static str, raw: Option<&str>) -> Option<Date> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match parse_iso_date(raw) {
        Ok(date) => Some(date),
        Err(err) => {
            debug!(field, original = raw, %err, "ignoring unparsable date");
            None
        }
    }
}

pub(crate) fn optional_compact_date(field: &'static str, raw: Option<&str>) -> Option<Date> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match parse_compact_date(raw) {
        Ok(date) => Some(date),
        Err(err) => {
            debug!(field, original = raw, %err, "ignoring unparsable date");
            None
        }
    }
}

/// Combine a `YYYY-MM-DD` date with an `HH:MM` minute label.
pub(crate) fn date_with_minute(date: Date, minute: &str) -> Option<PrimitiveDateTime> {
    let (hour, minute) = minute.trim().split_once(':')?;
    let time = Time::from_hms(hour.parse().ok()?, minute.parse().ok()?, 0).ok()?;
    Some(PrimitiveDateTime::new(date, time))
}

/// Pin a US Eastern wall-clock time to its UTC offset on that day.
///
/// Times that fall in the spring-forward gap have no offset and yield `None`;
/// repeated times in the autumn overlap take the earlier (daylight) offset.
pub(crate) fn in_market_zone(local: PrimitiveDateTime) -> Option<OffsetDateTime> {
    let naive = NaiveDate::from_ymd_opt(
        local.year(),
        u32::from(u8::from(local.month())),
        u32::from(local.day()),
    )?
    .and_hms_opt(
        u32::from(local.hour()),
        u32::from(local.minute()),
        u32::from(local.second()),
    )?;
    let zoned = New_York.from_local_datetime(&naive).earliest()?;
    let offset = UtcOffset::from_whole_seconds(zoned.offset().fix().local_minus_utc()).ok()?;
    Some(local.assume_offset(offset))
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime, offset};

    use super::*;

    #[test]
    fn parses_iso_dates() {
        assert_eq!(parse_iso_date("2019-06-21"), Ok(date!(2019 - 06 - 21)));
        assert!(matches!(
            parse_iso_date("06/21/2019"),
            Err(ValidationError::InvalidDate { expected: "YYYY-MM-DD", .. })
        ));
    }

    #[test]
    fn parses_compact_dates() {
        assert_eq!(parse_compact_date("20190621"), Ok(date!(2019 - 06 - 21)));
        assert!(parse_compact_date("2019062").is_err());
        assert!(parse_compact_date("20191321").is_err());
        assert!(parse_compact_date("2019-06-21").is_err());
    }

    #[test]
    fn compact_format_is_zero_padded() {
        assert_eq!(format_compact_date(date!(2020 - 01 - 05)), "20200105");
        assert_eq!(format_iso_date(date!(2020 - 01 - 05)), "2020-01-05");
    }

    #[test]
    fn epoch_millis_keep_sub_second_precision() {
        assert_eq!(
            from_epoch_millis(1_561_147_200_123),
            Some(datetime!(2019-06-21 20:00:00.123 UTC))
        );
        assert_eq!(from_epoch_millis(0), None);
        assert_eq!(
            to_epoch_millis(datetime!(2019-06-21 20:00:00.123 UTC)),
            Some(1_561_147_200_123)
        );
    }

    #[test]
    fn string_floats_are_parsed() {
        assert_eq!(parse_float_str(" 0.68 "), Some(0.68));
        assert_eq!(parse_float_str(""), None);
        assert_eq!(parse_float_str("NaN"), None);

        let text: FlexFloat = serde_json::from_str("\"1.5\"").expect("string form");
        let number: FlexFloat = serde_json::from_str("1.5").expect("number form");
        assert_eq!(text.value(), Some(1.5));
        assert_eq!(number.value(), Some(1.5));
    }

    #[test]
    fn optional_dates_are_lenient() {
        assert_eq!(optional_iso_date("exDate", None), None);
        assert_eq!(optional_iso_date("exDate", Some("")), None);
        assert_eq!(optional_iso_date("exDate", Some("garbage")), None);
        assert_eq!(
            optional_compact_date("expirationDate", Some("20191220")),
            Some(date!(2019 - 12 - 20))
        );
    }

    #[test]
    fn minute_labels_join_dates() {
        assert_eq!(
            date_with_minute(date!(2019 - 06 - 21), "09:30"),
            Some(datetime!(2019-06-21 09:30))
        );
        assert_eq!(date_with_minute(date!(2019 - 06 - 21), "930"), None);
    }

    #[test]
    fn market_zone_follows_daylight_saving() {
        let summer = in_market_zone(datetime!(2019-06-21 09:30)).expect("EDT");
        assert_eq!(summer.offset(), offset!(-4));
        assert_eq!(summer, datetime!(2019-06-21 13:30 UTC));

        let winter = in_market_zone(datetime!(2019-12-20 09:30)).expect("EST");
        assert_eq!(winter.offset(), offset!(-5));
        assert_eq!(winter, datetime!(2019-12-20 14:30 UTC));
    }

    #[test]
    fn market_zone_rejects_the_spring_forward_gap() {
        assert_eq!(in_market_zone(datetime!(2019-03-10 02:30)), None);
        assert_eq!(
            in_market_zone(datetime!(2019-11-03 01:30)),
            Some(datetime!(2019-11-03 01:30 -4))
        );
    }
}
