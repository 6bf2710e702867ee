use time::macros::format_description;
use time::{Date, OffsetDateTime};

/// Calendar dates travel as `YYYY-MM-DD` in both JSON bodies and query strings.
pub fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}

pub fn parse_date(text: &str) -> Result<Date, time::error::Parse> {
    Date::parse(text.trim(), format_description!("[year]-[month]-[day]"))
}

pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

pub fn current_year() -> i32 {
    today().year()
}

/// Serde adapter for `#[serde(with = "iso_date")]` fields.
pub mod iso_date {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_date(&text).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn formats_with_zero_padding() {
        assert_eq!(format_date(date!(2024 - 01 - 03)), "2024-01-03");
    }

    #[test]
    fn rejects_non_calendar_text() {
        assert!(parse_date("2024-13-01").is_err());
        assert!(parse_date("tomorrow").is_err());
        assert_eq!(parse_date(" 2024-02-29 ").unwrap(), date!(2024 - 02 - 29));
    }
}
