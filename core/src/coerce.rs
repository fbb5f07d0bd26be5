//! Lenient string-to-value conversions.
//!
//! Every conversion here is total: when a token cannot be parsed the caller's
//! default (or the type's zero value) is returned instead. This keeps the
//! parser permissive toward malformed user input; structural problems are
//! reported elsewhere.
//!
//! # Examples
//!
//! ```
//! use yaclap_core::Coerce;
//!
//! assert_eq!("42".to_int(0), 42);
//! assert_eq!("abc".to_int(5), 5);
//! assert!("Yes".to_bool());
//! assert!(!"no".to_bool());
//! ```

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Date/time layouts accepted by [`Coerce::to_date_time`], tried in order
/// after RFC 3339.
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Date-only layouts; the time part is midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

/// Tokens that coerce to `true`, compared case-insensitively.
const TRUTHY: &[&str] = &["yes", "true", "1"];

/// The earliest representable calendar value, `0001-01-01T00:00:00`.
///
/// Returned by [`Coerce::to_date_time`] when parsing fails and no default is
/// supplied.
///
/// # Examples
///
/// ```
/// use chrono::Datelike;
///
/// let min = yaclap_core::date_time_min();
/// assert_eq!((min.year(), min.month(), min.day()), (1, 1, 1));
/// ```
pub fn date_time_min() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MIN)
}

/// Lenient conversions from a raw token.
///
/// Implemented for [`str`], so it applies to `String` and `&str` alike.
pub trait Coerce {
    /// Parses a 32-bit integer, or returns `default`.
    fn to_int(&self, default: i32) -> i32;

    /// Parses a 64-bit integer, or returns `default`.
    fn to_long(&self, default: i64) -> i64;

    /// Parses a single-precision float, or returns `default`.
    fn to_float(&self, default: f32) -> f32;

    /// Parses a double-precision float, or returns `default`.
    fn to_double(&self, default: f64) -> f64;

    /// Parses a decimal (plain or scientific notation), or returns `default`.
    ///
    /// ```
    /// use rust_decimal::Decimal;
    /// use yaclap_core::Coerce;
    ///
    /// assert_eq!("12.50".to_decimal(Decimal::ZERO), Decimal::new(1250, 2));
    /// assert_eq!("twelve".to_decimal(Decimal::ONE), Decimal::ONE);
    /// ```
    fn to_decimal(&self, default: Decimal) -> Decimal;

    /// `"yes"`, `"true"` and `"1"` (any case) are `true`; anything else,
    /// including the empty string and padded forms like `" yes"`, is
    /// `false`.
    fn to_bool(&self) -> bool;

    /// Parses a date/time, falling back to `default` or [`date_time_min`].
    ///
    /// ```
    /// use yaclap_core::{Coerce, date_time_min};
    ///
    /// let parsed = "2024-01-15T10:30:00Z".to_date_time(None);
    /// assert_eq!(parsed.to_string(), "2024-01-15 10:30:00");
    /// assert_eq!("not-a-date".to_date_time(None), date_time_min());
    /// ```
    fn to_date_time(&self, default: Option<NaiveDateTime>) -> NaiveDateTime;

    /// Parses a GUID in any of the common textual forms, falling back to
    /// `default` or the nil UUID.
    fn to_guid(&self, default: Option<Uuid>) -> Uuid;

    /// Parses any [`FromStr`] type, or returns `default`.
    ///
    /// ```
    /// use std::net::Ipv4Addr;
    /// use yaclap_core::Coerce;
    ///
    /// assert_eq!("127.0.0.1".parse_or(Ipv4Addr::UNSPECIFIED), Ipv4Addr::LOCALHOST);
    /// assert_eq!("localhost".parse_or(Ipv4Addr::UNSPECIFIED), Ipv4Addr::UNSPECIFIED);
    /// ```
    fn parse_or<T: FromStr>(&self, default: T) -> T;
}

impl Coerce for str {
    fn to_int(&self, default: i32) -> i32 {
        self.parse_or(default)
    }

    fn to_long(&self, default: i64) -> i64 {
        self.parse_or(default)
    }

    fn to_float(&self, default: f32) -> f32 {
        self.parse_or(default)
    }

    fn to_double(&self, default: f64) -> f64 {
        self.parse_or(default)
    }

    fn to_decimal(&self, default: Decimal) -> Decimal {
        let trimmed = self.trim();
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .unwrap_or(default)
    }

    fn to_bool(&self) -> bool {
        TRUTHY.iter().any(|t| t.eq_ignore_ascii_case(self))
    }

    fn to_date_time(&self, default: Option<NaiveDateTime>) -> NaiveDateTime {
        parse_date_time(self.trim())
            .or(default)
            .unwrap_or_else(date_time_min)
    }

    fn to_guid(&self, default: Option<Uuid>) -> Uuid {
        Uuid::parse_str(self.trim())
            .ok()
            .or(default)
            .unwrap_or_else(Uuid::nil)
    }

    fn parse_or<T: FromStr>(&self, default: T) -> T {
        self.trim().parse().unwrap_or(default)
    }
}

fn parse_date_time(value: &str) -> Option<NaiveDateTime> {
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Splits a `|`-separated string into an argv-style token vector.
///
/// Handy for tests and demos that need to simulate what a program receives
/// from its shell.
///
/// ```
/// assert_eq!(
///     yaclap_core::to_args_array("add|file.txt|--key|a value"),
///     vec!["add", "file.txt", "--key", "a value"],
/// );
/// ```
pub fn to_args_array(value: &str) -> Vec<String> {
    value.split('|').map(String::from).collect()
}

/// Returns the element at `index`, or `default` when out of bounds.
///
/// ```
/// let args = vec!["replace".to_string(), "a.txt".to_string()];
/// assert_eq!(yaclap_core::defaulting_index(&args, 1, ""), "a.txt");
/// assert_eq!(yaclap_core::defaulting_index(&args, 2, ""), "");
/// ```
pub fn defaulting_index<'a>(values: &'a [String], index: usize, default: &'a str) -> &'a str {
    values.get(index).map(String::as_str).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    #[test]
    fn test_to_int_falls_back_to_default() {
        assert_eq!("17".to_int(0), 17);
        assert_eq!(" -3 ".to_int(0), -3);
        assert_eq!("abc".to_int(5), 5);
        assert_eq!("".to_int(9), 9);
        assert_eq!("99999999999".to_int(1), 1);
        assert_eq!("99999999999".to_long(1), 99_999_999_999);
    }

    #[test]
    fn test_floating_point_conversions() {
        assert_eq!("1.5".to_float(0.0), 1.5);
        assert_eq!("x".to_float(2.0), 2.0);
        assert_eq!("2.25".to_double(0.0), 2.25);
        assert_eq!("1e3".to_double(0.0), 1000.0);
        assert_eq!("nope".to_double(0.0), 0.0);
    }

    #[test]
    fn test_to_decimal_accepts_scientific_notation() {
        assert_eq!("1.2e2".to_decimal(Decimal::ZERO), Decimal::new(120, 0));
        assert_eq!("-0.01".to_decimal(Decimal::ZERO), Decimal::new(-1, 2));
        assert_eq!("1,2".to_decimal(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_to_bool_truthy_values() {
        for value in ["yes", "YES", "true", "True", "1"] {
            assert!(value.to_bool(), "{value} should be true");
        }
        for value in ["", "no", "false", "0", "2", "y", "on", " yes", "true ", "\t1"] {
            assert!(!value.to_bool(), "{value} should be false");
        }
    }

    #[test]
    fn test_to_date_time_formats() {
        let dt = "2023-06-01 08:15:30".to_date_time(None);
        assert_eq!((dt.year(), dt.month(), dt.day()), (2023, 6, 1));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (8, 15, 30));

        let date_only = "2023/06/01".to_date_time(None);
        assert_eq!(date_only.date(), NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());
        assert_eq!(date_only.hour(), 0);

        let offset = "2023-06-01T10:00:00+02:00".to_date_time(None);
        assert_eq!(offset.hour(), 8);
    }

    #[test]
    fn test_to_date_time_uses_supplied_default() {
        let fallback = NaiveDate::from_ymd_opt(2000, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!("garbage".to_date_time(Some(fallback)), fallback);
        assert_eq!("garbage".to_date_time(None), date_time_min());
    }

    #[test]
    fn test_to_guid_forms() {
        let expected = Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        assert_eq!("67e55044-10b1-426f-9247-bb680e5fe0c8".to_guid(None), expected);
        assert_eq!("67e5504410b1426f9247bb680e5fe0c8".to_guid(None), expected);
        assert_eq!("{67e55044-10b1-426f-9247-bb680e5fe0c8}".to_guid(None), expected);
        assert_eq!("not-a-guid".to_guid(None), Uuid::nil());
        assert_eq!("not-a-guid".to_guid(Some(expected)), expected);
    }

    #[test]
    fn test_defaulting_index() {
        let args = to_args_array("delete");
        assert_eq!(defaulting_index(&args, 0, "none"), "delete");
        assert_eq!(defaulting_index(&args, 1, "none"), "none");
    }
}
