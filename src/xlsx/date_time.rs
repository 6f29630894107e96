//! ISO 8601 style date/time strings to spreadsheet serial dates.
//!
//! The 1900 epoch reproduces Excel's phantom leap day (1900-02-29 is day 60),
//! so every serial after February 1900 is one larger than the true day count.

use crate::common::number::round_10;
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Convert `yyyy-mm-ddThh:mm:ss.sss` (or a date-only `yyyy-mm-ddT`, or a
/// time-only `Thh:mm:ss`) to a serial date.
///
/// Returns `None` for malformed text or out-of-range components.
///
/// # Examples
///
/// ```
/// use litchi_xlsxwriter::xlsx::date_time::convert_date_time;
/// assert_eq!(convert_date_time("2008-07-24T", false), Some(39653.0));
/// assert_eq!(convert_date_time("T12:00", false), Some(0.5));
/// assert_eq!(convert_date_time("2008-13-01T", false), None);
/// ```
pub fn convert_date_time(date_time: &str, date_1904: bool) -> Option<f64> {
    let s = date_time.trim();

    if !s
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'T' | b':' | b'-' | b'.' | b'Z'))
    {
        return None;
    }

    if !has_date_time_marker(s) {
        return None;
    }

    let s = s.strip_suffix('Z').unwrap_or(s);

    let mut parts: Vec<&str> = s.split('T').collect();
    while parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }
    let date = parts.first().copied().unwrap_or("");
    let time = parts.get(1).copied();

    let mut seconds = 0.0;
    if let Some(time) = time {
        let (hour, min, sec) = parse_time(time)?;
        if hour >= 24 || min >= 60 || sec >= 60.0 {
            return None;
        }
        seconds = (hour as f64 * 3600.0 + min as f64 * 60.0 + sec) / SECONDS_PER_DAY;
    }

    if date.is_empty() {
        return Some(seconds);
    }

    if !date_1904 {
        match date {
            "1899-12-31" | "1900-01-00" => return Some(seconds),
            "1900-02-29" => return Some(60.0 + seconds),
            _ => {},
        }
    }

    let date = parse_date(date)?;
    Some(round_10(date_to_serial(date, date_1904)? + seconds))
}

/// Whether `s` has a `T` next to a digit, as in `2008-07-24T` or `T12:00`.
pub(crate) fn has_date_time_marker(s: &str) -> bool {
    s.as_bytes().windows(2).any(|w| {
        (w[0].is_ascii_digit() && w[1] == b'T') || (w[0] == b'T' && w[1].is_ascii_digit())
    })
}

/// Convert a `chrono` timestamp to a serial date.
pub fn datetime_to_serial(dt: &NaiveDateTime, date_1904: bool) -> Option<f64> {
    let time = dt.time();
    let seconds =
        time.num_seconds_from_midnight() as f64 + time.nanosecond() as f64 / 1_000_000_000.0;
    Some(round_10(
        date_to_serial(dt.date(), date_1904)? + seconds / SECONDS_PER_DAY,
    ))
}

/// Whole days since the epoch, counting the phantom 1900-02-29.
///
/// Dates before the epoch year or after 9999 have no serial.
fn date_to_serial(date: NaiveDate, date_1904: bool) -> Option<f64> {
    let (epoch_year, base) = if date_1904 {
        (1904, NaiveDate::from_ymd_opt(1904, 1, 1)?)
    } else {
        (1900, NaiveDate::from_ymd_opt(1899, 12, 31)?)
    };
    if date.year() < epoch_year || date.year() > 9999 {
        return None;
    }

    let mut days = (date - base).num_days();
    if !date_1904 && days > 59 {
        days += 1;
    }
    Some(days as f64)
}

/// `hh:mm` with optional `:ss` or `:ss.fff`; trailing text is ignored.
fn parse_time(time: &str) -> Option<(u32, u32, f64)> {
    let b = time.as_bytes();
    let two_digits = |at: usize| -> Option<u32> {
        let d = b.get(at..at + 2)?;
        if d.iter().all(u8::is_ascii_digit) {
            Some(((d[0] - b'0') * 10 + (d[1] - b'0')) as u32)
        } else {
            None
        }
    };

    let hour = two_digits(0)?;
    if b.get(2) != Some(&b':') {
        return None;
    }
    let min = two_digits(3)?;

    let mut sec = 0.0;
    if b.get(5) == Some(&b':') {
        if let Some(whole) = two_digits(6) {
            let mut end = 8;
            if b.get(8) == Some(&b'.') && b.get(9).is_some_and(u8::is_ascii_digit) {
                end = 9;
                while b.get(end).is_some_and(u8::is_ascii_digit) {
                    end += 1;
                }
            }
            sec = time[6..end].parse().unwrap_or(whole as f64);
        }
    }
    Some((hour, min, sec))
}

/// Strict `yyyy-mm-dd`.
fn parse_date(date: &str) -> Option<NaiveDate> {
    let b = date.as_bytes();
    if b.len() != 10 || b[4] != b'-' || b[7] != b'-' {
        return None;
    }
    let field = |r: std::ops::Range<usize>| -> Option<u32> {
        let d = &date[r];
        if d.bytes().all(|c| c.is_ascii_digit()) {
            d.parse().ok()
        } else {
            None
        }
    };
    NaiveDate::from_ymd_opt(field(0..4)? as i32, field(5..7)?, field(8..10)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn epoch_1900_quirks() {
        assert_eq!(convert_date_time("1899-12-31T", false), Some(0.0));
        assert_eq!(convert_date_time("1900-01-00T", false), Some(0.0));
        assert_eq!(convert_date_time("1900-01-01T", false), Some(1.0));
        assert_eq!(convert_date_time("1900-02-28T", false), Some(59.0));
        assert_eq!(convert_date_time("1900-02-29T", false), Some(60.0));
        assert_eq!(convert_date_time("1900-03-01T", false), Some(61.0));
        assert_eq!(convert_date_time("1899-12-31T12:00", false), Some(0.5));
    }

    #[test]
    fn known_dates() {
        assert_eq!(convert_date_time("2008-07-24T", false), Some(39653.0));
        assert_eq!(convert_date_time("9999-12-31T", false), Some(2958465.0));
        assert_eq!(convert_date_time("2000-01-01T00:00:00Z", false), Some(36526.0));
    }

    #[test]
    fn epoch_1904() {
        assert_eq!(convert_date_time("1904-01-01T", true), Some(0.0));
        assert_eq!(convert_date_time("1904-01-02T", true), Some(1.0));
        assert_eq!(convert_date_time("2008-07-24T", true), Some(38191.0));
        assert_eq!(convert_date_time("1900-02-29T", true), None);
    }

    #[test]
    fn times() {
        assert_eq!(convert_date_time("T12:00", false), Some(0.5));
        assert_eq!(convert_date_time("T06:00:00", false), Some(0.25));
        assert_eq!(convert_date_time("T00:00:00.5", false), Some(round_10(0.5 / 86_400.0)));
        assert_eq!(
            convert_date_time("2008-07-24T18:00:00.000", false),
            Some(39653.75)
        );
    }

    #[test]
    fn malformed_or_out_of_range() {
        for bad in [
            "2008-13-01T",
            "2008-00-01T",
            "2008-02-30T",
            "2007-02-29T",
            "1899-12-30T",
            "10000-01-01T",
            "T24:00",
            "T12:60",
            "T12:00:60",
            "2008-07-24",
            "2008/07/24T",
            "T1:00",
            "Tnoon",
            "",
        ] {
            assert_eq!(convert_date_time(bad, false), None, "{bad}");
        }
    }

    #[test]
    fn leap_years() {
        assert!(convert_date_time("2000-02-29T", false).is_some());
        assert!(convert_date_time("2004-02-29T", false).is_some());
        assert!(convert_date_time("2100-02-29T", false).is_none());
    }

    #[test]
    fn chrono_timestamps() {
        let dt = NaiveDate::from_ymd_opt(2008, 7, 24)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(datetime_to_serial(&dt, false), Some(39653.5));
    }

    #[test]
    fn chrono_timestamps_match_text() {
        let dt = NaiveDate::from_ymd_opt(2008, 7, 24)
            .unwrap()
            .and_hms_milli_opt(18, 30, 15, 250)
            .unwrap();
        assert_eq!(
            datetime_to_serial(&dt, false),
            convert_date_time("2008-07-24T18:30:15.250", false)
        );
        assert_eq!(
            datetime_to_serial(&dt, true),
            convert_date_time("2008-07-24T18:30:15.250", true)
        );

        let march = NaiveDate::from_ymd_opt(1900, 3, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(datetime_to_serial(&march, false), Some(61.0));
        let early = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(datetime_to_serial(&early, false), None);
        let pre_1904 = NaiveDate::from_ymd_opt(1903, 12, 31).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(datetime_to_serial(&pre_1904, true), None);
    }

    proptest! {
        #[test]
        fn consecutive_days_differ_by_one(days in 61i64..2_900_000) {
            let base = NaiveDate::from_ymd_opt(1900, 3, 1).unwrap();
            let a = base + chrono::Duration::days(days);
            let b = a + chrono::Duration::days(1);
            let fa = convert_date_time(&format!("{}T", a.format("%Y-%m-%d")), false);
            let fb = convert_date_time(&format!("{}T", b.format("%Y-%m-%d")), false);
            if let (Some(fa), Some(fb)) = (fa, fb) {
                prop_assert_eq!(fb - fa, 1.0);
            }
        }
    }
}
