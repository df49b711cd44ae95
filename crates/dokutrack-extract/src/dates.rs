//! Date normalizer.
//!
//! Date cells arrive in several shapes: numeric spreadsheet serials, ISO
//! dates, day-first Indonesian forms, bare day numbers under a month band,
//! and the occasional ISO datetime. [`normalize_date`] tries them in a fixed
//! priority order and returns `None` for anything unreadable; callers treat
//! `None` as "skip this entry", never as a failure.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};

/// Years outside this window are treated as garbage, whatever produced them.
const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2100;

/// Serials at or below this describe dates before the format's phantom
/// 1900-02-29 and need one day less of correction.
const LEAP_BUG_SERIAL: i64 = 59;

/// Convert raw cell text to a calendar date.
///
/// Recognized forms, first match wins:
/// 1. bare day-of-month (only when `context` supplies the band's year and
///    month; a one or two digit header is conclusively a day, valid or not)
/// 2. numeric spreadsheet serial, valid in the open interval (1, 100000)
/// 3. `YYYY-MM-DD`
/// 4. `DD/MM/YYYY` or `DD-MM-YYYY` (single-digit day and month accepted)
/// 5. fallback: ISO datetime or `YYYY/MM/DD`
///
/// All results are bounded to years 1900..=2100.
pub fn normalize_date(raw: &str, context: Option<(i32, u32)>) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Bare day numbers only mean something under a month band. When the
    // caller supplies that band, a short number is a day and nothing else;
    // the serial reading would land every header in January 1900.
    if let Some((year, month)) = context {
        if trimmed.len() <= 2 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return from_bare_day(trimmed, year, month);
        }
    }

    if is_plain_number(trimmed) {
        return from_serial(trimmed.parse().ok()?);
    }

    from_ymd(trimmed)
        .or_else(|| from_day_first(trimmed, '/'))
        .or_else(|| from_day_first(trimmed, '-'))
        .or_else(|| from_fallback(trimmed))
}

/// Presentation form `DD-Mon-YY` ("05-Sep-25"). The canonical form for
/// storage and comparison is the `NaiveDate` itself, which renders
/// `YYYY-MM-DD`.
pub fn display_date(date: NaiveDate) -> String {
    date.format("%d-%b-%y").to_string()
}

/// Digits with an optional fractional part, nothing else.
fn is_plain_number(s: &str) -> bool {
    let mut parts = s.splitn(2, '.');
    let int = parts.next().unwrap_or("");
    let frac = parts.next();
    !int.is_empty()
        && int.bytes().all(|b| b.is_ascii_digit())
        && frac.map_or(true, |f| !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()))
}

/// Spreadsheet serial to date.
///
/// Serial 1 is 1900-01-01. The format believes 1900 was a leap year, so
/// serials past the phantom February 29 are shifted back one extra day.
/// The fractional part is time-of-day; truncating it first yields the same
/// calendar date as adding it to a midnight epoch.
fn from_serial(value: f64) -> Option<NaiveDate> {
    if !(value > 1.0 && value < 100_000.0) {
        return None;
    }
    let whole = value.trunc() as i64;
    let days = if whole > LEAP_BUG_SERIAL {
        whole - 2
    } else {
        whole - 1
    };
    let date = NaiveDate::from_ymd_opt(1900, 1, 1)?.checked_add_days(Days::new(days as u64))?;
    in_year_bounds(date)
}

/// Day-of-month under a known year/month; chrono refuses impossible days
/// (31 in a 30-day month, 29 in a non-leap February).
fn from_bare_day(s: &str, year: i32, month: u32) -> Option<NaiveDate> {
    let day: u32 = s.parse().ok()?;
    if !(1..=31).contains(&day) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn from_ymd(s: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    in_year_bounds(date)
}

fn from_day_first(s: &str, sep: char) -> Option<NaiveDate> {
    let fmt = if sep == '/' { "%d/%m/%Y" } else { "%d-%m-%Y" };
    let date = NaiveDate::parse_from_str(s, fmt).ok()?;
    in_year_bounds(date)
}

fn from_fallback(s: &str) -> Option<NaiveDate> {
    let date = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .map(|dt| dt.date())
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y/%m/%d"))
        .ok()?;
    in_year_bounds(date)
}

fn in_year_bounds(date: NaiveDate) -> Option<NaiveDate> {
    (MIN_YEAR..=MAX_YEAR).contains(&date.year()).then_some(date)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn serial_known_value() {
        // Hand-computed: 45901 days with the leap-bug correction lands on
        // 2025-09-01.
        assert_eq!(normalize_date("45901", None), Some(date(2025, 9, 1)));
    }

    #[test]
    fn serial_epoch_start() {
        assert_eq!(normalize_date("2", None), Some(date(1900, 1, 2)));
        assert_eq!(normalize_date("31", None), Some(date(1900, 1, 31)));
        assert_eq!(normalize_date("32", None), Some(date(1900, 2, 1)));
    }

    #[test]
    fn serial_leap_bug_boundary() {
        // 59 is the real 1900-02-28; 60 is the phantom February 29 and
        // collapses onto the 28th; 61 is March 1.
        assert_eq!(normalize_date("59", None), Some(date(1900, 2, 28)));
        assert_eq!(normalize_date("60", None), Some(date(1900, 2, 28)));
        assert_eq!(normalize_date("61", None), Some(date(1900, 3, 1)));
    }

    #[test]
    fn serial_bounds_are_exclusive() {
        assert_eq!(normalize_date("1", None), None);
        assert_eq!(normalize_date("0", None), None);
        assert_eq!(normalize_date("100000", None), None);
    }

    #[test]
    fn serial_beyond_year_cap_is_rejected() {
        // 99999 days is year 2173, outside the accepted window.
        assert_eq!(normalize_date("99999", None), None);
    }

    #[test]
    fn serial_fraction_is_time_of_day() {
        assert_eq!(normalize_date("45901.75", None), Some(date(2025, 9, 1)));
        assert_eq!(normalize_date("59.9", None), Some(date(1900, 2, 28)));
    }

    #[test]
    fn iso_date_form() {
        assert_eq!(normalize_date("2025-09-05", None), Some(date(2025, 9, 5)));
        assert_eq!(normalize_date("1899-12-31", None), None);
        assert_eq!(normalize_date("2101-01-01", None), None);
    }

    #[test]
    fn day_first_forms() {
        assert_eq!(normalize_date("05/09/2025", None), Some(date(2025, 9, 5)));
        assert_eq!(normalize_date("5/9/2025", None), Some(date(2025, 9, 5)));
        assert_eq!(normalize_date("05-09-2025", None), Some(date(2025, 9, 5)));
        assert_eq!(normalize_date("31/02/2025", None), None);
        assert_eq!(normalize_date("05/09/1899", None), None);
    }

    #[test]
    fn bare_day_needs_context() {
        assert_eq!(
            normalize_date("5", Some((2025, 9))),
            Some(date(2025, 9, 5))
        );
        assert_eq!(
            normalize_date("31", Some((2025, 10))),
            Some(date(2025, 10, 31))
        );
        // Without a band, a small number is a serial.
        assert_eq!(normalize_date("5", None), Some(date(1900, 1, 5)));
    }

    #[test]
    fn bare_day_rejects_impossible_days() {
        // September has 30 days.
        assert_eq!(normalize_date("31", Some((2025, 9))), None);
        assert_eq!(normalize_date("0", Some((2025, 9))), None);
        assert_eq!(normalize_date("99", Some((2025, 9))), None);
        assert_eq!(normalize_date("29", Some((2025, 2))), None);
        assert_eq!(normalize_date("29", Some((2024, 2))), Some(date(2024, 2, 29)));
    }

    #[test]
    fn context_does_not_shadow_full_dates() {
        assert_eq!(
            normalize_date("2025-09-05", Some((2025, 9))),
            Some(date(2025, 9, 5))
        );
        assert_eq!(
            normalize_date("05/09/2025", Some((2025, 9))),
            Some(date(2025, 9, 5))
        );
    }

    #[test]
    fn fallback_forms() {
        assert_eq!(
            normalize_date("2025-09-05T08:30:00", None),
            Some(date(2025, 9, 5))
        );
        assert_eq!(
            normalize_date("2025-09-05 08:30:00", None),
            Some(date(2025, 9, 5))
        );
        assert_eq!(normalize_date("2025/09/05", None), Some(date(2025, 9, 5)));
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(normalize_date("", None), None);
        assert_eq!(normalize_date("   ", None), None);
        assert_eq!(normalize_date("besok", None), None);
        assert_eq!(normalize_date("12.5.2025", None), None);
        assert_eq!(normalize_date("59.", None), None);
    }

    #[test]
    fn canonical_input_is_idempotent() {
        let first = normalize_date("05/09/2025", None).unwrap();
        let again = normalize_date(&first.to_string(), None);
        assert_eq!(again, Some(first));
    }

    #[test]
    fn display_form() {
        assert_eq!(display_date(date(2025, 9, 5)), "05-Sep-25");
        assert_eq!(display_date(date(2025, 11, 30)), "30-Nov-25");
    }
}
