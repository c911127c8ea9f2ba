/*! Calendar arithmetic, rounding, and unit conversions shared by the derivation pipeline. */

use chrono::{Datelike, NaiveDate};

/// Offset between a chrono day count from the common era and a Julian day number.
const JULIAN_DAY_AT_CE: i64 = 1_721_425;

/// Is this a leap year in the Gregorian calendar?
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// The number of days in a month, `month` is 1-based.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// The Julian day number of a date (the integer day beginning at noon UTC of that date).
pub fn julian_day(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce()) + JULIAN_DAY_AT_CE
}

/// Convert a Julian day number back into a calendar date.
pub fn from_julian_day(jd: i64) -> Option<NaiveDate> {
    let days = i32::try_from(jd - JULIAN_DAY_AT_CE).ok()?;
    NaiveDate::from_num_days_from_ce_opt(days)
}

/// Walk a date by a number of days via its Julian day number.
///
/// Month and year rollover fall out of the day number, there is no calendar field arithmetic.
pub fn shift_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    from_julian_day(julian_day(date) + days)
}

/// Every date from `begin` through `end`, inclusive.
pub fn date_range(begin: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    std::iter::successors(Some(begin), move |d| d.succ_opt().filter(|next| *next <= end))
        .take_while(move |d| *d <= end)
}

/// Build a date, `None` if the fields do not describe a real calendar day.
pub fn ymd(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

/// The first day of the month that contains `date`.
pub fn first_of_month(date: NaiveDate) -> Option<NaiveDate> {
    date.with_day(1)
}

/// Round to the nearest integer the way archived climate values were rounded.
///
/// Halves round away from zero, and the rounding point sits at 0.49 rather than 0.5. Stored
/// normals and records were produced this way, so comparisons against them must be too.
pub fn nint(val: f64) -> i32 {
    if val > 0.0 {
        (val + 0.51) as i32
    } else {
        (val - 0.51) as i32
    }
}

/// Celsius to Fahrenheit.
pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c / (5.0 / 9.0) + 32.0
}

/// Fahrenheit to Celsius.
#[cfg(test)]
pub(crate) fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * (5.0 / 9.0)
}

pub const MPH_PER_KNOT: f64 = 1.150_776_775;

/// Knots to statute miles per hour.
pub fn knots_to_mph(kt: f64) -> f64 {
    kt * MPH_PER_KNOT
}

/// Shift a UTC hour of day into local standard time, wrapped into `0..24`.
pub fn utc_hour_to_local(hour: u32, utc_offset: i32) -> u32 {
    (hour as i32 + utc_offset).rem_euclid(24) as u32
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_leap_years() {
        assert!(is_leap_year(2024));
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2023));

        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2023, 12), 31);
        assert_eq!(days_in_month(2023, 13), 0);
    }

    #[test]
    fn test_julian_day_round_trip_across_year_boundary() {
        let new_year = ymd(2024, 1, 1).unwrap();
        assert_eq!(julian_day(new_year), 2_460_311);

        let back = shift_days(new_year, -1).unwrap();
        assert_eq!(back, ymd(2023, 12, 31).unwrap());

        let leap = shift_days(ymd(2024, 2, 28).unwrap(), 1).unwrap();
        assert_eq!(leap, ymd(2024, 2, 29).unwrap());
    }

    #[test]
    fn test_date_range() {
        let days: Vec<_> = date_range(ymd(2023, 12, 30).unwrap(), ymd(2024, 1, 2).unwrap()).collect();
        assert_eq!(days.len(), 4);
        assert_eq!(days[3], ymd(2024, 1, 2).unwrap());

        let none: Vec<_> = date_range(ymd(2024, 1, 2).unwrap(), ymd(2024, 1, 1).unwrap()).collect();
        assert!(none.is_empty());
    }

    #[test]
    fn test_nint() {
        assert_eq!(nint(50.0), 50);
        assert_eq!(nint(72.5), 73);
        assert_eq!(nint(72.6), 73);
        assert_eq!(nint(72.3), 72);
        assert_eq!(nint(-3.5), -4);
        assert_eq!(nint(0.0), 0);
    }

    #[test]
    fn test_unit_conversions() {
        assert!((celsius_to_fahrenheit(100.0) - 212.0).abs() < 1.0e-9);
        assert!((celsius_to_fahrenheit(-40.0) + 40.0).abs() < 1.0e-9);
        assert!((fahrenheit_to_celsius(32.0)).abs() < 1.0e-9);
        assert!((knots_to_mph(10.0) - 11.50776775).abs() < 1.0e-9);
    }

    #[test]
    fn test_utc_hour_to_local_wraps() {
        assert_eq!(utc_hour_to_local(3, -5), 22);
        assert_eq!(utc_hour_to_local(23, 10), 9);
        assert_eq!(utc_hour_to_local(12, 0), 12);
    }
}
