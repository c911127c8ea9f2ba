/*!
 * Sunrise and sunset.
 *
 * Uses the NOAA general solar position approximation, good to a minute or two away from the
 * polar circles.
 */

use crate::{climate_time::is_leap_year, query::SunCalculator};
use chrono::{Datelike, NaiveDate, NaiveTime};

/// Solar zenith angle at sunrise and sunset, corrected for refraction and the solar disk.
const ZENITH_DEG: f64 = 90.833;

const MINUTES_PER_DAY: f64 = 1440.0;

/// Sunrise and sunset from an analytic approximation of the solar position.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolarCalculator;

impl SunCalculator for SolarCalculator {
    fn rise_set(
        &self,
        date: NaiveDate,
        lat: f64,
        lon: f64,
        utc_offset: i32,
    ) -> Option<(NaiveTime, NaiveTime)> {
        let (rise, set) = rise_set_utc_minutes(date, lat, lon)?;
        let shift = f64::from(utc_offset) * 60.0;

        Some((
            minutes_to_time(rise + shift)?,
            minutes_to_time(set + shift)?,
        ))
    }
}

/**
 * Sunrise and sunset in minutes after 00Z.
 *
 * #Arguments
 * * date - the calendar date.
 * * lat - latitude in degrees.
 * * lon - longitude in degrees, west negative.
 *
 * #Returns
 * `None` when the sun does not cross the horizon that day.
 */
fn rise_set_utc_minutes(date: NaiveDate, lat: f64, lon: f64) -> Option<(f64, f64)> {
    const DEG2RAD: f64 = 2.0 * std::f64::consts::PI / 360.0;

    let days_in_year = if is_leap_year(date.year()) { 366.0 } else { 365.0 };
    let gamma = 2.0 * std::f64::consts::PI / days_in_year * f64::from(date.ordinal0());

    let eqtime = 229.18
        * (0.000075 + 0.001868 * f64::cos(gamma)
            - 0.032077 * f64::sin(gamma)
            - 0.014615 * f64::cos(2.0 * gamma)
            - 0.040849 * f64::sin(2.0 * gamma));

    let decl = 0.006918 - 0.399912 * f64::cos(gamma) + 0.070257 * f64::sin(gamma)
        - 0.006758 * f64::cos(2.0 * gamma)
        + 0.000907 * f64::sin(2.0 * gamma)
        - 0.002697 * f64::cos(3.0 * gamma)
        + 0.00148 * f64::sin(3.0 * gamma);

    let lat_r = lat * DEG2RAD;
    let cos_ha = f64::cos(ZENITH_DEG * DEG2RAD) / (f64::cos(lat_r) * f64::cos(decl))
        - f64::tan(lat_r) * f64::tan(decl);

    if !(-1.0..=1.0).contains(&cos_ha) {
        return None;
    }

    let ha = f64::acos(cos_ha) / DEG2RAD;
    let rise = 720.0 - 4.0 * (lon + ha) - eqtime;
    let set = 720.0 - 4.0 * (lon - ha) - eqtime;

    Some((rise, set))
}

fn minutes_to_time(minutes: f64) -> Option<NaiveTime> {
    let minutes = minutes.rem_euclid(MINUTES_PER_DAY).round() as u32 % 1440;
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
}

#[cfg(test)]
mod test {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn minutes(t: NaiveTime) -> i64 {
        use chrono::Timelike;
        i64::from(t.hour() * 60 + t.minute())
    }

    #[test]
    fn test_mid_latitude_solstices() {
        let calc = SolarCalculator;

        // Philadelphia, standard time.
        let (rise, set) = calc.rise_set(date(2024, 6, 21), 39.95, -75.17, -5).unwrap();
        assert!((minutes(rise) - (4 * 60 + 33)).abs() <= 5, "{}", rise);
        assert!((minutes(set) - (19 * 60 + 33)).abs() <= 5, "{}", set);

        let (rise, set) = calc.rise_set(date(2024, 12, 21), 39.95, -75.17, -5).unwrap();
        assert!((minutes(rise) - (7 * 60 + 18)).abs() <= 5, "{}", rise);
        assert!((minutes(set) - (16 * 60 + 38)).abs() <= 5, "{}", set);
    }

    #[test]
    fn test_polar_day_and_night() {
        let calc = SolarCalculator;
        assert!(calc.rise_set(date(2024, 6, 21), 80.0, 15.0, 1).is_none());
        assert!(calc.rise_set(date(2024, 12, 21), 80.0, 15.0, 1).is_none());
    }

    #[test]
    fn test_wraps_across_midnight() {
        assert_eq!(minutes_to_time(-30.0), NaiveTime::from_hms_opt(23, 30, 0));
        assert_eq!(minutes_to_time(1500.0), NaiveTime::from_hms_opt(1, 0, 0));
        assert_eq!(minutes_to_time(1439.7), NaiveTime::from_hms_opt(0, 0, 0));
    }
}
