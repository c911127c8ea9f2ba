/*! Reference data about the stations reports are produced for. */

use chrono::{Datelike, NaiveDate, Weekday};

/// A climate station.
///
/// Stations are loaded once per run from the station directory and are never modified.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    /// Identifier used by every observation and normals query.
    pub id: i32,
    /// ICAO identifier, e.g. KMSO.
    pub icao: String,
    pub name: String,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees, west negative.
    pub lon: f64,
    /// Hours to add to UTC to get local standard time.
    pub utc_offset: i32,
    /// Stations that never switch to daylight saving time.
    pub std_all_year: bool,
}

impl Station {
    /// Is daylight saving time in effect for this station on the given date?
    pub fn observes_dst_on(&self, date: NaiveDate) -> bool {
        !self.std_all_year && in_us_daylight_time(date)
    }

    /// The offset from UTC of the local clock on this date, daylight saving included.
    pub fn clock_offset(&self, date: NaiveDate) -> i32 {
        if self.observes_dst_on(date) {
            self.utc_offset + 1
        } else {
            self.utc_offset
        }
    }

    /// A time zone label such as "EST" or "AKDT".
    pub fn zone_label(&self, date: NaiveDate) -> String {
        let prefix = match self.utc_offset {
            -4 => "A",
            -5 => "E",
            -6 => "C",
            -7 => "M",
            -8 => "P",
            -9 => "AK",
            -10 => "H",
            -11 => "S",
            10 => "CH",
            _ => "L",
        };

        let suffix = if self.observes_dst_on(date) {
            "DT"
        } else {
            "ST"
        };

        format!("{}{}", prefix, suffix)
    }
}

/// US daylight saving rule: second Sunday in March through the day before the first Sunday in
/// November.
fn in_us_daylight_time(date: NaiveDate) -> bool {
    let year = date.year();
    let begin = nth_sunday(year, 3, 2);
    let end = nth_sunday(year, 11, 1);

    match (begin, end) {
        (Some(begin), Some(end)) => date >= begin && date < end,
        _ => false,
    }
}

fn nth_sunday(year: i32, month: u32, nth: u8) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, Weekday::Sun, nth)
}

#[cfg(test)]
mod test {
    use super::*;

    fn station(utc_offset: i32, std_all_year: bool) -> Station {
        Station {
            id: 1,
            icao: "KXXX".to_owned(),
            name: "Test".to_owned(),
            lat: 40.0,
            lon: -100.0,
            utc_offset,
            std_all_year,
        }
    }

    #[test]
    fn test_zone_labels() {
        let winter = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let summer = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap();

        assert_eq!(station(-5, false).zone_label(winter), "EST");
        assert_eq!(station(-5, false).zone_label(summer), "EDT");
        assert_eq!(station(-9, false).zone_label(summer), "AKDT");
        assert_eq!(station(-7, true).zone_label(summer), "MST");
        assert_eq!(station(3, false).zone_label(winter), "LST");
    }

    #[test]
    fn test_dst_boundaries() {
        // 2024: March 10 through November 2
        assert!(!in_us_daylight_time(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()));
        assert!(in_us_daylight_time(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()));
        assert!(in_us_daylight_time(NaiveDate::from_ymd_opt(2024, 11, 2).unwrap()));
        assert!(!in_us_daylight_time(NaiveDate::from_ymd_opt(2024, 11, 3).unwrap()));

        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(station(-5, false).clock_offset(date), -4);
        assert_eq!(station(-7, true).clock_offset(date), -7);
    }
}
