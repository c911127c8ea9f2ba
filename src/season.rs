/*!
 * Start dates of the seasons and years accumulations are summed over.
 *
 * Every accumulated element uses meteorological seasons. Heating degree days and snowfall use a
 * July through June year so a single winter is never split. Cooling degree days and
 * precipitation use the calendar year.
 */

use crate::{
    climate_time::{first_of_month, ymd},
    window::season_start_month,
};
use chrono::{Datelike, NaiveDate};

/// First month of the July through June year.
const COLD_YEAR_START_MONTH: u32 = 7;

/// Start dates of the season and year containing a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    pub month: NaiveDate,
    pub season: NaiveDate,
    pub year: NaiveDate,
}

/// Accumulation start dates for every accumulated element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonYearBoundaries {
    pub precip: Boundary,
    pub snow: Boundary,
    pub heat: Boundary,
    pub cool: Boundary,
}

impl SeasonYearBoundaries {
    /// The boundaries in effect on `date`.
    pub fn for_date(date: NaiveDate) -> Option<Self> {
        let month = first_of_month(date)?;
        let season = season_start(date)?;
        let calendar_year = ymd(date.year(), 1, 1)?;
        let cold_year = cold_year_start(date)?;

        let calendar = Boundary {
            month,
            season,
            year: calendar_year,
        };
        let cold = Boundary {
            month,
            season,
            year: cold_year,
        };

        Some(SeasonYearBoundaries {
            precip: calendar,
            snow: cold,
            heat: cold,
            cool: calendar,
        })
    }
}

fn season_start(date: NaiveDate) -> Option<NaiveDate> {
    let start_month = season_start_month(date.month());
    let year = if start_month > date.month() {
        date.year() - 1
    } else {
        date.year()
    };
    ymd(year, start_month, 1)
}

fn cold_year_start(date: NaiveDate) -> Option<NaiveDate> {
    let year = if date.month() >= COLD_YEAR_START_MONTH {
        date.year()
    } else {
        date.year() - 1
    };
    ymd(year, COLD_YEAR_START_MONTH, 1)
}
