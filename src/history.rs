/*!
 * Historical normals, last year's values, and month, season, and year to date accumulations.
 */

use crate::{
    climate_time::{date_range, days_in_month, is_leap_year, shift_days, ymd},
    query::{ClimateArchive, DailyElement, DailyNormals, Lookup, NormalsQuery, StoredDay},
    season::{Boundary, SeasonYearBoundaries},
    value::Amount,
};
use chrono::{Datelike, NaiveDate};
use log::warn;
use rustc_hash::FxHashMap as HashMap;

/// The same calendar date one year earlier, February 29 becomes February 28.
pub fn last_year_date(date: NaiveDate) -> NaiveDate {
    let year = date.year() - 1;
    let day = if date.month() == 2 && date.day() == 29 && !is_leap_year(year) {
        28
    } else {
        date.day()
    };

    ymd(year, date.month(), day).unwrap_or(date)
}

/**
 * Day of month for the end of a last year comparison range.
 *
 * A range ending on the last day of February ends on the last day of February in `last_year`,
 * whether that is the 28th or 29th. Any other end day is kept.
 */
pub fn last_year_end_day(end: NaiveDate, last_year: i32) -> u32 {
    if end.month() == 2 && end.day() == days_in_month(end.year(), 2) {
        days_in_month(last_year, 2)
    } else {
        end.day()
    }
}

/// The comparison range one year before `[begin, end]`.
pub fn last_year_range(begin: NaiveDate, end: NaiveDate) -> (NaiveDate, NaiveDate) {
    let begin_ly = last_year_date(begin);
    let year = end.year() - 1;
    let end_ly = ymd(year, end.month(), last_year_end_day(end, year)).unwrap_or(end);
    (begin_ly, end_ly)
}

/// Month, season, and year to date values of one element.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals<T> {
    pub month: T,
    pub season: T,
    pub year: T,
}

impl<T> Totals<T> {
    pub fn map<U, F: Fn(T) -> U>(self, f: F) -> Totals<U> {
        Totals {
            month: f(self.month),
            season: f(self.season),
            year: f(self.year),
        }
    }
}

/// Accumulated values, observed or normal, for every accumulated element.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Accumulations {
    pub precip: Totals<Amount>,
    pub snowfall: Totals<Amount>,
    pub heating_degree_days: Totals<Amount>,
    pub cooling_degree_days: Totals<Amount>,
}

/// Today's values of the accumulated elements.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DailyIncrements {
    pub precip: Amount,
    pub snowfall: Amount,
    pub heating_degree_days: Amount,
    pub cooling_degree_days: Amount,
}

/// Normals and last year's values that go with a daily record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriorYearAndNormals {
    pub normals_today: Option<DailyNormals>,
    pub normals_tomorrow: Option<DailyNormals>,
    pub last_year: Option<StoredDay>,
}

/**
 * Normals for `date` and the day after, and the stored record for the same date last year.
 *
 * Missing data only leaves the matching field empty.
 */
pub fn prior_year_and_normals<S>(
    sources: &S,
    station_id: i32,
    date: NaiveDate,
) -> PriorYearAndNormals
where
    S: ClimateArchive + NormalsQuery,
{
    let normals_for = |d: NaiveDate| {
        sources
            .daily_normals(station_id, d.month(), d.day())
            .or_warn("daily normals")
    };

    let normals_today = normals_for(date);
    let normals_tomorrow = shift_days(date, 1).and_then(normals_for);
    let last_year = sources
        .daily_record(station_id, last_year_date(date))
        .or_warn("last year daily record");

    PriorYearAndNormals {
        normals_today,
        normals_tomorrow,
        last_year,
    }
}

/// Combine the total through yesterday with today's value.
///
/// Missing on both sides stays missing rather than becoming zero.
pub fn update_accumulation(through_yesterday: Amount, today: Amount) -> Amount {
    if through_yesterday.is_missing() && today.is_missing() {
        Amount::Missing
    } else {
        through_yesterday.tally(today)
    }
}

/**
 * Month, season, and year to date totals of the observed elements, including today.
 *
 * On a boundary date the total is today's value and the archive is not consulted.
 */
pub fn accumulate_observed<A: ClimateArchive + ?Sized>(
    archive: &A,
    station_id: i32,
    date: NaiveDate,
    today: &DailyIncrements,
) -> Accumulations {
    let boundaries = match SeasonYearBoundaries::for_date(date) {
        Some(b) => b,
        None => return Accumulations::default(),
    };

    let element_totals = |element: DailyElement, boundary: &Boundary, today: Amount| {
        let total_from = |start: NaiveDate| {
            if start == date {
                return today;
            }

            let through_yesterday = match shift_days(date, -1) {
                Some(yesterday) => sum_stored(archive, station_id, element, start, yesterday),
                None => Amount::Missing,
            };
            update_accumulation(through_yesterday, today)
        };

        Totals {
            month: total_from(boundary.month),
            season: total_from(boundary.season),
            year: total_from(boundary.year),
        }
    };

    Accumulations {
        precip: element_totals(DailyElement::Precip, &boundaries.precip, today.precip),
        snowfall: element_totals(DailyElement::Snowfall, &boundaries.snow, today.snowfall),
        heating_degree_days: element_totals(
            DailyElement::HeatingDegreeDays,
            &boundaries.heat,
            today.heating_degree_days,
        ),
        cooling_degree_days: element_totals(
            DailyElement::CoolingDegreeDays,
            &boundaries.cool,
            today.cooling_degree_days,
        ),
    }
}

/// Month, season, and year to date totals of the normals, through `date`.
pub fn accumulate_normals<N: NormalsQuery + ?Sized>(
    normals: &N,
    station_id: i32,
    date: NaiveDate,
) -> Accumulations {
    let boundaries = match SeasonYearBoundaries::for_date(date) {
        Some(b) => b,
        None => return Accumulations::default(),
    };

    // The earliest boundary covers every other range.
    let earliest = [
        boundaries.precip.year,
        boundaries.snow.year,
        boundaries.precip.season,
    ]
    .iter()
    .copied()
    .min()
    .unwrap_or(date);

    let days = match normals.daily_normals_range(station_id, earliest, date) {
        Lookup::Found(days) => days,
        Lookup::NotFound => return Accumulations::default(),
        Lookup::Failed(err) => {
            warn!("normals for accumulations: {}", err);
            return Accumulations::default();
        }
    };

    let by_day: HashMap<(u32, u32), &DailyNormals> =
        days.iter().map(|n| ((n.month, n.day), n)).collect();

    let sum = |start: NaiveDate, value: &dyn Fn(&DailyNormals) -> Amount| {
        date_range(start, date)
            .filter_map(|d| by_day.get(&(d.month(), d.day())))
            .fold(Amount::Missing, |acc, n| update_accumulation(acc, value(*n)))
    };

    let totals = |boundary: &Boundary, value: &dyn Fn(&DailyNormals) -> Amount| Totals {
        month: sum(boundary.month, value),
        season: sum(boundary.season, value),
        year: sum(boundary.year, value),
    };

    let degree_days = |dd: Option<i32>| {
        dd.map(|v| Amount::Value(f64::from(v)))
            .unwrap_or_default()
    };

    Accumulations {
        precip: totals(&boundaries.precip, &|n: &DailyNormals| n.precip_mean),
        snowfall: totals(&boundaries.snow, &|n: &DailyNormals| n.snowfall_mean),
        heating_degree_days: totals(&boundaries.heat, &|n: &DailyNormals| {
            degree_days(n.heating_degree_days_mean)
        }),
        cooling_degree_days: totals(&boundaries.cool, &|n: &DailyNormals| {
            degree_days(n.cooling_degree_days_mean)
        }),
    }
}

fn sum_stored<A: ClimateArchive + ?Sized>(
    archive: &A,
    station_id: i32,
    element: DailyElement,
    begin: NaiveDate,
    end: NaiveDate,
) -> Amount {
    match archive.sum_daily(station_id, element, begin, end) {
        Lookup::Found(total) => total,
        Lookup::NotFound => Amount::Missing,
        Lookup::Failed(err) => {
            warn!("sum of {} from {} to {}: {}", element.as_ref(), begin, end, err);
            Amount::Missing
        }
    }
}
