/*!
 * Monthly, seasonal, annual, and user defined period summaries.
 *
 * Period records are built from the archive of daily records rather than from raw observations.
 */

use crate::{
    config::Thresholds,
    extract::resultant_wind,
    history::last_year_range,
    period::PeriodType,
    query::{ClimateSources, DailyNormals, FreezeNormals, Lookup, StoredDay, Wind},
    station::Station,
    value::Amount,
    ClimoResult,
};
use chrono::NaiveDate;
use log::{info, warn};

/// Fixed "number of days with" thresholds, °F.
const HOT_DAY: i32 = 90;
const FREEZING: i32 = 32;
const ZERO: i32 = 0;

/// Fixed "number of days with" precipitation thresholds, inches.
const PRECIP_LEVELS: [f64; 4] = [0.01, 0.10, 0.50, 1.00];

/// Climate summary of one station over a range of days.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodClimateRecord {
    pub station_id: i32,
    pub period_type: PeriodType,
    pub begin: NaiveDate,
    pub end: NaiveDate,
    pub summary: PeriodSummary,
    pub normals: PeriodNormals,
    pub freeze: FreezeDates,
    /// The same summary for the same range last year, if anything was archived.
    pub last_year: Option<PeriodSummary>,
}

/// Aggregates of the archived daily records in a range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodSummary {
    /// Number of archived days the summary was built from.
    pub days: usize,

    pub max_temp: Option<i32>,
    pub max_temp_dates: Vec<NaiveDate>,
    pub min_temp: Option<i32>,
    pub min_temp_dates: Vec<NaiveDate>,
    pub mean_max_temp: Option<f64>,
    pub mean_min_temp: Option<f64>,
    pub mean_temp: Option<f64>,

    pub days_max_ge_90: u32,
    pub days_max_le_32: u32,
    pub days_min_le_32: u32,
    pub days_min_le_0: u32,
    /// Counts for the configured T1 through T6 thresholds, `None` when a threshold is unset.
    pub threshold_temp_days: [Option<u32>; 6],

    pub precip: Amount,
    pub max_24h_precip: Amount,
    pub max_24h_precip_dates: Vec<NaiveDate>,
    /// Days with at least 0.01, 0.10, 0.50, and 1.00 inches.
    pub precip_days: [u32; 4],
    /// Counts for the configured P1 and P2 thresholds.
    pub threshold_precip_days: [Option<u32>; 2],

    pub snowfall: Amount,
    /// Count for the configured S1 threshold.
    pub threshold_snow_days: Option<u32>,
    pub max_snow_depth: Amount,

    pub heating_degree_days: Option<i32>,
    pub cooling_degree_days: Option<i32>,

    pub resultant_wind: Option<Wind>,
    pub avg_wind_speed: Option<f64>,
    pub max_wind: Option<Wind>,
    pub max_wind_date: Option<NaiveDate>,
    pub max_gust: Option<Wind>,
    pub max_gust_date: Option<NaiveDate>,

    pub mean_sky_cover: Option<f64>,
    pub mean_percent_sun: Option<i32>,
}

/// Normals summed or averaged over a range of days.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PeriodNormals {
    pub mean_max_temp: Option<f64>,
    pub mean_min_temp: Option<f64>,
    pub mean_temp: Option<f64>,
    pub precip: Amount,
    pub snowfall: Amount,
    pub heating_degree_days: Option<i32>,
    pub cooling_degree_days: Option<i32>,
}

/// Observed and normal freeze dates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FreezeDates {
    /// First freeze in autumn.
    pub early_observed: Option<NaiveDate>,
    /// Last freeze in spring.
    pub late_observed: Option<NaiveDate>,
    pub normals: FreezeNormals,
}

impl PeriodSummary {
    /**
     * Aggregate a set of archived days.
     *
     * Days missing a quantity are left out of that quantity's aggregates and counts.
     */
    pub fn from_days(days: &[StoredDay], thresholds: &Thresholds) -> Self {
        let mut summary = PeriodSummary {
            days: days.len(),
            ..PeriodSummary::default()
        };

        summary.add_temperatures(days, thresholds);
        summary.add_precip(days, thresholds);
        summary.add_snow(days, thresholds);
        summary.add_degree_days(days);
        summary.add_wind(days);

        summary.mean_sky_cover = mean(days.iter().filter_map(|d| d.sky_cover));
        summary.mean_percent_sun = mean(days.iter().filter_map(|d| d.percent_sun.map(f64::from)))
            .map(|pct| pct.round() as i32);

        summary
    }

    fn add_temperatures(&mut self, days: &[StoredDay], thresholds: &Thresholds) {
        let (max, max_dates) = extreme_with_dates(days, |d| d.max_temp, |a, b| a > b);
        let (min, min_dates) = extreme_with_dates(days, |d| d.min_temp, |a, b| a < b);
        self.max_temp = max;
        self.max_temp_dates = max_dates;
        self.min_temp = min;
        self.min_temp_dates = min_dates;

        self.mean_max_temp = mean(days.iter().filter_map(|d| d.max_temp.map(f64::from)));
        self.mean_min_temp = mean(days.iter().filter_map(|d| d.min_temp.map(f64::from)));
        self.mean_temp = match (self.mean_max_temp, self.mean_min_temp) {
            (Some(hi), Some(lo)) => Some((hi + lo) / 2.0),
            _ => None,
        };

        let count_max = |pred: &dyn Fn(i32) -> bool| count(days.iter().filter_map(|d| d.max_temp), pred);
        let count_min = |pred: &dyn Fn(i32) -> bool| count(days.iter().filter_map(|d| d.min_temp), pred);

        self.days_max_ge_90 = count_max(&|t| t >= HOT_DAY);
        self.days_max_le_32 = count_max(&|t| t <= FREEZING);
        self.days_min_le_32 = count_min(&|t| t <= FREEZING);
        self.days_min_le_0 = count_min(&|t| t <= ZERO);

        self.threshold_temp_days = [
            thresholds.t1.map(|t1| count_max(&|t| t >= t1)),
            thresholds.t2.map(|t2| count_max(&|t| t >= t2)),
            thresholds.t3.map(|t3| count_max(&|t| t <= t3)),
            thresholds.t4.map(|t4| count_min(&|t| t >= t4)),
            thresholds.t5.map(|t5| count_min(&|t| t <= t5)),
            thresholds.t6.map(|t6| count_min(&|t| t <= t6)),
        ];
    }

    fn add_precip(&mut self, days: &[StoredDay], thresholds: &Thresholds) {
        self.precip = total(days.iter().map(|d| d.precip));

        for day in days {
            if day.precip.is_missing() {
                continue;
            }
            if day.precip.max(self.max_24h_precip) != self.max_24h_precip {
                self.max_24h_precip = day.precip;
                self.max_24h_precip_dates = vec![day.date];
            } else if day.precip == self.max_24h_precip {
                self.max_24h_precip_dates.push(day.date);
            }
        }

        let amounts: Vec<f64> = days.iter().filter_map(|d| d.precip.value()).collect();
        let at_least = |level: f64| amounts.iter().filter(|v| **v >= level).count() as u32;

        for (count, level) in self.precip_days.iter_mut().zip(PRECIP_LEVELS.iter()) {
            *count = at_least(*level);
        }
        self.threshold_precip_days = [thresholds.p1.map(at_least), thresholds.p2.map(at_least)];
    }

    fn add_snow(&mut self, days: &[StoredDay], thresholds: &Thresholds) {
        self.snowfall = total(days.iter().map(|d| d.snowfall));
        self.max_snow_depth = days
            .iter()
            .map(|d| d.snow_depth)
            .fold(Amount::Missing, Amount::max);

        self.threshold_snow_days = thresholds.s1.map(|s1| {
            days.iter()
                .filter_map(|d| d.snowfall.value())
                .filter(|v| *v >= s1)
                .count() as u32
        });
    }

    fn add_degree_days(&mut self, days: &[StoredDay]) {
        self.heating_degree_days = sum_present(days.iter().filter_map(|d| d.heating_degree_days));
        self.cooling_degree_days = sum_present(days.iter().filter_map(|d| d.cooling_degree_days));
    }

    fn add_wind(&mut self, days: &[StoredDay]) {
        let resultants: Vec<Wind> = days.iter().filter_map(|d| d.resultant_wind).collect();
        self.resultant_wind = resultant_wind(&resultants);
        self.avg_wind_speed = mean(days.iter().filter_map(|d| d.avg_wind_speed));

        let strongest = |wind: &dyn Fn(&StoredDay) -> Option<Wind>| {
            days.iter()
                .filter_map(|d| wind(d).map(|w| (w, d.date)))
                .fold(None, |best: Option<(Wind, NaiveDate)>, (w, date)| match best {
                    Some((b, _)) if b.speed >= w.speed => best,
                    _ => Some((w, date)),
                })
        };

        if let Some((wind, date)) = strongest(&|d: &StoredDay| d.max_wind) {
            self.max_wind = Some(wind);
            self.max_wind_date = Some(date);
        }
        if let Some((gust, date)) = strongest(&|d: &StoredDay| d.max_gust) {
            self.max_gust = Some(gust);
            self.max_gust_date = Some(date);
        }
    }
}

impl PeriodNormals {
    /// Combine the daily normals of every day in a range.
    pub fn from_daily(normals: &[DailyNormals]) -> Self {
        let mean_max_temp = mean(normals.iter().filter_map(|n| n.max_temp_mean));
        let mean_min_temp = mean(normals.iter().filter_map(|n| n.min_temp_mean));
        let mean_temp = match (mean_max_temp, mean_min_temp) {
            (Some(hi), Some(lo)) => Some((hi + lo) / 2.0),
            _ => None,
        };

        PeriodNormals {
            mean_max_temp,
            mean_min_temp,
            mean_temp,
            precip: total(normals.iter().map(|n| n.precip_mean)),
            snowfall: total(normals.iter().map(|n| n.snowfall_mean)),
            heating_degree_days: sum_present(
                normals.iter().filter_map(|n| n.heating_degree_days_mean),
            ),
            cooling_degree_days: sum_present(
                normals.iter().filter_map(|n| n.cooling_degree_days_mean),
            ),
        }
    }
}

/**
 * Build the period climate record of a station.
 *
 * #Arguments
 * * sources - the daily record archive and normals.
 * * station - the station.
 * * period_type - the report being built. Observed freeze dates are only looked up for the
 *   user defined period type.
 * * begin, end - the inclusive range of days.
 * * thresholds - user defined "number of days with" thresholds.
 */
pub fn build_period_record<S: ClimateSources>(
    sources: &S,
    station: &Station,
    period_type: PeriodType,
    begin: NaiveDate,
    end: NaiveDate,
    thresholds: &Thresholds,
) -> ClimoResult<PeriodClimateRecord> {
    if end < begin {
        return Err(format!("period ends ({}) before it begins ({})", end, begin).into());
    }

    let days = stored_days(sources, station, begin, end);
    if days.is_empty() {
        info!(
            "No archived days for {} from {} to {}",
            station.icao, begin, end
        );
    }
    let summary = PeriodSummary::from_days(&days, thresholds);

    let normals = sources
        .daily_normals_range(station.id, begin, end)
        .or_warn("period normals")
        .map(|daily| PeriodNormals::from_daily(&daily))
        .unwrap_or_default();

    let freeze = freeze_dates(sources, station.id, period_type, begin, end);

    let (ly_begin, ly_end) = last_year_range(begin, end);
    let ly_days = stored_days(sources, station, ly_begin, ly_end);
    let last_year = if ly_days.is_empty() {
        None
    } else {
        Some(PeriodSummary::from_days(&ly_days, thresholds))
    };

    Ok(PeriodClimateRecord {
        station_id: station.id,
        period_type,
        begin,
        end,
        summary,
        normals,
        freeze,
        last_year,
    })
}

fn stored_days<S: ClimateSources>(
    sources: &S,
    station: &Station,
    begin: NaiveDate,
    end: NaiveDate,
) -> Vec<StoredDay> {
    match sources.daily_records(station.id, begin, end) {
        Lookup::Found(days) => days,
        Lookup::NotFound => vec![],
        Lookup::Failed(err) => {
            warn!("archived days for {}: {}", station.icao, err);
            vec![]
        }
    }
}

fn freeze_dates<S: ClimateSources>(
    sources: &S,
    station_id: i32,
    period_type: PeriodType,
    begin: NaiveDate,
    end: NaiveDate,
) -> FreezeDates {
    let normals = sources
        .freeze_normals(station_id)
        .or_warn("freeze normals")
        .unwrap_or_default();

    let mut freeze = FreezeDates {
        normals,
        ..FreezeDates::default()
    };

    if period_type == PeriodType::Other {
        freeze.early_observed = sources
            .early_freeze(station_id, begin, end)
            .or_warn("early freeze");

        if freeze.early_observed.is_some() {
            freeze.late_observed = sources
                .late_freeze(station_id, begin, end)
                .or_warn("late freeze");
        }
    }

    freeze
}

fn total<I: Iterator<Item = Amount>>(amounts: I) -> Amount {
    amounts.fold(Amount::Missing, |acc, amount| {
        if acc.is_missing() && amount.is_missing() {
            Amount::Missing
        } else {
            acc.tally(amount)
        }
    })
}

/// Sum of the values, `None` when there are none.
fn sum_present<I: Iterator<Item = i32>>(vals: I) -> Option<i32> {
    vals.fold(None, |acc, v| Some(acc.unwrap_or(0) + v))
}

fn mean<I: Iterator<Item = f64>>(vals: I) -> Option<f64> {
    let (sum, n) = vals.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n > 0 {
        Some(sum / n as f64)
    } else {
        None
    }
}

fn count<I: Iterator<Item = i32>>(vals: I, pred: &dyn Fn(i32) -> bool) -> u32 {
    vals.filter(|v| pred(*v)).count() as u32
}

/// The extreme of a daily value and every date it occurred on.
fn extreme_with_dates<F, C>(days: &[StoredDay], value: F, more_extreme: C) -> (Option<i32>, Vec<NaiveDate>)
where
    F: Fn(&StoredDay) -> Option<i32>,
    C: Fn(i32, i32) -> bool,
{
    let mut best: Option<i32> = None;
    let mut dates = vec![];

    for day in days {
        let val = match value(day) {
            Some(v) => v,
            None => continue,
        };

        match best {
            Some(b) if val == b => dates.push(day.date),
            Some(b) if !more_extreme(val, b) => {}
            _ => {
                best = Some(val);
                dates = vec![day.date];
            }
        }
    }

    (best, dates)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mock::{flat_normals, station, MockSources};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn day(d: u32, max: i32, min: i32, precip: Amount) -> StoredDay {
        StoredDay {
            max_temp: Some(max),
            min_temp: Some(min),
            precip,
            snowfall: Amount::Value(0.0),
            heating_degree_days: Some((65 - (max + min) / 2).max(0)),
            cooling_degree_days: Some(((max + min) / 2 - 65).max(0)),
            ..StoredDay::empty(date(2024, 1, d))
        }
    }

    fn january() -> Vec<StoredDay> {
        vec![
            day(1, 40, 20, Amount::Value(0.25)),
            day(2, 45, 31, Amount::Trace),
            day(3, 45, -2, Amount::Value(1.10)),
            day(4, 30, 10, Amount::Missing),
        ]
    }

    #[test]
    fn test_temperature_aggregates() {
        let thresholds = Thresholds {
            t1: Some(45),
            t5: Some(10),
            ..Thresholds::default()
        };
        let s = PeriodSummary::from_days(&january(), &thresholds);

        assert_eq!(s.days, 4);
        assert_eq!(s.max_temp, Some(45));
        assert_eq!(s.max_temp_dates, vec![date(2024, 1, 2), date(2024, 1, 3)]);
        assert_eq!(s.min_temp, Some(-2));
        assert_eq!(s.min_temp_dates, vec![date(2024, 1, 3)]);
        assert_eq!(s.mean_max_temp, Some(40.0));
        assert_eq!(s.days_max_le_32, 1);
        assert_eq!(s.days_min_le_32, 4);
        assert_eq!(s.days_min_le_0, 1);
        assert_eq!(s.days_max_ge_90, 0);
        assert_eq!(
            s.threshold_temp_days,
            [Some(2), None, None, None, Some(2), None]
        );
    }

    #[test]
    fn test_precip_aggregates() {
        let thresholds = Thresholds {
            p1: Some(1.0),
            ..Thresholds::default()
        };
        let s = PeriodSummary::from_days(&january(), &thresholds);

        let total = s.precip.value().unwrap();
        assert!((total - 1.35).abs() < 1.0e-9);
        assert_eq!(s.max_24h_precip, Amount::Value(1.10));
        assert_eq!(s.max_24h_precip_dates, vec![date(2024, 1, 3)]);
        assert_eq!(s.precip_days, [2, 2, 1, 1]);
        assert_eq!(s.threshold_precip_days, [Some(1), None]);
        assert_eq!(s.threshold_snow_days, None);
        assert_eq!(s.snowfall, Amount::Value(0.0));
    }

    #[test]
    fn test_empty_period() {
        let s = PeriodSummary::from_days(&[], &Thresholds::default());
        assert_eq!(s.days, 0);
        assert_eq!(s.max_temp, None);
        assert_eq!(s.precip, Amount::Missing);
        assert_eq!(s.heating_degree_days, None);
        assert_eq!(s.resultant_wind, None);
    }

    #[test]
    fn test_period_record_with_freeze_dates() {
        let mut mock = MockSources::default();
        mock.days = january();
        mock.days.push(StoredDay {
            min_temp: Some(25),
            ..StoredDay::empty(date(2023, 1, 2))
        });
        for d in 1..=31 {
            mock.normals.push(flat_normals(1, d));
        }
        mock.freeze = Some(FreezeNormals {
            early_normal: Some(date(2023, 10, 12)),
            ..FreezeNormals::default()
        });

        let stn = station(-7);
        let thresholds = Thresholds::default();
        let (begin, end) = (date(2024, 1, 1), date(2024, 1, 31));

        let rec =
            build_period_record(&mock, &stn, PeriodType::MonthlyNwws, begin, end, &thresholds)
                .unwrap();
        assert_eq!(rec.freeze.early_observed, None);
        assert_eq!(rec.freeze.normals.early_normal, Some(date(2023, 10, 12)));
        assert_eq!(rec.normals.heating_degree_days, Some(25 * 31));
        assert_eq!(rec.normals.mean_temp, Some(40.0));
        assert_eq!(rec.last_year.as_ref().map(|s| s.days), Some(1));

        let rec =
            build_period_record(&mock, &stn, PeriodType::Other, begin, end, &thresholds).unwrap();
        assert_eq!(rec.freeze.early_observed, Some(date(2024, 1, 1)));
        assert_eq!(rec.freeze.late_observed, Some(date(2024, 1, 4)));

        assert!(
            build_period_record(&mock, &stn, PeriodType::Other, end, begin, &thresholds).is_err()
        );
    }
}
