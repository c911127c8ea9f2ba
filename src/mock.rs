//! In memory data sources for unit tests.

use crate::{
    climate_time::date_range,
    error::QueryError,
    query::{
        sum_days, ClimateArchive, DailyElement, DailyNormals, DailySummary, Element, Extreme,
        FreezeNormals, Lookup, NormalsQuery, ObservationQuery, ReportSource, StationDirectory,
        StoredDay, SunCalculator, TempReading, WeatherGroup, WindReport,
    },
    station::Station,
    value::Amount,
    ClimoResult,
};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use rustc_hash::FxHashMap as HashMap;
use std::cell::{Cell, RefCell};

#[derive(Default)]
pub struct MockSources {
    pub stations: Vec<Station>,
    pub summaries: HashMap<NaiveDate, DailySummary>,
    pub values: HashMap<(Element, NaiveDateTime), f64>,
    pub temps: Vec<(ReportSource, TempReading)>,
    pub scd: Vec<(NaiveDateTime, f64)>,
    pub corrections: HashMap<NaiveDateTime, Option<String>>,
    pub winds: HashMap<NaiveDateTime, WindReport>,
    pub gusts: HashMap<NaiveDateTime, WindReport>,
    pub peaks: HashMap<NaiveDateTime, WindReport>,
    pub speci_winds: Vec<WindReport>,
    pub speci_gusts: Vec<WindReport>,
    pub weather: HashMap<NaiveDateTime, Vec<WeatherGroup>>,
    pub days: Vec<StoredDay>,
    pub normals: Vec<DailyNormals>,
    pub freeze: Option<FreezeNormals>,

    /// Every lookup fails as if the storage were unreachable.
    pub failing: bool,
    /// Station directory is unreadable.
    pub no_stations: bool,

    pub summary_calls: Cell<usize>,
    pub observation_calls: Cell<usize>,
    pub element_calls: RefCell<Vec<(Element, NaiveDateTime)>>,
}

impl MockSources {
    fn count(&self) {
        self.observation_calls.set(self.observation_calls.get() + 1);
    }

    fn lookup<T>(&self, val: Option<T>) -> Lookup<T> {
        if self.failing {
            return Lookup::Failed(QueryError::new("mock failure"));
        }
        match val {
            Some(v) => Lookup::Found(v),
            None => Lookup::NotFound,
        }
    }

    pub fn set(&mut self, element: Element, at: NaiveDateTime, val: f64) {
        self.values.insert((element, at), val);
    }

    pub fn calls_for(&self, element: Element) -> usize {
        self.element_calls
            .borrow()
            .iter()
            .filter(|(e, _)| *e == element)
            .count()
    }
}

pub fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

pub fn station(utc_offset: i32) -> Station {
    Station {
        id: 7,
        icao: "KXYZ".to_owned(),
        name: "Testville".to_owned(),
        lat: 40.0,
        lon: -75.0,
        utc_offset,
        std_all_year: false,
    }
}

impl StationDirectory for MockSources {
    fn stations(&self) -> ClimoResult<Vec<Station>> {
        if self.no_stations {
            return Err("station directory unavailable".into());
        }
        Ok(self.stations.clone())
    }
}

impl ObservationQuery for MockSources {
    fn daily_summary(&self, _: i32, date: NaiveDate, _: u32) -> Lookup<DailySummary> {
        self.summary_calls.set(self.summary_calls.get() + 1);
        self.lookup(self.summaries.get(&date).cloned())
    }

    fn report_value(&self, _: i32, element: Element, nominal: NaiveDateTime) -> Lookup<f64> {
        self.count();
        self.element_calls.borrow_mut().push((element, nominal));
        self.lookup(self.values.get(&(element, nominal)).copied())
    }

    fn period_extreme(
        &self,
        _: i32,
        source: ReportSource,
        extreme: Extreme,
        begin: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Lookup<TempReading> {
        self.count();
        let candidates = self
            .temps
            .iter()
            .filter(|(src, r)| *src == source && r.at >= begin && r.at <= end)
            .map(|(_, r)| *r);

        let best = candidates.fold(None, |best: Option<TempReading>, r| match best {
            None => Some(r),
            Some(b) => match extreme {
                Extreme::Max if r.celsius > b.celsius => Some(r),
                Extreme::Min if r.celsius < b.celsius => Some(r),
                _ => Some(b),
            },
        });
        self.lookup(best)
    }

    fn scd_snowfall(&self, _: i32, begin: NaiveDateTime, end: NaiveDateTime) -> Lookup<f64> {
        self.count();
        let mut found = None;
        for (at, val) in &self.scd {
            if *at >= begin && *at <= end {
                found = Some(found.unwrap_or(0.0) + val);
            }
        }
        self.lookup(found)
    }

    fn report_correction(&self, _: i32, nominal: NaiveDateTime) -> Lookup<Option<String>> {
        self.count();
        self.lookup(self.corrections.get(&nominal).cloned())
    }

    fn hourly_wind(&self, _: i32, nominal: NaiveDateTime) -> Lookup<WindReport> {
        self.count();
        self.lookup(self.winds.get(&nominal).copied())
    }

    fn hourly_gust(&self, _: i32, nominal: NaiveDateTime) -> Lookup<WindReport> {
        self.count();
        self.lookup(self.gusts.get(&nominal).copied())
    }

    fn peak_wind(&self, _: i32, nominal: NaiveDateTime) -> Lookup<WindReport> {
        self.count();
        self.lookup(self.peaks.get(&nominal).copied())
    }

    fn speci_max_wind(
        &self,
        _: i32,
        begin: NaiveDateTime,
        end: NaiveDateTime,
        gust: bool,
    ) -> Lookup<WindReport> {
        self.count();
        let list = if gust {
            &self.speci_gusts
        } else {
            &self.speci_winds
        };
        let best = list
            .iter()
            .filter(|w| w.at >= begin && w.at <= end)
            .fold(None, |best: Option<WindReport>, w| match best {
                Some(b) if b.wind.speed >= w.wind.speed => Some(b),
                _ => Some(*w),
            });
        self.lookup(best)
    }

    fn weather(&self, _: i32, nominal: NaiveDateTime) -> Lookup<Vec<WeatherGroup>> {
        self.count();
        self.lookup(self.weather.get(&nominal).cloned())
    }
}

impl ClimateArchive for MockSources {
    fn sum_daily(
        &self,
        _: i32,
        element: DailyElement,
        begin: NaiveDate,
        end: NaiveDate,
    ) -> Lookup<Amount> {
        let in_range = self.days.iter().filter(|d| d.date >= begin && d.date <= end);
        self.lookup(sum_days(in_range, element))
    }

    fn daily_record(&self, _: i32, date: NaiveDate) -> Lookup<StoredDay> {
        self.lookup(self.days.iter().find(|d| d.date == date).cloned())
    }

    fn daily_records(&self, _: i32, begin: NaiveDate, end: NaiveDate) -> Lookup<Vec<StoredDay>> {
        let days: Vec<_> = self
            .days
            .iter()
            .filter(|d| d.date >= begin && d.date <= end)
            .cloned()
            .collect();
        self.lookup(if days.is_empty() { None } else { Some(days) })
    }

    fn early_freeze(&self, _: i32, begin: NaiveDate, end: NaiveDate) -> Lookup<NaiveDate> {
        self.lookup(
            self.days
                .iter()
                .filter(|d| d.date >= begin && d.date <= end)
                .filter(|d| matches!(d.min_temp, Some(t) if t <= 32))
                .map(|d| d.date)
                .min(),
        )
    }

    fn late_freeze(&self, _: i32, begin: NaiveDate, end: NaiveDate) -> Lookup<NaiveDate> {
        self.lookup(
            self.days
                .iter()
                .filter(|d| d.date >= begin && d.date <= end)
                .filter(|d| matches!(d.min_temp, Some(t) if t <= 32))
                .map(|d| d.date)
                .max(),
        )
    }
}

impl NormalsQuery for MockSources {
    fn daily_normals(&self, _: i32, month: u32, day: u32) -> Lookup<DailyNormals> {
        self.lookup(
            self.normals
                .iter()
                .find(|n| n.month == month && n.day == day)
                .cloned(),
        )
    }

    fn daily_normals_range(
        &self,
        _: i32,
        begin: NaiveDate,
        end: NaiveDate,
    ) -> Lookup<Vec<DailyNormals>> {
        let found: Vec<_> = date_range(begin, end)
            .filter_map(|d| {
                self.normals
                    .iter()
                    .find(|n| n.month == d.month() && n.day == d.day())
                    .cloned()
            })
            .collect();
        self.lookup(if found.is_empty() { None } else { Some(found) })
    }

    fn freeze_normals(&self, _: i32) -> Lookup<FreezeNormals> {
        self.lookup(self.freeze)
    }
}

/// Sun always rises at 06:00 and sets at 18:00.
pub struct FixedSun;

impl SunCalculator for FixedSun {
    fn rise_set(&self, _: NaiveDate, _: f64, _: f64, _: i32) -> Option<(NaiveTime, NaiveTime)> {
        Some((
            NaiveTime::from_hms_opt(6, 0, 0)?,
            NaiveTime::from_hms_opt(18, 0, 0)?,
        ))
    }
}

/// Flat normals for every day, useful where only presence matters.
pub fn flat_normals(month: u32, day: u32) -> DailyNormals {
    DailyNormals {
        month,
        day,
        max_temp_mean: Some(50.0),
        max_temp_record: Some(70),
        min_temp_mean: Some(30.0),
        min_temp_record: Some(-10),
        precip_mean: Amount::Value(0.1),
        precip_record: Amount::Value(1.5),
        snowfall_mean: Amount::Value(0.2),
        snowfall_record: Amount::Value(8.0),
        snow_depth_mean: Amount::Trace,
        heating_degree_days_mean: Some(25),
        cooling_degree_days_mean: Some(0),
    }
}
