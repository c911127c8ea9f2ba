/*!
 * Entry point of a report run.
 *
 * A run resolves the stations and dates, then builds a daily or period record for every station.
 * A station that cannot be processed is logged and left out of the report, only failing to load
 * the station list stops the whole run.
 */

use crate::{
    climate_time::ymd,
    config::ClimateGlobal,
    daily::{build_daily_record, DailyClimateRecord, DailyOptions},
    period::PeriodType,
    period_climate::{build_period_record, PeriodClimateRecord},
    query::{ClimateSources, StationDirectory, SunCalculator},
    station::Station,
    window::{automatic_period_dates, infer_valid_date, requested_or_inferred, resolve_window},
    ClimoResult,
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use log::{error, info, warn};
use rustc_hash::FxHashMap as HashMap;
use std::fmt::{self, Display};

/// How a run chooses the dates it reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Unattended, the dates come from the execution time.
    Automatic,
    /// Started by hand for the most recent report, the dates come from the execution time.
    ManualMostRecent,
    /// Started by hand for chosen dates. Daily runs use `begin`.
    ManualExplicit { begin: NaiveDate, end: NaiveDate },
    /// Started by hand for one day as typed. A day that does not exist falls back to the
    /// execution time.
    ManualDay { year: i32, month: u32, day: u32 },
}

impl RunMode {
    fn is_manual_date(&self) -> bool {
        matches!(self, RunMode::ManualExplicit { .. } | RunMode::ManualDay { .. })
    }
}

impl Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RunMode::Automatic => write!(f, "automatic"),
            RunMode::ManualMostRecent => write!(f, "manual, most recent"),
            RunMode::ManualExplicit { begin, end } => write!(f, "manual, {} to {}", begin, end),
            RunMode::ManualDay { year, month, day } => {
                write!(f, "manual, {:04}-{:02}-{:02}", year, month, day)
            }
        }
    }
}

/// The records of one run, keyed by station id.
#[derive(Debug, Clone)]
pub struct ClimateReport {
    pub period_type: PeriodType,
    pub begin: NaiveDate,
    pub end: NaiveDate,
    pub daily: HashMap<i32, DailyClimateRecord>,
    pub period: HashMap<i32, PeriodClimateRecord>,
}

impl ClimateReport {
    fn new(period_type: PeriodType, begin: NaiveDate, end: NaiveDate) -> Self {
        ClimateReport {
            period_type,
            begin,
            end,
            daily: HashMap::default(),
            period: HashMap::default(),
        }
    }

    /// Number of stations with a record.
    pub fn len(&self) -> usize {
        self.daily.len() + self.period.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Runs reports against one set of data sources.
pub struct Orchestrator<'a, S> {
    sources: &'a S,
    sun: &'a dyn SunCalculator,
    globals: &'a ClimateGlobal,
}

impl<'a, S: ClimateSources + StationDirectory> Orchestrator<'a, S> {
    pub fn new(sources: &'a S, sun: &'a dyn SunCalculator, globals: &'a ClimateGlobal) -> Self {
        Orchestrator {
            sources,
            sun,
            globals,
        }
    }

    /**
     * Build a report for every configured station.
     *
     * #Arguments
     * * period_type - the report to build.
     * * mode - how the dates are chosen.
     * * now_utc - the execution time, used to infer dates.
     *
     * #Returns
     * An error if the station list or the report dates could not be determined.
     */
    pub fn run(
        &self,
        period_type: PeriodType,
        mode: RunMode,
        now_utc: NaiveDateTime,
    ) -> ClimoResult<ClimateReport> {
        let stations = self.sources.stations()?;
        if stations.is_empty() {
            return Err("no climate stations configured".into());
        }

        info!(
            "Running {} ({}) for {} stations",
            period_type,
            mode,
            stations.len()
        );

        if period_type.is_daily() {
            self.run_daily(period_type, mode, now_utc, &stations)
        } else {
            self.run_period(period_type, mode, now_utc, &stations)
        }
    }

    fn run_daily(
        &self,
        period_type: PeriodType,
        mode: RunMode,
        now_utc: NaiveDateTime,
        stations: &[Station],
    ) -> ClimoResult<ClimateReport> {
        let cadence = period_type.cadence();
        let offsets: Vec<i32> = stations.iter().map(|s| s.utc_offset).collect();

        let date = match mode {
            RunMode::Automatic | RunMode::ManualMostRecent => {
                infer_valid_date(cadence, now_utc, &offsets)?
            }
            RunMode::ManualExplicit { begin, .. } => begin,
            RunMode::ManualDay { year, month, day } => {
                requested_or_inferred(Some((year, month, day)), cadence, now_utc, &offsets)?
            }
        };

        let local_now = local_reference(now_utc, &offsets);
        let valid_hour = self.globals.valid_hour(cadence, local_now.time());

        let options = DailyOptions {
            overlay_stored: mode.is_manual_date(),
        };

        info!("Daily report valid for {}", date);

        let mut report = ClimateReport::new(period_type, date, date);
        for station in stations {
            let record = resolve_window(period_type, date, station.utc_offset, valid_hour)
                .and_then(|window| {
                    build_daily_record(self.sources, self.sun, station, &window, options)
                });

            match record {
                Ok(record) => {
                    report.daily.insert(station.id, record);
                }
                Err(err) => error!("Skipping {} on {}: {}", station.icao, date, err),
            }
        }

        Ok(report)
    }

    fn run_period(
        &self,
        period_type: PeriodType,
        mode: RunMode,
        now_utc: NaiveDateTime,
        stations: &[Station],
    ) -> ClimoResult<ClimateReport> {
        let automatic = || {
            let offsets: Vec<i32> = stations.iter().map(|s| s.utc_offset).collect();
            automatic_period_dates(period_type, local_reference(now_utc, &offsets).date())
        };

        let (begin, end) = match mode {
            RunMode::Automatic | RunMode::ManualMostRecent => automatic()?,
            RunMode::ManualExplicit { begin, end } => (begin, end),
            RunMode::ManualDay { year, month, day } => match ymd(year, month, day) {
                Some(date) => (date, date),
                None => {
                    warn!(
                        "Requested date {:04}-{:02}-{:02} is not valid, inferring the dates.",
                        year, month, day
                    );
                    automatic()?
                }
            },
        };

        info!("Period report from {} to {}", begin, end);

        let mut report = ClimateReport::new(period_type, begin, end);
        for station in stations {
            match build_period_record(
                self.sources,
                station,
                period_type,
                begin,
                end,
                &self.globals.thresholds,
            ) {
                Ok(record) => {
                    report.period.insert(station.id, record);
                }
                Err(err) => error!("Skipping {} for {} to {}: {}", station.icao, begin, end, err),
            }
        }

        Ok(report)
    }
}

/// Local time at the station that is last to reach midnight.
fn local_reference(now_utc: NaiveDateTime, offsets: &[i32]) -> NaiveDateTime {
    let min_offset = offsets.iter().copied().min().unwrap_or(0);
    now_utc + Duration::hours(i64::from(min_offset))
}
