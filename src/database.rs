/*!
 * A `SQLite` store implementing every query the pipeline makes.
 *
 * Times are stored as unix timestamps (UTC), dates and times of day as ISO 8601 text. Amounts are
 * stored in inches with NULL for missing and a negative number for a trace.
 *
 * When several transmissions of the same report exist, corrections win over originals and newer
 * transmissions win over older ones.
 */

use crate::{
    climate_time::date_range,
    query::{
        sum_days, ClimateArchive, DailyElement, DailyNormals, DailySummary, Element, Extreme,
        FreezeNormals, Lookup, NormalsQuery, ObservationQuery, ReportSource, StationDirectory,
        StoredDay, TempReading, WeatherGroup, Wind, WindReport,
    },
    station::Station,
    value::Amount,
    ClimoResult,
};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use log::debug;
use rusqlite::{Connection, OpenFlags, OptionalExtension, Params, Row, ToSql};
use rustc_hash::FxHashMap as HashMap;
use std::path::Path;
use strum::AsRefStr;

/// Value stored for a trace amount.
const TRACE_CODE: f64 = -1.0;

/// The kind of wind a report row describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum WindKind {
    /// Sustained wind.
    Wind,
    Gust,
    /// Peak wind remark.
    Peak,
}

/// A report row to add to the archive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportRow<'a> {
    pub source: ReportSource,
    /// The nominal hour of a routine report.
    pub nominal: NaiveDateTime,
    /// When the observation was taken.
    pub observed: NaiveDateTime,
    /// Correction indicator, e.g. "A" for an automated correction.
    pub correction: Option<&'a str>,
    /// When the report was transmitted.
    pub origin: NaiveDateTime,
}

/// Connection to the climate database.
pub struct ClimateDatabase {
    conn: Connection,
}

impl ClimateDatabase {
    /// Open a connection to the database, creating it and its tables if needed.
    pub fn connect<P: AsRef<Path>>(path: P) -> ClimoResult<Self> {
        let conn = Connection::open_with_flags(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        Self::initialize(conn)
    }

    /// A database that lives only as long as the connection.
    pub fn in_memory() -> ClimoResult<Self> {
        Self::initialize(Connection::open_in_memory()?)
    }

    fn initialize(conn: Connection) -> ClimoResult<Self> {
        // Another process loading observations holds the lock for a short time only.
        conn.busy_timeout(std::time::Duration::from_secs(5))?;

        const QUERY: &str = include_str!("database/create_climo_db.sql");
        conn.execute_batch(QUERY)?;

        Ok(ClimateDatabase { conn })
    }

    /*---------------------------------------------------------------------------------------------
     *                                   Loading data
     *-------------------------------------------------------------------------------------------*/
    pub fn add_station(&self, station: &Station) -> ClimoResult<()> {
        const QUERY: &str = include_str!("database/add_station.sql");

        self.conn.execute(
            QUERY,
            [
                &station.id as &dyn ToSql,
                &station.icao,
                &station.name,
                &station.lat,
                &station.lon,
                &station.utc_offset,
                &station.std_all_year,
            ],
        )?;

        Ok(())
    }

    /// Add a single valued group from a routine or special report.
    pub fn add_report_value(
        &self,
        station_id: i32,
        element: Element,
        report: &ReportRow,
        value: f64,
    ) -> ClimoResult<()> {
        const QUERY: &str = include_str!("database/add_metar_value.sql");

        self.conn.execute(
            QUERY,
            [
                &station_id as &dyn ToSql,
                &element.as_ref(),
                &report.source.as_ref(),
                &report.nominal.and_utc().timestamp(),
                &report.observed.and_utc().timestamp(),
                &value,
                &report.correction,
                &report.origin.and_utc().timestamp(),
            ],
        )?;

        Ok(())
    }

    pub fn add_wind(
        &self,
        station_id: i32,
        kind: WindKind,
        report: &ReportRow,
        wind: Wind,
    ) -> ClimoResult<()> {
        const QUERY: &str = include_str!("database/add_wind.sql");

        self.conn.execute(
            QUERY,
            [
                &station_id as &dyn ToSql,
                &kind.as_ref(),
                &report.source.as_ref(),
                &report.nominal.and_utc().timestamp(),
                &report.observed.and_utc().timestamp(),
                &wind.speed,
                &wind.direction,
                &report.correction,
                &report.origin.and_utc().timestamp(),
            ],
        )?;

        Ok(())
    }

    pub fn add_weather(
        &self,
        station_id: i32,
        report: &ReportRow,
        group: WeatherGroup,
    ) -> ClimoResult<()> {
        const QUERY: &str = include_str!("database/add_weather.sql");

        self.conn.execute(
            QUERY,
            [
                &station_id as &dyn ToSql,
                &report.source.as_ref(),
                &report.nominal.and_utc().timestamp(),
                &group.code,
                &group.visibility_16ths,
            ],
        )?;

        Ok(())
    }

    /// Add a supplemental climatological data snowfall report, inches with negative for trace.
    pub fn add_scd_snow(
        &self,
        station_id: i32,
        observed: NaiveDateTime,
        snowfall: f64,
        origin: NaiveDateTime,
    ) -> ClimoResult<()> {
        const QUERY: &str = include_str!("database/add_scd_snow.sql");

        self.conn.execute(
            QUERY,
            [
                &station_id as &dyn ToSql,
                &observed.and_utc().timestamp(),
                &snowfall,
                &origin.and_utc().timestamp(),
            ],
        )?;

        Ok(())
    }

    pub fn add_daily_summary(
        &self,
        station_id: i32,
        date: NaiveDate,
        valid_hour: u32,
        summary: &DailySummary,
        origin: NaiveDateTime,
    ) -> ClimoResult<()> {
        const QUERY: &str = include_str!("database/add_daily_summary.sql");

        let weather = summary.weather.as_ref().map(|codes| {
            codes
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(",")
        });

        self.conn.execute(
            QUERY,
            [
                &station_id as &dyn ToSql,
                &date,
                &valid_hour,
                &summary.max_temp,
                &summary.max_temp_time,
                &summary.min_temp,
                &summary.min_temp_time,
                &amount_to_sql(summary.precip),
                &amount_to_sql(summary.snowfall),
                &amount_to_sql(summary.snow_depth),
                &summary.avg_wind_speed,
                &summary.max_wind.map(|w| w.speed),
                &summary.max_wind.map(|w| w.direction),
                &summary.max_wind_time,
                &summary.max_gust.map(|w| w.speed),
                &summary.max_gust.map(|w| w.direction),
                &summary.max_gust_time,
                &summary.sunshine_minutes,
                &summary.sunshine_percent,
                &summary.sky_cover,
                &weather,
                &origin.and_utc().timestamp(),
            ],
        )?;

        Ok(())
    }

    pub fn add_daily_normals(&self, station_id: i32, normals: &[DailyNormals]) -> ClimoResult<()> {
        const QUERY: &str = include_str!("database/add_daily_normals.sql");

        self.in_transaction(|conn| {
            let mut stmt = conn.prepare(QUERY)?;
            for n in normals {
                stmt.execute([
                    &station_id as &dyn ToSql,
                    &n.month,
                    &n.day,
                    &n.max_temp_mean,
                    &n.max_temp_record,
                    &n.min_temp_mean,
                    &n.min_temp_record,
                    &amount_to_sql(n.precip_mean),
                    &amount_to_sql(n.precip_record),
                    &amount_to_sql(n.snowfall_mean),
                    &amount_to_sql(n.snowfall_record),
                    &amount_to_sql(n.snow_depth_mean),
                    &n.heating_degree_days_mean,
                    &n.cooling_degree_days_mean,
                ])?;
            }
            Ok(())
        })
    }

    pub fn add_freeze_normals(&self, station_id: i32, freeze: &FreezeNormals) -> ClimoResult<()> {
        const QUERY: &str = include_str!("database/add_freeze_normals.sql");

        self.conn.execute(
            QUERY,
            [
                &station_id as &dyn ToSql,
                &freeze.early_normal,
                &freeze.late_normal,
                &freeze.early_record,
                &freeze.late_record,
            ],
        )?;

        Ok(())
    }

    /// Archive daily records, replacing any already stored for the same dates.
    pub fn store_daily(&self, station_id: i32, days: &[StoredDay]) -> ClimoResult<()> {
        const QUERY: &str = include_str!("database/add_daily_climate.sql");

        self.in_transaction(|conn| {
            let mut stmt = conn.prepare(QUERY)?;
            for day in days {
                stmt.execute([
                    &station_id as &dyn ToSql,
                    &day.date,
                    &day.max_temp,
                    &day.min_temp,
                    &amount_to_sql(day.precip),
                    &amount_to_sql(day.snowfall),
                    &amount_to_sql(day.snow_depth),
                    &day.heating_degree_days,
                    &day.cooling_degree_days,
                    &day.avg_wind_speed,
                    &day.resultant_wind.map(|w| w.speed),
                    &day.resultant_wind.map(|w| w.direction),
                    &day.max_wind.map(|w| w.speed),
                    &day.max_wind.map(|w| w.direction),
                    &day.max_gust.map(|w| w.speed),
                    &day.max_gust.map(|w| w.direction),
                    &day.max_rh,
                    &day.min_rh,
                    &day.sky_cover,
                    &day.percent_sun,
                ])?;
            }
            Ok(())
        })?;

        debug!("Stored {} days for station {}", days.len(), station_id);
        Ok(())
    }

    fn in_transaction<F>(&self, f: F) -> ClimoResult<()>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<()>,
    {
        self.conn.execute("BEGIN TRANSACTION", [])?;

        match f(&self.conn) {
            Ok(()) => {
                self.conn.execute("COMMIT", [])?;
                Ok(())
            }
            Err(err) => {
                self.conn.execute("ROLLBACK", [])?;
                Err(err.into())
            }
        }
    }

    /*---------------------------------------------------------------------------------------------
     *                                   Query helpers
     *-------------------------------------------------------------------------------------------*/
    fn query_one<T, P, F>(&self, query: &str, params: P, f: F) -> Lookup<T>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        let res = self
            .conn
            .prepare(query)
            .and_then(|mut stmt| stmt.query_row(params, f).optional());

        Lookup::from(res)
    }

    fn query_all<T, P, F>(&self, query: &str, params: P, f: F) -> rusqlite::Result<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self.conn.prepare(query)?;
        let rows = stmt.query_map(params, f)?.collect::<Result<Vec<T>, _>>()?;
        Ok(rows)
    }

    fn all_normals(&self, station_id: i32) -> rusqlite::Result<Vec<DailyNormals>> {
        const QUERY: &str = include_str!("database/query_daily_normals.sql");

        self.query_all(QUERY, [station_id], |row| {
            Ok(DailyNormals {
                month: row.get(0)?,
                day: row.get(1)?,
                max_temp_mean: row.get(2)?,
                max_temp_record: row.get(3)?,
                min_temp_mean: row.get(4)?,
                min_temp_record: row.get(5)?,
                precip_mean: amount_from_sql(row.get(6)?),
                precip_record: amount_from_sql(row.get(7)?),
                snowfall_mean: amount_from_sql(row.get(8)?),
                snowfall_record: amount_from_sql(row.get(9)?),
                snow_depth_mean: amount_from_sql(row.get(10)?),
                heating_degree_days_mean: row.get(11)?,
                cooling_degree_days_mean: row.get(12)?,
            })
        })
    }

    fn hourly_wind_kind(
        &self,
        station_id: i32,
        kind: WindKind,
        nominal: NaiveDateTime,
    ) -> Lookup<WindReport> {
        const QUERY: &str = include_str!("database/query_hourly_wind.sql");

        self.query_one(
            QUERY,
            [
                &station_id as &dyn ToSql,
                &kind.as_ref(),
                &nominal.and_utc().timestamp(),
            ],
            wind_report_from_row,
        )
    }

    fn report_exists(&self, station_id: i32, nominal: NaiveDateTime) -> rusqlite::Result<bool> {
        const QUERY: &str = include_str!("database/query_report_exists.sql");

        let count: i64 = self.conn.query_row(
            QUERY,
            [&station_id as &dyn ToSql, &nominal.and_utc().timestamp()],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }
}

/*-------------------------------------------------------------------------------------------------
 *                                  Query implementations
 *-----------------------------------------------------------------------------------------------*/
impl StationDirectory for ClimateDatabase {
    fn stations(&self) -> ClimoResult<Vec<Station>> {
        const QUERY: &str = include_str!("database/query_stations.sql");

        let stations = self.query_all(QUERY, [], |row| {
            Ok(Station {
                id: row.get(0)?,
                icao: row.get(1)?,
                name: row.get(2)?,
                lat: row.get(3)?,
                lon: row.get(4)?,
                utc_offset: row.get(5)?,
                std_all_year: row.get(6)?,
            })
        })?;

        Ok(stations)
    }
}

impl ObservationQuery for ClimateDatabase {
    fn daily_summary(
        &self,
        station_id: i32,
        date: NaiveDate,
        valid_hour: u32,
    ) -> Lookup<DailySummary> {
        const QUERY: &str = include_str!("database/query_daily_summary.sql");

        self.query_one(
            QUERY,
            [&station_id as &dyn ToSql, &date, &valid_hour],
            |row| {
                let weather: Option<String> = row.get(17)?;

                Ok(DailySummary {
                    max_temp: row.get(0)?,
                    max_temp_time: row.get(1)?,
                    min_temp: row.get(2)?,
                    min_temp_time: row.get(3)?,
                    precip: amount_from_sql(row.get(4)?),
                    snowfall: amount_from_sql(row.get(5)?),
                    snow_depth: amount_from_sql(row.get(6)?),
                    avg_wind_speed: row.get(7)?,
                    max_wind: wind_from_sql(row.get(8)?, row.get(9)?),
                    max_wind_time: row.get(10)?,
                    max_gust: wind_from_sql(row.get(11)?, row.get(12)?),
                    max_gust_time: row.get(13)?,
                    sunshine_minutes: row.get(14)?,
                    sunshine_percent: row.get(15)?,
                    sky_cover: row.get(16)?,
                    weather: weather.map(|codes| parse_codes(&codes)),
                })
            },
        )
    }

    fn report_value(&self, station_id: i32, element: Element, nominal: NaiveDateTime) -> Lookup<f64> {
        const QUERY: &str = include_str!("database/query_report_value.sql");

        self.query_one(
            QUERY,
            [
                &station_id as &dyn ToSql,
                &element.as_ref(),
                &nominal.and_utc().timestamp(),
            ],
            |row| row.get(0),
        )
    }

    fn period_extreme(
        &self,
        station_id: i32,
        source: ReportSource,
        extreme: Extreme,
        begin: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Lookup<TempReading> {
        const MAX_QUERY: &str = include_str!("database/query_max_temp.sql");
        const MIN_QUERY: &str = include_str!("database/query_min_temp.sql");

        let query = match extreme {
            Extreme::Max => MAX_QUERY,
            Extreme::Min => MIN_QUERY,
        };

        // Readings in tenths of a degree are preferred over whole degrees.
        for (element, tenths) in [(Element::TempTenths, true), (Element::TempWhole, false)] {
            let found = self.query_one(
                query,
                [
                    &station_id as &dyn ToSql,
                    &source.as_ref(),
                    &element.as_ref(),
                    &begin.and_utc().timestamp(),
                    &end.and_utc().timestamp(),
                ],
                |row| {
                    Ok(TempReading {
                        celsius: row.get(0)?,
                        at: from_timestamp(row.get(1)?)?,
                        tenths,
                    })
                },
            );

            if !matches!(found, Lookup::NotFound) {
                return found;
            }
        }

        Lookup::NotFound
    }

    fn scd_snowfall(&self, station_id: i32, begin: NaiveDateTime, end: NaiveDateTime) -> Lookup<f64> {
        const QUERY: &str = include_str!("database/query_scd_snow.sql");

        self.query_one(
            QUERY,
            [
                &station_id as &dyn ToSql,
                &begin.and_utc().timestamp(),
                &end.and_utc().timestamp(),
            ],
            |row| row.get(0),
        )
    }

    fn report_correction(
        &self,
        station_id: i32,
        nominal: NaiveDateTime,
    ) -> Lookup<Option<String>> {
        const QUERY: &str = include_str!("database/query_correction.sql");

        self.query_one(
            QUERY,
            [&station_id as &dyn ToSql, &nominal.and_utc().timestamp()],
            |row| row.get(0),
        )
    }

    fn hourly_wind(&self, station_id: i32, nominal: NaiveDateTime) -> Lookup<WindReport> {
        self.hourly_wind_kind(station_id, WindKind::Wind, nominal)
    }

    fn hourly_gust(&self, station_id: i32, nominal: NaiveDateTime) -> Lookup<WindReport> {
        self.hourly_wind_kind(station_id, WindKind::Gust, nominal)
    }

    fn peak_wind(&self, station_id: i32, nominal: NaiveDateTime) -> Lookup<WindReport> {
        self.hourly_wind_kind(station_id, WindKind::Peak, nominal)
    }

    fn speci_max_wind(
        &self,
        station_id: i32,
        begin: NaiveDateTime,
        end: NaiveDateTime,
        gust: bool,
    ) -> Lookup<WindReport> {
        const QUERY: &str = include_str!("database/query_speci_wind.sql");

        let kind = if gust { WindKind::Gust } else { WindKind::Wind };

        self.query_one(
            QUERY,
            [
                &station_id as &dyn ToSql,
                &kind.as_ref(),
                &begin.and_utc().timestamp(),
                &end.and_utc().timestamp(),
            ],
            wind_report_from_row,
        )
    }

    fn weather(&self, station_id: i32, nominal: NaiveDateTime) -> Lookup<Vec<WeatherGroup>> {
        const QUERY: &str = include_str!("database/query_weather.sql");

        let groups = self.query_all(
            QUERY,
            [&station_id as &dyn ToSql, &nominal.and_utc().timestamp()],
            |row| {
                Ok(WeatherGroup {
                    code: row.get(0)?,
                    visibility_16ths: row.get(1)?,
                })
            },
        );

        match groups {
            Ok(groups) if !groups.is_empty() => Lookup::Found(groups),
            Ok(_) => match self.report_exists(station_id, nominal) {
                Ok(true) => Lookup::Found(vec![]),
                Ok(false) => Lookup::NotFound,
                Err(err) => Lookup::Failed(err.into()),
            },
            Err(err) => Lookup::Failed(err.into()),
        }
    }
}

impl ClimateArchive for ClimateDatabase {
    fn sum_daily(
        &self,
        station_id: i32,
        element: DailyElement,
        begin: NaiveDate,
        end: NaiveDate,
    ) -> Lookup<Amount> {
        match self.daily_records(station_id, begin, end) {
            Lookup::Found(days) => sum_days(&days, element).map_or(Lookup::NotFound, Lookup::Found),
            Lookup::NotFound => Lookup::NotFound,
            Lookup::Failed(err) => Lookup::Failed(err),
        }
    }

    fn daily_record(&self, station_id: i32, date: NaiveDate) -> Lookup<StoredDay> {
        match self.daily_records(station_id, date, date) {
            Lookup::Found(mut days) => days.pop().map_or(Lookup::NotFound, Lookup::Found),
            Lookup::NotFound => Lookup::NotFound,
            Lookup::Failed(err) => Lookup::Failed(err),
        }
    }

    fn daily_records(
        &self,
        station_id: i32,
        begin: NaiveDate,
        end: NaiveDate,
    ) -> Lookup<Vec<StoredDay>> {
        const QUERY: &str = include_str!("database/query_daily_climate.sql");

        let days = self.query_all(
            QUERY,
            [&station_id as &dyn ToSql, &begin, &end],
            stored_day_from_row,
        );

        match days {
            Ok(days) if days.is_empty() => Lookup::NotFound,
            other => Lookup::from(other.map(Some)),
        }
    }

    fn early_freeze(&self, station_id: i32, begin: NaiveDate, end: NaiveDate) -> Lookup<NaiveDate> {
        const QUERY: &str = include_str!("database/query_early_freeze.sql");
        self.freeze_date(QUERY, station_id, begin, end)
    }

    fn late_freeze(&self, station_id: i32, begin: NaiveDate, end: NaiveDate) -> Lookup<NaiveDate> {
        const QUERY: &str = include_str!("database/query_late_freeze.sql");
        self.freeze_date(QUERY, station_id, begin, end)
    }
}

impl ClimateDatabase {
    fn freeze_date(
        &self,
        query: &str,
        station_id: i32,
        begin: NaiveDate,
        end: NaiveDate,
    ) -> Lookup<NaiveDate> {
        let res = self.conn.query_row(
            query,
            [&station_id as &dyn ToSql, &begin, &end],
            |row| row.get::<_, Option<NaiveDate>>(0),
        );

        Lookup::from(res)
    }
}

impl NormalsQuery for ClimateDatabase {
    fn daily_normals(&self, station_id: i32, month: u32, day: u32) -> Lookup<DailyNormals> {
        match self.all_normals(station_id) {
            Ok(normals) => normals
                .into_iter()
                .find(|n| n.month == month && n.day == day)
                .map_or(Lookup::NotFound, Lookup::Found),
            Err(err) => Lookup::Failed(err.into()),
        }
    }

    fn daily_normals_range(
        &self,
        station_id: i32,
        begin: NaiveDate,
        end: NaiveDate,
    ) -> Lookup<Vec<DailyNormals>> {
        let normals = match self.all_normals(station_id) {
            Ok(normals) => normals,
            Err(err) => return Lookup::Failed(err.into()),
        };

        let by_day: HashMap<(u32, u32), DailyNormals> = normals
            .into_iter()
            .map(|n| ((n.month, n.day), n))
            .collect();

        let found: Vec<DailyNormals> = date_range(begin, end)
            .filter_map(|d| by_day.get(&(d.month(), d.day())).cloned())
            .collect();

        if found.is_empty() {
            Lookup::NotFound
        } else {
            Lookup::Found(found)
        }
    }

    fn freeze_normals(&self, station_id: i32) -> Lookup<FreezeNormals> {
        const QUERY: &str = include_str!("database/query_freeze_normals.sql");

        self.query_one(QUERY, [station_id], |row| {
            Ok(FreezeNormals {
                early_normal: row.get(0)?,
                late_normal: row.get(1)?,
                early_record: row.get(2)?,
                late_record: row.get(3)?,
            })
        })
    }
}

/*-------------------------------------------------------------------------------------------------
 *                                    Row conversions
 *-----------------------------------------------------------------------------------------------*/
fn amount_to_sql(amount: Amount) -> Option<f64> {
    match amount {
        Amount::Missing => None,
        Amount::Trace => Some(TRACE_CODE),
        Amount::Value(v) => Some(v),
    }
}

fn amount_from_sql(val: Option<f64>) -> Amount {
    val.map(Amount::from_report).unwrap_or(Amount::Missing)
}

fn wind_from_sql(speed: Option<f64>, direction: Option<f64>) -> Option<Wind> {
    Some(Wind {
        speed: speed?,
        direction: direction?,
    })
}

fn from_timestamp(timestamp: i64) -> rusqlite::Result<NaiveDateTime> {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.naive_utc())
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(0, timestamp))
}

fn parse_codes(codes: &str) -> Vec<i32> {
    codes
        .split(',')
        .filter_map(|c| c.trim().parse().ok())
        .collect()
}

fn wind_report_from_row(row: &Row<'_>) -> rusqlite::Result<WindReport> {
    Ok(WindReport {
        wind: Wind {
            speed: row.get(0)?,
            direction: row.get(1)?,
        },
        at: from_timestamp(row.get(2)?)?,
    })
}

fn stored_day_from_row(row: &Row<'_>) -> rusqlite::Result<StoredDay> {
    Ok(StoredDay {
        date: row.get(0)?,
        max_temp: row.get(1)?,
        min_temp: row.get(2)?,
        precip: amount_from_sql(row.get(3)?),
        snowfall: amount_from_sql(row.get(4)?),
        snow_depth: amount_from_sql(row.get(5)?),
        heating_degree_days: row.get(6)?,
        cooling_degree_days: row.get(7)?,
        avg_wind_speed: row.get(8)?,
        resultant_wind: wind_from_sql(row.get(9)?, row.get(10)?),
        max_wind: wind_from_sql(row.get(11)?, row.get(12)?),
        max_gust: wind_from_sql(row.get(13)?, row.get(14)?),
        max_rh: row.get(15)?,
        min_rh: row.get(16)?,
        sky_cover: row.get(17)?,
        percent_sun: row.get(18)?,
    })
}
