/*!
 * Interfaces to the data the derivation pipeline reads.
 *
 * None of the pipeline performs I/O itself. Observation archives, normals, station lists, and
 * astronomy are all reached through the traits in this module. A `SQLite` implementation lives in
 * the database module and tests supply their own.
 */

use crate::{error::QueryError, station::Station, value::Amount, ClimoResult};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::warn;
use strum::{AsRefStr, EnumString};

/// Outcome of a single lookup.
///
/// "Not found" is the common case that drives the fallback chains, so it is a plain variant and
/// not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    Failed(QueryError),
}

impl<T> Lookup<T> {
    /// The value if one was found, failures are dropped without a trace.
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(v) => Some(v),
            _ => None,
        }
    }

    /// The value if one was found, a failed query is logged at warning level.
    pub fn or_warn(self, context: &str) -> Option<T> {
        match self {
            Lookup::Found(v) => Some(v),
            Lookup::NotFound => None,
            Lookup::Failed(err) => {
                warn!("{}: {}", context, err);
                None
            }
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Lookup<U> {
        match self {
            Lookup::Found(v) => Lookup::Found(f(v)),
            Lookup::NotFound => Lookup::NotFound,
            Lookup::Failed(err) => Lookup::Failed(err),
        }
    }

    /// Turn "found" values that fail a predicate into "not found".
    pub fn filter<F: FnOnce(&T) -> bool>(self, pred: F) -> Lookup<T> {
        match self {
            Lookup::Found(v) if pred(&v) => Lookup::Found(v),
            Lookup::Found(_) => Lookup::NotFound,
            other => other,
        }
    }
}

impl<T, E: Into<QueryError>> From<Result<Option<T>, E>> for Lookup<T> {
    fn from(res: Result<Option<T>, E>) -> Self {
        match res {
            Ok(Some(v)) => Lookup::Found(v),
            Ok(None) => Lookup::NotFound,
            Err(err) => Lookup::Failed(err.into()),
        }
    }
}

/// A single valued group in routine hourly (METAR) reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Element {
    /// Temperature in tenths of a degree Celsius precision.
    TempTenths,
    /// Temperature rounded to a whole degree Celsius.
    TempWhole,
    DewpointTenths,
    DewpointWhole,
    MaxTemp6Hour,
    MinTemp6Hour,
    MaxTemp24Hour,
    MinTemp24Hour,
    Precip1Hour,
    Precip3Hour,
    Precip6Hour,
    /// Snow depth in whole inches.
    SnowDepth,
    /// Minutes of sunshine on the previous day.
    SunshineMinutes,
    /// Total sky cover as a fraction, 0.0 to 1.0.
    SkyCover,
}

/// Routine or special reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum ReportSource {
    Metar,
    Speci,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extreme {
    Max,
    Min,
}

/// A temperature read from an hourly or special report, in °C.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempReading {
    pub celsius: f64,
    pub at: NaiveDateTime,
    /// Reported to a tenth of a degree rather than a whole degree.
    pub tenths: bool,
}

/// Wind speed and direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wind {
    /// Speed in the units of the context, knots in reports and mph in climate records.
    pub speed: f64,
    /// Direction the wind blows from in degrees.
    pub direction: f64,
}

/// A wind from a report with the time it was observed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindReport {
    pub wind: Wind,
    pub at: NaiveDateTime,
}

/// A present weather group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherGroup {
    /// Present weather code.
    pub code: i32,
    /// Visibility in sixteenths of a statute mile reported with the group, if any.
    pub visibility_16ths: Option<i32>,
}

/// The values of a station daily summary message, already in °F, inches, and mph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailySummary {
    pub max_temp: Option<i32>,
    pub max_temp_time: Option<NaiveTime>,
    pub min_temp: Option<i32>,
    pub min_temp_time: Option<NaiveTime>,
    pub precip: Amount,
    pub snowfall: Amount,
    pub snow_depth: Amount,
    pub avg_wind_speed: Option<f64>,
    pub max_wind: Option<Wind>,
    pub max_wind_time: Option<NaiveTime>,
    pub max_gust: Option<Wind>,
    pub max_gust_time: Option<NaiveTime>,
    pub sunshine_minutes: Option<i32>,
    pub sunshine_percent: Option<i32>,
    pub sky_cover: Option<f64>,
    /// Present weather codes reported for the day. `None` when the group was absent.
    pub weather: Option<Vec<i32>>,
}

/// Quantities archived for a past day, used for last year comparisons and period summaries.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDay {
    pub date: NaiveDate,
    pub max_temp: Option<i32>,
    pub min_temp: Option<i32>,
    pub precip: Amount,
    pub snowfall: Amount,
    pub snow_depth: Amount,
    pub heating_degree_days: Option<i32>,
    pub cooling_degree_days: Option<i32>,
    pub avg_wind_speed: Option<f64>,
    pub resultant_wind: Option<Wind>,
    pub max_wind: Option<Wind>,
    pub max_gust: Option<Wind>,
    pub max_rh: Option<i32>,
    pub min_rh: Option<i32>,
    pub sky_cover: Option<f64>,
    pub percent_sun: Option<i32>,
}

impl StoredDay {
    /// A day with nothing recorded.
    pub fn empty(date: NaiveDate) -> Self {
        StoredDay {
            date,
            max_temp: None,
            min_temp: None,
            precip: Amount::Missing,
            snowfall: Amount::Missing,
            snow_depth: Amount::Missing,
            heating_degree_days: None,
            cooling_degree_days: None,
            avg_wind_speed: None,
            resultant_wind: None,
            max_wind: None,
            max_gust: None,
            max_rh: None,
            min_rh: None,
            sky_cover: None,
            percent_sun: None,
        }
    }

    /// A summable quantity of this day as an amount.
    pub fn amount(&self, element: DailyElement) -> Amount {
        let degree_days = |dd: Option<i32>| {
            dd.map(|v| Amount::Value(f64::from(v)))
                .unwrap_or(Amount::Missing)
        };

        match element {
            DailyElement::Precip => self.precip,
            DailyElement::Snowfall => self.snowfall,
            DailyElement::HeatingDegreeDays => degree_days(self.heating_degree_days),
            DailyElement::CoolingDegreeDays => degree_days(self.cooling_degree_days),
        }
    }
}

/// Sum a quantity over archived days. `None` when no day has a value for it.
pub fn sum_days<'a, I>(days: I, element: DailyElement) -> Option<Amount>
where
    I: IntoIterator<Item = &'a StoredDay>,
{
    days.into_iter()
        .map(|day| day.amount(element))
        .filter(|inc| !inc.is_missing())
        .fold(None, |total: Option<Amount>, inc| {
            Some(total.unwrap_or(Amount::Missing).tally(inc))
        })
}

/// Daily quantities that can be summed over a range of stored days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum DailyElement {
    Precip,
    Snowfall,
    HeatingDegreeDays,
    CoolingDegreeDays,
}

/// Historical normals and records for one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyNormals {
    pub month: u32,
    pub day: u32,
    pub max_temp_mean: Option<f64>,
    pub max_temp_record: Option<i32>,
    pub min_temp_mean: Option<f64>,
    pub min_temp_record: Option<i32>,
    pub precip_mean: Amount,
    pub precip_record: Amount,
    pub snowfall_mean: Amount,
    pub snowfall_record: Amount,
    pub snow_depth_mean: Amount,
    pub heating_degree_days_mean: Option<i32>,
    pub cooling_degree_days_mean: Option<i32>,
}

impl DailyNormals {
    /// Mean of the normal maximum and minimum.
    pub fn mean_temp(&self) -> Option<f64> {
        match (self.max_temp_mean, self.min_temp_mean) {
            (Some(hi), Some(lo)) => Some((hi + lo) / 2.0),
            _ => None,
        }
    }
}

/// Normal and record dates of the first autumn and last spring freeze.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FreezeNormals {
    pub early_normal: Option<NaiveDate>,
    pub late_normal: Option<NaiveDate>,
    pub early_record: Option<NaiveDate>,
    pub late_record: Option<NaiveDate>,
}

/// Source of the configured station list.
pub trait StationDirectory {
    /// Every configured climate station. Failing to load stations aborts a run.
    fn stations(&self) -> ClimoResult<Vec<Station>>;
}

/// Observation archive of routine, special, and daily summary reports.
pub trait ObservationQuery {
    /// The daily summary message for a local date, valid through the local hour `valid_hour`
    /// (24 for the whole day).
    fn daily_summary(&self, station_id: i32, date: NaiveDate, valid_hour: u32)
        -> Lookup<DailySummary>;

    /// A group from the latest routine report (or correction) at a nominal time.
    fn report_value(&self, station_id: i32, element: Element, nominal: NaiveDateTime)
        -> Lookup<f64>;

    /// The extreme temperature across reports of one kind in `[begin, end]`.
    fn period_extreme(
        &self,
        station_id: i32,
        source: ReportSource,
        extreme: Extreme,
        begin: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Lookup<TempReading>;

    /// Supplemental climatological snowfall reported in `[begin, end]`, inches.
    fn scd_snowfall(&self, station_id: i32, begin: NaiveDateTime, end: NaiveDateTime)
        -> Lookup<f64>;

    /// The correction indicator of the routine report at a nominal time. `None` when the
    /// report exists but carries no indicator.
    fn report_correction(&self, station_id: i32, nominal: NaiveDateTime)
        -> Lookup<Option<String>>;

    /// Sustained wind of the routine report at a nominal time, knots.
    fn hourly_wind(&self, station_id: i32, nominal: NaiveDateTime) -> Lookup<WindReport>;

    /// Gust of the routine report at a nominal time, knots.
    fn hourly_gust(&self, station_id: i32, nominal: NaiveDateTime) -> Lookup<WindReport>;

    /// Peak wind remark of the routine report at a nominal time, knots.
    fn peak_wind(&self, station_id: i32, nominal: NaiveDateTime) -> Lookup<WindReport>;

    /// Strongest wind (or gust) in special reports during `[begin, end]`, knots.
    fn speci_max_wind(
        &self,
        station_id: i32,
        begin: NaiveDateTime,
        end: NaiveDateTime,
        gust: bool,
    ) -> Lookup<WindReport>;

    /// Present weather groups of routine and special reports for a nominal hour. Not found
    /// means there was no report at all, an empty list means nothing was reported.
    fn weather(&self, station_id: i32, nominal: NaiveDateTime) -> Lookup<Vec<WeatherGroup>>;
}

/// Archive of daily climate records built by earlier runs.
pub trait ClimateArchive {
    /// Sum a stored daily quantity over an inclusive range of dates.
    fn sum_daily(
        &self,
        station_id: i32,
        element: DailyElement,
        begin: NaiveDate,
        end: NaiveDate,
    ) -> Lookup<Amount>;

    fn daily_record(&self, station_id: i32, date: NaiveDate) -> Lookup<StoredDay>;

    fn daily_records(&self, station_id: i32, begin: NaiveDate, end: NaiveDate)
        -> Lookup<Vec<StoredDay>>;

    /// First date in the range with a minimum temperature at or below freezing.
    fn early_freeze(&self, station_id: i32, begin: NaiveDate, end: NaiveDate)
        -> Lookup<NaiveDate>;

    /// Last date in the range with a minimum temperature at or below freezing.
    fn late_freeze(&self, station_id: i32, begin: NaiveDate, end: NaiveDate)
        -> Lookup<NaiveDate>;
}

/// Historical normals and records.
pub trait NormalsQuery {
    fn daily_normals(&self, station_id: i32, month: u32, day: u32) -> Lookup<DailyNormals>;

    /// Daily normals for every calendar day in an inclusive range, which may cross a year.
    fn daily_normals_range(
        &self,
        station_id: i32,
        begin: NaiveDate,
        end: NaiveDate,
    ) -> Lookup<Vec<DailyNormals>>;

    fn freeze_normals(&self, station_id: i32) -> Lookup<FreezeNormals>;
}

/// Astronomical calculations.
pub trait SunCalculator {
    /// Local sunrise and sunset for a date. `None` for polar day or night.
    fn rise_set(
        &self,
        date: NaiveDate,
        lat: f64,
        lon: f64,
        utc_offset: i32,
    ) -> Option<(NaiveTime, NaiveTime)>;
}

/// Everything a run reads from.
pub trait ClimateSources: ObservationQuery + ClimateArchive + NormalsQuery {}

impl<T: ObservationQuery + ClimateArchive + NormalsQuery> ClimateSources for T {}
