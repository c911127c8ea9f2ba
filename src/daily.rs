/*!
 * Assemble the climate record of one station for one day.
 */

use crate::{
    climate_time::{nint, shift_days, utc_hour_to_local},
    extract::{
        extract_humidity, extract_precip, extract_sky_cover, extract_snow, extract_sunshine,
        extract_temperature, extract_weather, extract_wind, Context, WeatherFlags,
    },
    history::{
        accumulate_normals, accumulate_observed, prior_year_and_normals, Accumulations,
        DailyIncrements, PriorYearAndNormals,
    },
    query::{ClimateSources, StoredDay, SunCalculator, Wind},
    station::Station,
    value::{Amount, Derived, Provenance},
    window::ObservationWindow,
    ClimoResult,
};
use chrono::{NaiveDate, NaiveTime, Timelike};
use log::{debug, warn};

/// Degree days are computed against this mean temperature, °F.
pub const DEGREE_DAY_BASE: i32 = 65;

/// Snowfall is assumed to be zero when the minimum temperature is above this, °F.
const NO_SNOW_MIN_TEMP: i32 = 50;

/// Everything reported for one station on one day.
///
/// Temperatures are °F, amounts inches, winds mph. Times are local standard time.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyClimateRecord {
    pub station_id: i32,
    pub date: NaiveDate,
    pub window: ObservationWindow,

    pub max_temp: Derived<i32>,
    pub min_temp: Derived<i32>,

    pub precip: Derived<Amount>,
    pub snowfall: Derived<Amount>,
    pub snow_depth: Derived<Amount>,

    pub heating_degree_days: Derived<i32>,
    pub cooling_degree_days: Derived<i32>,

    pub max_wind: Derived<Wind>,
    pub max_gust: Derived<Wind>,
    pub avg_wind_speed: Derived<f64>,
    pub resultant_wind: Derived<Wind>,

    pub max_rh: Derived<i32>,
    pub min_rh: Derived<i32>,
    pub mean_rh: Derived<i32>,

    pub sky_cover: Derived<f64>,
    pub sunshine_minutes: Derived<i32>,
    pub sunshine_percent: Derived<i32>,
    pub weather: Derived<WeatherFlags>,

    pub sunrise: Option<NaiveTime>,
    pub sunset: Option<NaiveTime>,
    /// Time zone label for the report, e.g. "MST".
    pub zone_label: String,

    pub accumulations: Accumulations,
    pub normal_accumulations: Accumulations,
    pub history: PriorYearAndNormals,
}

impl DailyClimateRecord {
    /// Number of weather categories that occurred, `None` when weather is missing.
    pub fn weather_count(&self) -> Option<usize> {
        self.weather.value().map(|flags| flags.count())
    }

    /// The values kept in the archive of daily records.
    pub fn to_stored(&self) -> StoredDay {
        StoredDay {
            date: self.date,
            max_temp: self.max_temp.get(),
            min_temp: self.min_temp.get(),
            precip: self.precip.amount_or_missing(),
            snowfall: self.snowfall.amount_or_missing(),
            snow_depth: self.snow_depth.amount_or_missing(),
            heating_degree_days: self.heating_degree_days.get(),
            cooling_degree_days: self.cooling_degree_days.get(),
            avg_wind_speed: self.avg_wind_speed.get(),
            resultant_wind: self.resultant_wind.get(),
            max_wind: self.max_wind.get(),
            max_gust: self.max_gust.get(),
            max_rh: self.max_rh.get(),
            min_rh: self.min_rh.get(),
            sky_cover: self.sky_cover.get(),
            percent_sun: self.sunshine_percent.get(),
        }
    }

    /// Replace derived values with those of a previously stored record for the same day.
    ///
    /// A derived snow depth is kept, the stored one only fills a missing depth.
    fn overlay(&mut self, stored: &StoredDay) {
        fn replace<T>(field: &mut Derived<T>, stored: Option<T>) {
            if let Some(val) = stored {
                *field = Derived::new(val, Provenance::ManualEntry);
            }
        }

        fn replace_amount(field: &mut Derived<Amount>, stored: Amount) {
            if !stored.is_missing() {
                *field = Derived::amount(stored, Provenance::ManualEntry);
            }
        }

        replace(&mut self.max_temp, stored.max_temp);
        replace(&mut self.min_temp, stored.min_temp);
        replace_amount(&mut self.precip, stored.precip);
        replace_amount(&mut self.snowfall, stored.snowfall);
        if self.snow_depth.is_missing() {
            replace_amount(&mut self.snow_depth, stored.snow_depth);
        }
        replace(&mut self.heating_degree_days, stored.heating_degree_days);
        replace(&mut self.cooling_degree_days, stored.cooling_degree_days);
        replace(&mut self.avg_wind_speed, stored.avg_wind_speed);
        replace(&mut self.resultant_wind, stored.resultant_wind);
        replace(&mut self.max_wind, stored.max_wind);
        replace(&mut self.max_gust, stored.max_gust);
        replace(&mut self.max_rh, stored.max_rh);
        replace(&mut self.min_rh, stored.min_rh);
        replace(&mut self.sky_cover, stored.sky_cover);
        replace(&mut self.sunshine_percent, stored.percent_sun);
    }

    fn increments(&self) -> DailyIncrements {
        let degree_days = |dd: &Derived<i32>| {
            dd.get()
                .map(|v| Amount::Value(f64::from(v)))
                .unwrap_or(Amount::Missing)
        };

        DailyIncrements {
            precip: self.precip.amount_or_missing(),
            snowfall: self.snowfall.amount_or_missing(),
            heating_degree_days: degree_days(&self.heating_degree_days),
            cooling_degree_days: degree_days(&self.cooling_degree_days),
        }
    }
}

/// Options that change how a daily record is assembled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DailyOptions {
    /// Overlay a previously stored record for the same day, used by manual runs for a chosen
    /// date.
    pub overlay_stored: bool,
}

/**
 * Build the daily climate record of a station.
 *
 * #Arguments
 * * sources - observation archive, daily record archive, and normals.
 * * sun - astronomical calculations.
 * * station - the station.
 * * window - the observation window of the report.
 * * options - how to assemble the record.
 *
 * #Returns
 * The record. Quantities that could not be derived are missing, which is never an error.
 */
pub fn build_daily_record<S: ClimateSources>(
    sources: &S,
    sun: &dyn SunCalculator,
    station: &Station,
    window: &ObservationWindow,
    options: DailyOptions,
) -> ClimoResult<DailyClimateRecord> {
    let date = window.valid_date();
    let offset = window.utc_offset;

    let summary = sources
        .daily_summary(station.id, date, summary_valid_hour(window))
        .or_warn("daily summary");
    if summary.is_some() {
        debug!("Daily summary found for {} on {}", station.icao, date);
    }

    let ctx = Context::new(sources, station, window, summary.as_ref());

    let temps = extract_temperature(&ctx);
    let max_temp = to_local(temps.max, offset);
    let min_temp = to_local(temps.min, offset);

    let precip = extract_precip(&ctx);

    let snow = extract_snow(&ctx);
    let snowfall = assume_no_snow(snow.snowfall, &precip, &min_temp);

    let humidity = extract_humidity(&ctx);
    let winds = extract_wind(&ctx);
    let sky_cover = extract_sky_cover(&ctx);
    let sunshine = extract_sunshine(&ctx, sun);
    let weather = extract_weather(&ctx);

    let (heating_degree_days, cooling_degree_days) = degree_days(&max_temp, &min_temp);

    let sun_date = if window.is_morning() {
        shift_days(date, 1).unwrap_or(date)
    } else {
        date
    };
    let (sunrise, sunset) = match sun.rise_set(
        sun_date,
        station.lat,
        station.lon,
        station.clock_offset(sun_date),
    ) {
        Some((rise, set)) => (Some(rise), Some(set)),
        None => (None, None),
    };

    let mut record = DailyClimateRecord {
        station_id: station.id,
        date,
        window: *window,
        max_temp,
        min_temp,
        precip,
        snowfall,
        snow_depth: snow.depth,
        heating_degree_days,
        cooling_degree_days,
        max_wind: to_local(winds.max_wind, offset),
        max_gust: to_local(winds.max_gust, offset),
        avg_wind_speed: winds.avg_speed,
        resultant_wind: winds.resultant,
        max_rh: to_local(humidity.max, offset),
        min_rh: to_local(humidity.min, offset),
        mean_rh: humidity.mean,
        sky_cover,
        sunshine_minutes: sunshine.minutes,
        sunshine_percent: sunshine.percent,
        weather,
        sunrise,
        sunset,
        zone_label: station.zone_label(sun_date),
        accumulations: Accumulations::default(),
        normal_accumulations: Accumulations::default(),
        history: PriorYearAndNormals::default(),
    };

    if options.overlay_stored {
        match sources.daily_record(station.id, date).or_warn("stored daily record") {
            Some(stored) => record.overlay(&stored),
            None => warn!("No stored record to overlay for {} on {}", station.icao, date),
        }
    }

    record.accumulations = accumulate_observed(sources, station.id, date, &record.increments());
    record.normal_accumulations = accumulate_normals(sources, station.id, date);
    record.history = prior_year_and_normals(sources, station.id, date);

    Ok(record)
}

/// Degree days from the rounded mean of the maximum and minimum temperature.
pub fn degree_days(max: &Derived<i32>, min: &Derived<i32>) -> (Derived<i32>, Derived<i32>) {
    match (max.get(), min.get()) {
        (Some(hi), Some(lo)) => {
            let mean = nint(f64::from(hi + lo) / 2.0);
            let (heat, cool) = if mean <= DEGREE_DAY_BASE {
                (DEGREE_DAY_BASE - mean, 0)
            } else {
                (0, mean - DEGREE_DAY_BASE)
            };
            (
                Derived::new(heat, Provenance::Calculated),
                Derived::new(cool, Provenance::Calculated),
            )
        }
        _ => (Derived::missing(), Derived::missing()),
    }
}

/// The local hour the daily summary is valid through, 24 for the whole day.
fn summary_valid_hour(window: &ObservationWindow) -> u32 {
    if window.is_morning() {
        24
    } else {
        (window.end - window.begin).num_hours().clamp(0, 24) as u32
    }
}

/// Snowfall is zero when it was not reported but the day had no precipitation or was too warm.
fn assume_no_snow(
    snowfall: Derived<Amount>,
    precip: &Derived<Amount>,
    min_temp: &Derived<i32>,
) -> Derived<Amount> {
    if !snowfall.is_missing() {
        return snowfall;
    }

    let dry = precip.get().map(|p| p.is_zero()).unwrap_or(false);
    let warm = min_temp.get().map(|t| t > NO_SNOW_MIN_TEMP).unwrap_or(false);

    if dry || warm {
        Derived::amount(Amount::Value(0.0), Provenance::Assumed)
    } else {
        snowfall
    }
}

/// Shift a time of occurrence from UTC to local standard time.
///
/// Summary and manual values already carry local times.
fn to_local<T>(derived: Derived<T>, utc_offset: i32) -> Derived<T> {
    match (derived.provenance(), derived.time()) {
        (Provenance::DailySummary, _) | (Provenance::ManualEntry, _) | (_, None) => derived,
        (_, Some(utc)) => {
            let hour = utc_hour_to_local(utc.hour(), utc_offset);
            let local = NaiveTime::from_hms_opt(hour, utc.minute(), utc.second());
            derived.at(local)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        mock::{dt, flat_normals, station, FixedSun, MockSources},
        period::PeriodType,
        query::{DailySummary, Element, ReportSource, TempReading},
        window::resolve_window,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn build(mock: &MockSources, options: DailyOptions) -> DailyClimateRecord {
        let stn = station(-5);
        let window = resolve_window(PeriodType::MorningNwws, date(2024, 1, 10), -5, None).unwrap();
        build_daily_record(mock, &FixedSun, &stn, &window, options).unwrap()
    }

    #[test]
    fn test_degree_days() {
        let t = |v| Derived::new(v, Provenance::DailySummary);

        let (heat, cool) = degree_days(&t(50), &t(30));
        assert_eq!(heat.get(), Some(25));
        assert_eq!(cool.get(), Some(0));

        let (heat, cool) = degree_days(&t(91), &t(70));
        assert_eq!(heat.get(), Some(0));
        assert_eq!(cool.get(), Some(16));

        let (heat, cool) = degree_days(&t(65), &Derived::missing());
        assert!(heat.is_missing());
        assert!(cool.is_missing());
    }

    #[test]
    fn test_times_are_local() {
        let mut mock = MockSources::default();
        mock.temps.push((
            ReportSource::Metar,
            TempReading {
                celsius: 10.0,
                at: dt(2024, 1, 10, 19, 52),
                tenths: true,
            },
        ));

        let rec = build(&mock, DailyOptions::default());
        assert_eq!(rec.max_temp.get(), Some(50));
        assert_eq!(rec.max_temp.time(), NaiveTime::from_hms_opt(14, 52, 0));
        assert_eq!(rec.sunrise, NaiveTime::from_hms_opt(6, 0, 0));
        assert_eq!(rec.zone_label, "EST");
    }

    #[test]
    fn test_snowfall_assumed_zero_only_as_last_resort() {
        let mut mock = MockSources::default();
        mock.set(Element::Precip6Hour, dt(2024, 1, 10, 12, 0), 0.0);

        let rec = build(&mock, DailyOptions::default());
        assert_eq!(rec.precip.get(), Some(Amount::Value(0.0)));
        assert_eq!(rec.snowfall.get(), Some(Amount::Value(0.0)));
        assert_eq!(rec.snowfall.provenance(), Provenance::Assumed);

        // Measured snowfall is never replaced.
        mock.scd.push((dt(2024, 1, 10, 12, 0), 1.0));
        let rec = build(&mock, DailyOptions::default());
        assert_eq!(rec.snowfall.provenance(), Provenance::SnowScd);

        // Unknown precipitation and temperature leave snowfall missing.
        let rec = build(&MockSources::default(), DailyOptions::default());
        assert!(rec.snowfall.is_missing());
    }

    #[test]
    fn test_summary_is_used_and_accumulated() {
        let mut mock = MockSources::default();
        mock.summaries.insert(
            date(2024, 1, 10),
            DailySummary {
                max_temp: Some(40),
                min_temp: Some(20),
                precip: Amount::Value(0.2),
                ..DailySummary::default()
            },
        );
        mock.days.push(StoredDay {
            precip: Amount::Value(0.3),
            ..StoredDay::empty(date(2024, 1, 5))
        });
        mock.normals.push(flat_normals(1, 10));
        mock.normals.push(flat_normals(1, 11));

        let rec = build(&mock, DailyOptions::default());
        assert_eq!(rec.max_temp.provenance(), Provenance::DailySummary);
        assert_eq!(rec.heating_degree_days.get(), Some(35));
        assert_eq!(rec.accumulations.precip.month, Amount::Value(0.5));
        assert!(rec.history.normals_tomorrow.is_some());
        assert_eq!(mock.summary_calls.get(), 1);

        let stored = rec.to_stored();
        assert_eq!(stored.max_temp, Some(40));
        assert_eq!(stored.heating_degree_days, Some(35));
    }

    #[test]
    fn test_overlay_keeps_derived_depth() {
        let mut mock = MockSources::default();
        let at = dt(2024, 1, 10, 12, 0);
        mock.corrections.insert(at, None);
        mock.set(Element::SnowDepth, at, 6.0);
        mock.days.push(StoredDay {
            max_temp: Some(33),
            snow_depth: Amount::Value(2.0),
            ..StoredDay::empty(date(2024, 1, 10))
        });

        let rec = build(&mock, DailyOptions::default());
        assert!(rec.max_temp.is_missing());

        let rec = build(
            &mock,
            DailyOptions {
                overlay_stored: true,
            },
        );
        assert_eq!(rec.max_temp.get(), Some(33));
        assert_eq!(rec.max_temp.provenance(), Provenance::ManualEntry);
        assert_eq!(rec.snow_depth.get(), Some(Amount::Value(6.0)));
    }
}
