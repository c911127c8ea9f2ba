//! Sunshine duration and percent of possible sunshine.

use super::Context;
use crate::{
    climate_time::{nint, shift_days},
    query::{Element, Lookup, SunCalculator},
    value::{Derived, Provenance},
};
use chrono::{NaiveDate, NaiveTime};
use log::warn;

const MINUTES_PER_DAY: i32 = 24 * 60;

/// Hours (UTC) of the next day's routine reports that carry the sunshine duration group.
const SUNSHINE_HOURS: [u32; 2] = [8, 12];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sunshine {
    pub minutes: Derived<i32>,
    pub percent: Derived<i32>,
}

/**
 * Derive the minutes of sunshine and the percent of possible sunshine.
 *
 * The duration group for a day is reported the following morning. Percent of possible sunshine
 * is the duration relative to the time between sunrise and sunset.
 */
pub fn extract_sunshine(ctx: &Context, sun: &dyn SunCalculator) -> Sunshine {
    let date = ctx.window.valid_date();

    let minutes = ctx
        .summary
        .and_then(|dsm| dsm.sunshine_minutes)
        .map(|m| Derived::new(m, Provenance::DailySummary))
        .unwrap_or_else(|| reported_minutes(ctx, date));

    let percent = ctx
        .summary
        .and_then(|dsm| dsm.sunshine_percent)
        .map(|p| Derived::new(p, Provenance::DailySummary))
        .or_else(|| {
            let minutes = minutes.get()?;
            let daylight = daylight_minutes(ctx, sun, date)?;
            let pct = nint(f64::from(minutes) / daylight * 100.0);
            Some(Derived::new(pct, Provenance::Calculated))
        })
        .unwrap_or_else(Derived::missing);

    Sunshine { minutes, percent }
}

fn reported_minutes(ctx: &Context, date: NaiveDate) -> Derived<i32> {
    let next_day = match shift_days(date, 1) {
        Some(d) => d,
        None => return Derived::missing(),
    };

    for hour in SUNSHINE_HOURS.iter() {
        let nominal = match NaiveTime::from_hms_opt(*hour, 0, 0) {
            Some(time) => next_day.and_time(time),
            None => continue,
        };

        match ctx
            .query
            .report_value(ctx.station_id(), Element::SunshineMinutes, nominal)
        {
            Lookup::Found(val) => {
                let minutes = nint(val);
                if (0..=MINUTES_PER_DAY).contains(&minutes) {
                    return Derived::new(minutes, Provenance::SunMetar);
                }
                warn!(
                    "Sunshine duration of {} minutes at {} for station {} out of range",
                    minutes, nominal, ctx.station.icao
                );
                return Derived::missing();
            }
            Lookup::NotFound => {}
            Lookup::Failed(err) => warn!("sunshine duration: {}", err),
        }
    }

    Derived::missing()
}

fn daylight_minutes(ctx: &Context, sun: &dyn SunCalculator, date: NaiveDate) -> Option<f64> {
    let stn = ctx.station;
    let (rise, set) = sun.rise_set(date, stn.lat, stn.lon, stn.utc_offset)?;
    let daylight = (set - rise).num_minutes();

    if daylight > 0 {
        Some(daylight as f64)
    } else {
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        mock::{dt, station, FixedSun, MockSources},
        period::PeriodType,
        query::DailySummary,
        window::resolve_window,
    };

    fn run(mock: &MockSources, summary: Option<&DailySummary>) -> Sunshine {
        let stn = station(-5);
        let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let window = resolve_window(PeriodType::MorningNwws, date, -5, None).unwrap();
        let ctx = Context::new(mock, &stn, &window, summary);
        extract_sunshine(&ctx, &FixedSun)
    }

    #[test]
    fn test_next_morning_report() {
        let mut mock = MockSources::default();
        mock.set(Element::SunshineMinutes, dt(2024, 6, 11, 12, 0), 540.0);

        let sun = run(&mock, None);
        assert_eq!(sun.minutes.get(), Some(540));
        assert_eq!(sun.minutes.provenance(), Provenance::SunMetar);
        // 540 of 720 possible minutes.
        assert_eq!(sun.percent.get(), Some(75));
        assert_eq!(sun.percent.provenance(), Provenance::Calculated);
    }

    #[test]
    fn test_out_of_range_duration_is_missing() {
        let mut mock = MockSources::default();
        mock.set(Element::SunshineMinutes, dt(2024, 6, 11, 8, 0), 2000.0);
        mock.set(Element::SunshineMinutes, dt(2024, 6, 11, 12, 0), 540.0);

        let sun = run(&mock, None);
        assert!(sun.minutes.is_missing());
        assert!(sun.percent.is_missing());
    }

    #[test]
    fn test_summary_values() {
        let mock = MockSources::default();
        let summary = DailySummary {
            sunshine_minutes: Some(360),
            ..DailySummary::default()
        };
        let sun = run(&mock, Some(&summary));
        assert_eq!(sun.minutes.provenance(), Provenance::DailySummary);
        assert_eq!(sun.percent.get(), Some(50));
    }
}
