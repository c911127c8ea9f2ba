/*!
 * Wind extremes, scalar average, and resultant (vector mean) wind.
 *
 * Reports carry knots. Everything leaving this module is in mph.
 */

use super::Context;
use crate::{
    climate_time::{knots_to_mph, nint},
    query::{Wind, WindReport},
    value::{Derived, Provenance},
    window::floor_hour,
};
use chrono::Duration;
use log::info;

/// Wind quantities for a window. Speeds in mph, times UTC.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Winds {
    pub max_wind: Derived<Wind>,
    pub max_gust: Derived<Wind>,
    pub avg_speed: Derived<f64>,
    pub resultant: Derived<Wind>,
}

/**
 * Derive the wind quantities for a window.
 *
 * Summary values are used where the daily summary has them, and reports are only searched for
 * the extremes it lacks. The maximum sustained wind starts from the strongest special report and
 * is replaced by any hourly wind at least as strong. The maximum gust starts from the strongest
 * special report gust and is replaced by stronger hourly gusts or peak wind remarks.
 */
pub fn extract_wind(ctx: &Context) -> Winds {
    let summary = ctx.summary;

    let summary_wind = summary.and_then(|dsm| {
        dsm.max_wind
            .map(|w| Derived::new(w, Provenance::DailySummary).at(dsm.max_wind_time))
    });
    let summary_gust = summary.and_then(|dsm| {
        dsm.max_gust
            .map(|w| Derived::new(w, Provenance::DailySummary).at(dsm.max_gust_time))
    });

    // Hourly winds are always needed for the resultant.
    let scan = ObservedWinds::scan(ctx, summary_wind.is_none(), summary_gust.is_none());

    let max_wind = summary_wind.unwrap_or(scan.max_wind);
    let max_gust = summary_gust.unwrap_or(scan.max_gust);

    let avg_speed = summary
        .and_then(|dsm| dsm.avg_wind_speed)
        .map(|speed| Derived::new(speed, Provenance::DailySummary))
        .unwrap_or_else(|| average_speed(&scan.hourly));

    let resultant = resultant_wind(&scan.hourly)
        .map(|w| Derived::new(w, Provenance::Calculated))
        .unwrap_or_else(Derived::missing);

    if max_wind.is_missing() {
        info!("No wind reports for station {}", ctx.station.icao);
    }

    Winds {
        max_wind,
        max_gust,
        avg_speed,
        resultant,
    }
}

/**
 * The vector mean of a set of winds.
 *
 * #Returns
 * `None` for an empty set. Otherwise the speed of the mean vector and its direction rounded to
 * the nearest 10 degrees.
 */
pub fn resultant_wind(winds: &[Wind]) -> Option<Wind> {
    if winds.is_empty() {
        return None;
    }

    let count = winds.len() as f64;
    let (x, y) = winds.iter().fold((0.0, 0.0), |(x, y), w| {
        let dir = w.direction.to_radians();
        (x + w.speed * dir.sin(), y + w.speed * dir.cos())
    });
    let (x, y) = (x / count, y / count);

    let speed = x.hypot(y);
    let direction = x.atan2(y).to_degrees().rem_euclid(360.0);

    Some(Wind {
        speed,
        direction: f64::from(nint(direction / 10.0) * 10),
    })
}

fn average_speed(hourly: &[Wind]) -> Derived<f64> {
    if hourly.is_empty() {
        return Derived::missing();
    }

    let sum: f64 = hourly.iter().map(|w| w.speed).sum();
    Derived::new(sum / hourly.len() as f64, Provenance::Calculated)
}

/// What the routine and special reports in the window say, in mph.
struct ObservedWinds {
    max_wind: Derived<Wind>,
    max_gust: Derived<Wind>,
    /// Every hourly wind found, calm included.
    hourly: Vec<Wind>,
}

impl ObservedWinds {
    /**
     * Walk the hourly reports in the window.
     *
     * #Arguments
     * * want_wind - also look for the maximum sustained wind.
     * * want_gust - also look for the maximum gust, hourly gusts and peak wind remarks included.
     */
    fn scan(ctx: &Context, want_wind: bool, want_gust: bool) -> Self {
        let id = ctx.station_id();
        let window = ctx.window;
        let hours = window.hour_count();
        let base = floor_hour(window.begin);

        let speci = |gust: bool, context: &str| {
            ctx.query
                .speci_max_wind(id, window.begin, window.end, gust)
                .or_warn(context)
                .map(to_mph)
        };

        let mut max_wind = if want_wind {
            Extreme::seed(speci(false, "special report wind"), Provenance::WindSpeci)
        } else {
            Extreme::default()
        };
        let mut max_gust = if want_gust {
            Extreme::seed(speci(true, "special report gust"), Provenance::Gust)
        } else {
            Extreme::default()
        };
        let mut hourly = Vec::with_capacity(hours as usize);

        for i in 0..hours {
            let nominal = base + Duration::hours(i);

            if let Some(report) = ctx.query.hourly_wind(id, nominal).or_warn("hourly wind") {
                let report = to_mph(report);
                hourly.push(report.wind);
                if want_wind && report.wind.speed > 0.0 {
                    max_wind.offer(report, Provenance::WindHourly, true);
                }
            }

            if !want_gust {
                continue;
            }
            if let Some(report) = ctx.query.hourly_gust(id, nominal).or_warn("hourly gust") {
                max_gust.offer(to_mph(report), Provenance::Gust, false);
            }
        }

        // A peak wind remark describes the hour before its report.
        let peak_hours = if want_gust { hours } else { 0 };
        for i in 1..=peak_hours {
            let nominal = base + Duration::hours(i);
            if let Some(report) = ctx.query.peak_wind(id, nominal).or_warn("peak wind") {
                max_gust.offer(to_mph(report), Provenance::PeakWind, false);
            }
        }

        ObservedWinds {
            max_wind: max_wind.finish(),
            max_gust: max_gust.finish(),
            hourly,
        }
    }
}

/// A running maximum wind.
#[derive(Default)]
struct Extreme {
    best: Option<(WindReport, Provenance)>,
}

impl Extreme {
    fn seed(report: Option<WindReport>, provenance: Provenance) -> Self {
        Extreme {
            best: report.map(|r| (r, provenance)),
        }
    }

    /// Replace the current maximum if `report` is stronger, or equally strong when `ties_win`.
    fn offer(&mut self, report: WindReport, provenance: Provenance, ties_win: bool) {
        let replace = match self.best {
            None => true,
            Some((ref current, _)) if ties_win => report.wind.speed >= current.wind.speed,
            Some((ref current, _)) => report.wind.speed > current.wind.speed,
        };

        if replace {
            self.best = Some((report, provenance));
        }
    }

    fn finish(self) -> Derived<Wind> {
        match self.best {
            Some((report, provenance)) => {
                Derived::new(report.wind, provenance).at(Some(report.at.time()))
            }
            None => Derived::missing(),
        }
    }
}

fn to_mph(report: WindReport) -> WindReport {
    WindReport {
        wind: Wind {
            speed: knots_to_mph(report.wind.speed),
            direction: report.wind.direction,
        },
        at: report.at,
    }
}
