//! Daily maximum and minimum temperature.

use super::{derive, whole_fahrenheit, Context, Strategy};
use crate::{
    query::{Element, Extreme, ReportSource, TempReading},
    value::{Derived, Provenance},
    window::round_up_late_minutes,
};
use chrono::{Duration, NaiveDateTime};
use log::{info, warn};

/// Plausible temperatures in °C, anything outside is treated as not reported.
const PLAUSIBLE_CELSIUS: (f64, f64) = (-70.0, 60.0);

/// Extreme temperatures in whole °F. Times are UTC and only set for hourly derived values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Temperatures {
    pub max: Derived<i32>,
    pub min: Derived<i32>,
}

/**
 * Derive the maximum and minimum temperature for a window.
 *
 * The daily summary is authoritative. Morning reports then try the 24 hour group reported near
 * local midnight. After that the window is scanned bucket by bucket, oldest first, using the 6
 * hour group where present and hourly plus special reports elsewhere.
 *
 * Implausible values are logged and skipped so the next source gets its turn.
 */
pub fn extract_temperature(ctx: &Context) -> Temperatures {
    const MAX_CHAIN: [Strategy<i32>; 3] = [summary_max, max_24_hour, scan_max];
    const MIN_CHAIN: [Strategy<i32>; 3] = [summary_min, min_24_hour, scan_min];

    let max = derive(ctx, &MAX_CHAIN);
    let min = derive(ctx, &MIN_CHAIN);

    if max.is_missing() {
        info!("No maximum temperature for station {}", ctx.station.icao);
    }
    if min.is_missing() {
        info!("No minimum temperature for station {}", ctx.station.icao);
    }

    Temperatures { max, min }
}

fn summary_max(ctx: &Context) -> Option<Derived<i32>> {
    let dsm = ctx.summary?;
    dsm.max_temp
        .map(|t| Derived::new(t, Provenance::DailySummary).at(dsm.max_temp_time))
}

fn summary_min(ctx: &Context) -> Option<Derived<i32>> {
    let dsm = ctx.summary?;
    dsm.min_temp
        .map(|t| Derived::new(t, Provenance::DailySummary).at(dsm.min_temp_time))
}

fn max_24_hour(ctx: &Context) -> Option<Derived<i32>> {
    group_24_hour(ctx, Extreme::Max)
}

fn min_24_hour(ctx: &Context) -> Option<Derived<i32>> {
    group_24_hour(ctx, Extreme::Min)
}

fn scan_max(ctx: &Context) -> Option<Derived<i32>> {
    scan_window(ctx, Extreme::Max)
}

fn scan_min(ctx: &Context) -> Option<Derived<i32>> {
    scan_window(ctx, Extreme::Min)
}

/// The 24 hour group is sent with the report nearest local midnight, which may be late or early.
fn group_24_hour(ctx: &Context, extreme: Extreme) -> Option<Derived<i32>> {
    if !ctx.window.is_morning() {
        return None;
    }

    let element = match extreme {
        Extreme::Max => Element::MaxTemp24Hour,
        Extreme::Min => Element::MinTemp24Hour,
    };

    let end = round_up_late_minutes(ctx.window.end);
    (-1..=4)
        .map(|hours| end + Duration::hours(hours))
        .find_map(|nominal| {
            ctx.query
                .report_value(ctx.station_id(), element, nominal)
                .or_warn("24 hour temperature group")
                .filter(|celsius| plausible(*celsius, nominal))
        })
        .map(|celsius| Derived::new(whole_fahrenheit(celsius), Provenance::Temp24Hour))
}

/// A candidate extreme, kept in °C until the winner is known.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    celsius: f64,
    at: Option<NaiveDateTime>,
    provenance: Provenance,
}

impl Candidate {
    fn from_reading(reading: TempReading) -> Self {
        let provenance = if reading.tenths {
            Provenance::TempHourlyTenths
        } else {
            Provenance::TempHourlyWhole
        };

        Candidate {
            celsius: reading.celsius,
            at: Some(reading.at),
            provenance,
        }
    }

    /// Is `self` at least as extreme as `other`?
    fn reaches(&self, other: &Candidate, extreme: Extreme) -> bool {
        match extreme {
            Extreme::Max => self.celsius >= other.celsius,
            Extreme::Min => self.celsius <= other.celsius,
        }
    }

    /// Is `self` strictly more extreme than `other`?
    fn beats(&self, other: &Candidate, extreme: Extreme) -> bool {
        match extreme {
            Extreme::Max => self.celsius > other.celsius,
            Extreme::Min => self.celsius < other.celsius,
        }
    }
}

/// Keep the more extreme candidate. A tie replaces the current best unless it is group level.
fn better(current: Option<Candidate>, candidate: Candidate, extreme: Extreme) -> Candidate {
    match current {
        None => candidate,
        Some(current) if candidate.beats(&current, extreme) => candidate,
        Some(current)
            if candidate.reaches(&current, extreme) && !current.provenance.is_aggregate() =>
        {
            candidate
        }
        Some(current) => current,
    }
}

fn plausible(celsius: f64, at: NaiveDateTime) -> bool {
    let (lo, hi) = PLAUSIBLE_CELSIUS;
    if celsius < lo || celsius > hi {
        warn!("Temperature {:.1}C at {} out of bounds", celsius, at);
        false
    } else {
        true
    }
}

fn scan_window(ctx: &Context, extreme: Extreme) -> Option<Derived<i32>> {
    let alignment = ctx.window.six_hour_alignment(false);
    let mut best: Option<Candidate> = None;

    let group = match extreme {
        Extreme::Max => Element::MaxTemp6Hour,
        Extreme::Min => Element::MinTemp6Hour,
    };

    for end in alignment.bucket_ends() {
        let from_group = ctx
            .query
            .report_value(ctx.station_id(), group, end)
            .or_warn("6 hour temperature group")
            .filter(|celsius| plausible(*celsius, end))
            .map(|celsius| Candidate {
                celsius,
                at: None,
                provenance: Provenance::Temp6Hour,
            });

        let candidate = from_group.or_else(|| {
            let begin = end - Duration::hours(6) + Duration::minutes(1);
            hourly_extreme(ctx, extreme, begin, end)
        });

        if let Some(candidate) = candidate {
            best = Some(better(best, candidate, extreme));
        }
    }

    let partial_spans = [alignment.leading_span(), alignment.trailing_span()];
    for (begin, end) in partial_spans.iter().flatten() {
        if let Some(candidate) = hourly_extreme(ctx, extreme, *begin, *end) {
            best = Some(better(best, candidate, extreme));
        }
    }

    best.map(|c| {
        Derived::new(whole_fahrenheit(c.celsius), c.provenance).at(c.at.map(|at| at.time()))
    })
}

/**
 * The routine report extreme in `[begin, end]`, or a special report extreme that beats it.
 *
 * Special reports are only consulted when a routine extreme exists. They are searched up to one
 * hour before `end`, the routine report at `end` already covers the last hour.
 */
fn hourly_extreme(
    ctx: &Context,
    extreme: Extreme,
    begin: NaiveDateTime,
    end: NaiveDateTime,
) -> Option<Candidate> {
    let metar = ctx
        .query
        .period_extreme(ctx.station_id(), ReportSource::Metar, extreme, begin, end)
        .or_warn("hourly temperature extreme")
        .filter(|r| plausible(r.celsius, r.at))
        .map(Candidate::from_reading)?;

    let speci_end = end - Duration::hours(1);
    let speci = ctx
        .query
        .period_extreme(ctx.station_id(), ReportSource::Speci, extreme, begin, speci_end)
        .or_warn("special report temperature extreme")
        .filter(|r| plausible(r.celsius, r.at))
        .map(Candidate::from_reading);

    match speci {
        Some(s) if s.beats(&metar, extreme) => Some(s),
        _ => Some(metar),
    }
}
