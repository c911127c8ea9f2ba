//! Snowfall and snow depth.

use super::{derive, Context, Strategy};
use crate::{
    query::{Element, Lookup},
    value::{Amount, Derived, Provenance},
    window::floor_hour,
};
use chrono::{Duration, NaiveDateTime, Timelike};
use log::{info, warn};

/// Minutes either side of a synoptic hour a supplemental snowfall report may be filed.
const SCD_SLACK_MINUTES: i64 = 10;

/// Correction indicator of reports from automated stations, whose snow depth is not used.
const AUTOMATED_INDICATOR: &str = "A";

/// Snowfall and snow depth in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snow {
    pub snowfall: Derived<Amount>,
    pub depth: Derived<Amount>,
}

/// Derive snowfall and snow depth for a window.
pub fn extract_snow(ctx: &Context) -> Snow {
    const SNOWFALL_CHAIN: [Strategy<Amount>; 2] = [summary_snowfall, scd_snowfall];
    const DEPTH_CHAIN: [Strategy<Amount>; 2] = [summary_depth, synoptic_depth];

    let snowfall = derive(ctx, &SNOWFALL_CHAIN);
    let depth = derive(ctx, &DEPTH_CHAIN);

    if snowfall.is_missing() {
        info!("No snowfall reports for station {}", ctx.station.icao);
    }

    Snow { snowfall, depth }
}

fn summary_snowfall(ctx: &Context) -> Option<Derived<Amount>> {
    let amount = ctx.summary?.snowfall;
    if amount.is_missing() {
        None
    } else {
        Some(Derived::amount(amount, Provenance::DailySummary))
    }
}

fn summary_depth(ctx: &Context) -> Option<Derived<Amount>> {
    let amount = ctx.summary?.snow_depth;
    if amount.is_missing() {
        None
    } else {
        Some(Derived::amount(amount, Provenance::DailySummary))
    }
}

/// Sum the supplemental snowfall reports filed near each synoptic hour in the window.
fn scd_snowfall(ctx: &Context) -> Option<Derived<Amount>> {
    let slack = Duration::minutes(SCD_SLACK_MINUTES);
    let mut total = Amount::Missing;
    let mut found = false;

    for end in ctx.window.six_hour_alignment(true).bucket_ends() {
        if let Some(val) = ctx
            .query
            .scd_snowfall(ctx.station_id(), end - slack, end + slack)
            .or_warn("supplemental snowfall")
        {
            found = true;
            total = total.tally(Amount::from_report(val));
        }
    }

    if found {
        Some(Derived::amount(total, Provenance::SnowScd))
    } else {
        None
    }
}

/**
 * Snow depth from the snow depth group of a routine report at a synoptic hour.
 *
 * Morning reports, and windows ending in the afternoon, use 12Z. Otherwise the latest synoptic
 * hour before the window end is used. When that report has nothing, 06Z and 18Z fall back
 * one synoptic hour.
 */
fn synoptic_depth(ctx: &Context) -> Option<Derived<Amount>> {
    let (hour, at) = depth_hour_and_time(ctx);
    let earliest = ctx.window.six_hour_alignment(true).aligned_begin;

    if at < earliest {
        return None;
    }

    depth_at(ctx, hour, at).or_else(|| {
        if hour == 0 || hour == 12 {
            return None;
        }
        let (hour, at) = (hour - 6, at - Duration::hours(6));
        if at < earliest {
            return None;
        }
        depth_at(ctx, hour, at)
    })
}

/// The synoptic hour (UTC) and date time of the snow depth report a window uses.
fn depth_hour_and_time(ctx: &Context) -> (u32, NaiveDateTime) {
    let morning = ctx.window.is_morning();
    let end_base = floor_hour(ctx.window.end);
    let end_hour = end_base.hour();

    let depth_hour = if morning || (12..18).contains(&end_hour) {
        12
    } else if end_hour < 6 {
        0
    } else if end_hour < 12 {
        6
    } else {
        18
    };

    let back = if morning && end_hour < depth_hour {
        24 + i64::from(end_hour) - i64::from(depth_hour)
    } else {
        i64::from(end_hour) - i64::from(depth_hour)
    };

    (depth_hour, end_base - Duration::hours(back))
}

fn depth_at(ctx: &Context, hour: u32, at: NaiveDateTime) -> Option<Derived<Amount>> {
    match ctx.query.report_correction(ctx.station_id(), at) {
        Lookup::Found(Some(ref indicator)) if indicator == AUTOMATED_INDICATOR => return None,
        Lookup::Found(_) => {}
        Lookup::NotFound => return None,
        Lookup::Failed(err) => {
            warn!("snow depth report correction at {}: {}", at, err);
            return None;
        }
    }

    ctx.query
        .report_value(ctx.station_id(), Element::SnowDepth, at)
        .or_warn("snow depth group")
        .map(|val| Derived::amount(Amount::from_report(val), Provenance::DepthAtHour(hour)))
}
