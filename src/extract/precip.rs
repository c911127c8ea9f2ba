/*!
 * Precipitation totals.
 *
 * The window is split on synoptic hours. Whole 6 hour buckets prefer the 6 hour group, then the
 * 3 hour group plus the hourly amounts after it, then six hourly amounts. Partial spans at either
 * end of the window combine groups and hourly amounts so that no hour is counted twice.
 *
 * Every increment goes through [`Amount::tally`], whichever granularity it came from.
 */

use super::{derive, Context, Strategy};
use crate::{
    query::Element,
    value::{Amount, Derived, PrecipSources, Provenance},
};
use chrono::{Duration, NaiveDateTime};
use log::{info, warn};
use std::ops::RangeInclusive;

/// Derive the precipitation total for a window.
///
/// When no report of any granularity contributed, the result is missing rather than zero.
pub fn extract_precip(ctx: &Context) -> Derived<Amount> {
    const CHAIN: [Strategy<Amount>; 2] = [from_summary, from_reports];

    let precip = derive(ctx, &CHAIN);
    if precip.is_missing() {
        info!("No precipitation reports for station {}", ctx.station.icao);
    }
    precip
}

fn from_summary(ctx: &Context) -> Option<Derived<Amount>> {
    let amount = ctx.summary?.precip;
    if amount.is_missing() {
        None
    } else {
        Some(Derived::amount(amount, Provenance::DailySummary))
    }
}

fn from_reports(ctx: &Context) -> Option<Derived<Amount>> {
    let alignment = ctx.window.six_hour_alignment(true);
    let mut acc = Accumulator::new(ctx);

    for end in alignment.bucket_ends() {
        acc.whole_bucket(end);
    }

    if alignment.begin_offset > 0 {
        acc.leading_span(alignment.aligned_begin, alignment.begin_offset);
    }

    if alignment.end_offset > 0 {
        acc.trailing_span(alignment.aligned_end, alignment.end_offset);
    }

    acc.finish()
}

struct Accumulator<'a, 'b> {
    ctx: &'a Context<'b>,
    total: Amount,
    sources: PrecipSources,
}

impl<'a, 'b> Accumulator<'a, 'b> {
    fn new(ctx: &'a Context<'b>) -> Self {
        Accumulator {
            ctx,
            total: Amount::Missing,
            sources: PrecipSources::default(),
        }
    }

    fn fetch(&self, element: Element, nominal: NaiveDateTime) -> Amount {
        self.ctx
            .query
            .report_value(self.ctx.station_id(), element, nominal)
            .or_warn("precipitation group")
            .map(Amount::from_report)
            .unwrap_or(Amount::Missing)
    }

    fn add(&mut self, increment: Amount, element: Element) {
        if increment.is_missing() {
            return;
        }

        match element {
            Element::Precip6Hour => self.sources.six_hour = true,
            Element::Precip3Hour => self.sources.three_hour = true,
            _ => self.sources.one_hour = true,
        }
        self.total = self.total.tally(increment);
    }

    /// Hourly amounts at `base + h` for each `h` in `hours`.
    fn hourly(&mut self, base: NaiveDateTime, hours: RangeInclusive<i64>) {
        for h in hours {
            let val = self.fetch(Element::Precip1Hour, base + Duration::hours(h));
            self.add(val, Element::Precip1Hour);
        }
    }

    fn whole_bucket(&mut self, end: NaiveDateTime) {
        let six = self.fetch(Element::Precip6Hour, end);
        if !six.is_missing() {
            self.add(six, Element::Precip6Hour);
            return;
        }

        let three = self.fetch(Element::Precip3Hour, end - Duration::hours(3));
        if !three.is_missing() {
            self.add(three, Element::Precip3Hour);
            self.hourly(end, -2..=0);
            return;
        }

        self.hourly(end, -5..=0);
    }

    /// The hours between the window begin and the first synoptic hour.
    ///
    /// With more than 3 hours to cover, the 6 hour group ending at the synoptic hour minus the 3
    /// hour group ending 3 hours earlier gives the amount for the last 3 hours of the span.
    fn leading_span(&mut self, aligned_begin: NaiveDateTime, offset: i64) {
        let first = -(offset - 1);

        if offset <= 3 {
            self.hourly(aligned_begin, first..=0);
            return;
        }

        let six = self.fetch(Element::Precip6Hour, aligned_begin);
        let three = self.fetch(Element::Precip3Hour, aligned_begin - Duration::hours(3));

        match (six, three) {
            (Amount::Missing, _) | (_, Amount::Missing) => self.hourly(aligned_begin, first..=0),
            (Amount::Value(s), Amount::Value(t)) if t > s => {
                warn!(
                    "3 hour precipitation {} exceeds 6 hour precipitation {} at {}",
                    t, s, aligned_begin
                );
                self.hourly(aligned_begin, first..=0);
            }
            (Amount::Trace, Amount::Value(t)) if t > 0.0 => {
                warn!(
                    "3 hour precipitation {} exceeds a trace 6 hour amount at {}",
                    t, aligned_begin
                );
                self.hourly(aligned_begin, first..=-3);
            }
            (six, three) if six == three => self.hourly(aligned_begin, first..=-3),
            (six, three) => {
                self.sources.three_hour = true;
                self.add(difference(six, three), Element::Precip6Hour);
                self.hourly(aligned_begin, first..=-3);
            }
        }
    }

    /// The hours between the last synoptic hour and the window end.
    fn trailing_span(&mut self, aligned_end: NaiveDateTime, offset: i64) {
        if offset >= 3 {
            let three = self.fetch(Element::Precip3Hour, aligned_end + Duration::hours(3));
            if !three.is_missing() {
                self.add(three, Element::Precip3Hour);
                if offset > 3 {
                    self.hourly(aligned_end, 4..=offset);
                }
                return;
            }
        }

        self.hourly(aligned_end, 1..=offset);
    }

    fn finish(self) -> Option<Derived<Amount>> {
        if self.sources.any() {
            Some(Derived::amount(self.total, Provenance::Precip(self.sources)))
        } else {
            None
        }
    }
}

/// The part of a 6 hour amount not covered by a 3 hour amount.
fn difference(six: Amount, three: Amount) -> Amount {
    match (six, three) {
        (Amount::Value(s), Amount::Value(t)) => Amount::Value(s - t),
        (Amount::Value(s), _) => Amount::Value(s),
        _ => Amount::Trace,
    }
}
