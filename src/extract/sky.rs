//! Average sky cover.

use super::{derive, Context, Strategy};
use crate::{
    query::Element,
    value::{Derived, Provenance},
};

/// Average sky cover as a fraction from 0.0 (clear) to 1.0 (overcast).
pub fn extract_sky_cover(ctx: &Context) -> Derived<f64> {
    const CHAIN: [Strategy<f64>; 2] = [from_summary, from_hourly];
    derive(ctx, &CHAIN)
}

fn from_summary(ctx: &Context) -> Option<Derived<f64>> {
    ctx.summary?
        .sky_cover
        .map(|cover| Derived::new(cover, Provenance::DailySummary))
}

fn from_hourly(ctx: &Context) -> Option<Derived<f64>> {
    let id = ctx.station_id();
    let covers: Vec<f64> = ctx
        .window
        .hours()
        .filter_map(|nominal| {
            ctx.query
                .report_value(id, Element::SkyCover, nominal)
                .or_warn("sky cover")
        })
        .collect();

    if covers.is_empty() {
        return None;
    }

    let mean = covers.iter().sum::<f64>() / covers.len() as f64;
    Some(Derived::new(mean, Provenance::Calculated))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        mock::{dt, station, MockSources},
        period::PeriodType,
        query::DailySummary,
        window::resolve_window,
    };
    use chrono::NaiveDate;

    #[test]
    fn test_sky_cover() {
        let mut mock = MockSources::default();
        mock.set(Element::SkyCover, dt(2024, 1, 10, 10, 0), 1.0);
        mock.set(Element::SkyCover, dt(2024, 1, 10, 11, 0), 0.5);
        mock.set(Element::SkyCover, dt(2024, 1, 10, 12, 0), 0.0);

        let stn = station(-5);
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let window = resolve_window(PeriodType::MorningNwws, date, -5, None).unwrap();

        let ctx = Context::new(&mock, &stn, &window, None);
        let cover = extract_sky_cover(&ctx);
        assert_eq!(cover.get(), Some(0.5));
        assert_eq!(cover.provenance(), Provenance::Calculated);

        let summary = DailySummary {
            sky_cover: Some(0.3),
            ..DailySummary::default()
        };
        let ctx = Context::new(&mock, &stn, &window, Some(&summary));
        assert_eq!(extract_sky_cover(&ctx).get(), Some(0.3));

        let empty = MockSources::default();
        let ctx = Context::new(&empty, &stn, &window, None);
        assert!(extract_sky_cover(&ctx).is_missing());
    }
}
